//! # mzparquet Schema Definition
//!
//! This module defines the Apache Arrow schema for the flat mzparquet peak table.
//!
//! ## Schema Columns
//!
//! | Column | Type | Description |
//! |--------|------|-------------|
//! | scan | UInt32 | Native scan number |
//! | level | UInt32 | MS level |
//! | rt | Float32 | Retention time in minutes |
//! | mz | Float32 | Peak m/z |
//! | intensity | Float32 or UInt32 | Peak intensity (per [`Precision`](crate::writer::Precision)) |
//! | ion_mobility | Float32 (nullable) | Reserved, always null |
//! | isolation_lower | Float32 (nullable) | Isolation window lower bound |
//! | isolation_upper | Float32 (nullable) | Isolation window upper bound |
//! | precursor_scan | UInt32 (nullable) | Scan number of the precursor |
//! | precursor_mz | Float32 (nullable) | Precursor m/z |
//! | precursor_charge | Float32 or UInt32 (nullable) | Precursor charge |
//!
//! Rows are ordered by increasing scan number, then by peak order within the scan.

mod builders;
/// Peak table column name constants.
pub mod columns;
mod constants;
mod validation;


pub use builders::{create_mzparquet_schema, create_mzparquet_schema_arc, quantity_data_type};
pub use constants::*;
pub use validation::{validate_schema, SchemaValidationError};
