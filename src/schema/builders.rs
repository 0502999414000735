use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder};

use super::columns;
use super::constants::{KEY_FORMAT_VERSION, KEY_PRECISION, MZPARQUET_FORMAT_VERSION};
use crate::writer::Precision;

/// Creates a Field with CV term metadata annotation
fn field_with_cv(name: &str, data_type: DataType, nullable: bool, cv_accession: &str) -> Field {
    let mut metadata = HashMap::new();
    metadata.insert("cv_accession".to_string(), cv_accession.to_string());
    Field::new(name, data_type, nullable).with_metadata(metadata)
}

/// Arrow type used for intensity and precursor charge under a given precision.
pub fn quantity_data_type(precision: Precision) -> DataType {
    match precision {
        Precision::Float => DataType::Float32,
        Precision::Integer => DataType::UInt32,
    }
}

/// Creates the mzparquet Arrow schema.
///
/// Every peak is a separate row; scan-level attributes repeat for each peak of a
/// scan, which dictionary encoding and RLE compress away. The `intensity` and
/// `precursor_charge` columns are `Float32` or `UInt32` depending on `precision`.
///
/// # Example
///
/// ```
/// use mzparquet::schema::create_mzparquet_schema;
/// use mzparquet::writer::Precision;
///
/// let schema = create_mzparquet_schema(Precision::Float);
/// assert_eq!(schema.fields().len(), 11);
/// ```
pub fn create_mzparquet_schema(precision: Precision) -> Schema {
    let quantity = quantity_data_type(precision);
    let mut builder = SchemaBuilder::new();

    // Scan identification (required)
    builder.push(field_with_cv(
        columns::SCAN,
        DataType::UInt32,
        false,
        "MS:1000797", // peak list scans
    ));
    builder.push(field_with_cv(
        columns::LEVEL,
        DataType::UInt32,
        false,
        "MS:1000511", // ms level
    ));
    builder.push(field_with_cv(
        columns::RT,
        DataType::Float32,
        false,
        "MS:1000016", // scan start time
    ));

    // Peak data (required)
    builder.push(field_with_cv(columns::MZ, DataType::Float32, false, "MS:1000040"));
    builder.push(field_with_cv(columns::INTENSITY, quantity.clone(), false, "MS:1000042"));

    builder.push(field_with_cv(
        columns::ION_MOBILITY,
        DataType::Float32,
        true,
        "MS:1002476", // ion mobility drift time
    ));

    // Isolation window and precursor linkage (nullable - MS2+ only)
    builder.push(field_with_cv(
        columns::ISOLATION_LOWER,
        DataType::Float32,
        true,
        "MS:1000828", // isolation window lower offset
    ));
    builder.push(field_with_cv(
        columns::ISOLATION_UPPER,
        DataType::Float32,
        true,
        "MS:1000829", // isolation window upper offset
    ));
    builder.push(field_with_cv(
        columns::PRECURSOR_SCAN,
        DataType::UInt32,
        true,
        "MS:1000796", // spectrum identifier of the precursor
    ));
    builder.push(field_with_cv(
        columns::PRECURSOR_MZ,
        DataType::Float32,
        true,
        "MS:1000744", // selected ion m/z
    ));
    builder.push(field_with_cv(
        columns::PRECURSOR_CHARGE,
        quantity,
        true,
        "MS:1000041", // charge state
    ));

    let mut schema = builder.finish();

    let mut metadata = HashMap::new();
    metadata.insert(
        KEY_FORMAT_VERSION.to_string(),
        MZPARQUET_FORMAT_VERSION.to_string(),
    );
    metadata.insert(KEY_PRECISION.to_string(), precision.to_string());
    schema = schema.with_metadata(metadata);

    schema
}

/// Creates the mzparquet schema wrapped in an Arc for sharing
pub fn create_mzparquet_schema_arc(precision: Precision) -> Arc<Schema> {
    Arc::new(create_mzparquet_schema(precision))
}
