use arrow::datatypes::{DataType, Schema};

use super::builders::quantity_data_type;
use super::columns;
use crate::writer::Precision;

/// Validates that a schema is compatible with the mzparquet format at the given precision.
///
/// Returns `Ok(())` if the schema contains every column with the expected type and
/// nullability, or an error describing the first incompatibility.
pub fn validate_schema(schema: &Schema, precision: Precision) -> Result<(), SchemaValidationError> {
    let quantity = quantity_data_type(precision);
    let expected_columns = [
        (columns::SCAN, DataType::UInt32, false),
        (columns::LEVEL, DataType::UInt32, false),
        (columns::RT, DataType::Float32, false),
        (columns::MZ, DataType::Float32, false),
        (columns::INTENSITY, quantity.clone(), false),
        (columns::ION_MOBILITY, DataType::Float32, true),
        (columns::ISOLATION_LOWER, DataType::Float32, true),
        (columns::ISOLATION_UPPER, DataType::Float32, true),
        (columns::PRECURSOR_SCAN, DataType::UInt32, true),
        (columns::PRECURSOR_MZ, DataType::Float32, true),
        (columns::PRECURSOR_CHARGE, quantity, true),
    ];

    for (name, expected_type, nullable) in expected_columns {
        match schema.field_with_name(name) {
            Ok(field) => {
                if field.data_type() != &expected_type {
                    return Err(SchemaValidationError::TypeMismatch {
                        column: name.to_string(),
                        expected: format!("{:?}", expected_type),
                        found: format!("{:?}", field.data_type()),
                    });
                }
                if field.is_nullable() != nullable {
                    return Err(SchemaValidationError::NullabilityMismatch {
                        column: name.to_string(),
                        expected: nullable,
                    });
                }
            }
            Err(_) => {
                return Err(SchemaValidationError::MissingColumn(name.to_string()));
            }
        }
    }

    Ok(())
}

/// Errors that can occur during schema validation
#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    /// A required column is missing from the schema
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A column has an incorrect data type
    #[error("Type mismatch for column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the column with the type mismatch
        column: String,
        /// Expected data type
        expected: String,
        /// Actual data type found
        found: String,
    },

    /// A column is nullable where it must not be, or vice versa
    #[error("Nullability mismatch for column '{column}': expected nullable={expected}")]
    NullabilityMismatch {
        /// Name of the column
        column: String,
        /// Expected nullability
        expected: bool,
    },
}
