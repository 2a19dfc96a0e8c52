use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Missing required column [{field}]")]
    MissingField {
        field: String
    },
    #[error("Invalid date [{value}] in column [{field}]")]
    InvalidDate {
        field: String,
        value: String
    },
    #[error("Invalid number [{value}] in column [{field}]")]
    InvalidNumber {
        field: String,
        value: String
    }
}
