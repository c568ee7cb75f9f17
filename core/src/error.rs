use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference table '{table}' is empty")]
    EmptyReferenceTable { table: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Rejections raised at the configuration boundary, before any
/// generation work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },

    #[error("Number of customers must be greater than 0")]
    NoCustomers,

    #[error("Number of transactions per customer must be between 1 and {max}, got {value}")]
    TransactionsPerCustomer { value: usize, max: usize },
}

pub type ForgeResult<T> = Result<T, ForgeError>;
