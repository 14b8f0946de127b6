use rust_decimal::Decimal;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the core. All validation happens before any timeline
/// mutation, so a returned error implies no partial write.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid month {0}, expected 1-12")]
    InvalidMonth(u32),
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonthFormat(String),
    #[error("{name} rate {rate} is outside the 0-1 range")]
    InvalidRate { name: &'static str, rate: Decimal },
    #[error("negative amount {amount} for salary item '{name}'")]
    InvalidAmount { name: String, amount: Decimal },
    #[error("record amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("salary item '{0}' is a default item and cannot be removed")]
    DefaultItemRemoval(String),
    #[error("duplicate salary item id: {0}")]
    DuplicateItemId(String),
    #[error("storage: {source}")]
    Store {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Store {
            source: Box::new(err),
        }
    }
}
