use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Start price {price} of {code} is not positive")]
    NonPositiveStartPrice { code: String, price: Decimal },

    #[error("Calculation error: {0}")]
    Calculation(String),
}
