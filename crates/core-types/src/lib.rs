pub mod enums;
pub mod error;
pub mod issuer;
pub mod normalize;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::OptionType;
pub use error::CoreError;
pub use issuer::{ISSUER_NAMES, resolve_issuer_name};
pub use normalize::{ActiveFilter, normalize_code, parse_date_prefix, parse_decimal, parse_strike};
pub use structs::{Instrument, OutputRecord, PricePair, PricePairs, ReturnRecord};
