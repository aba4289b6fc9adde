pub mod analysis;
pub mod conversation;
pub mod enums;
pub mod request;

pub use analysis::*;
pub use conversation::*;
pub use enums::*;
pub use request::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
