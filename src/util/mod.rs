pub mod assert;
pub mod constants;

pub use assert::{assert, assertion_error, fail};
pub use constants::CONSTANTS;
