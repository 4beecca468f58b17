//! Client-side drivers for branch services.

pub mod customer;
pub mod error;

pub use customer::CustomerDriver;
pub use error::{ClientError, Result};
