//! Dibbs Core - Domain types for DLA DIBBs solicitation extraction.

mod error;
mod types;

pub use error::{Error, Result};
pub use types::*;
