pub mod config;
pub mod error;
pub mod types;

pub use config::RecommenderConfig;
pub use error::{RecsError, Result};
pub use types::{Field, RowId, Token, TokenSet, Weights};
