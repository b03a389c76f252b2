//! Ingestion of raw character exports
//!
//! Turns spreadsheet-shaped JSON records into token sets, class lists,
//! narrative text and ability scores. Nothing downstream sees raw cells.

pub mod classes;
pub mod dataset;
pub mod report;
pub mod tokens;

pub use classes::{parse_classes_field, primary_class, ClassLevel};
pub use dataset::{load_records, CharacterRow, Dataset, Record};
pub use tokens::{build_token_set, slugify, split_listish};
