//! psyscore-core: Result model and export-archive parser.
//!
//! Turns a vendor score export (a zip archive holding a UTF-16 table) into a
//! [`Battery`] of index scales and subtests that reporting code can query by
//! name.

pub mod archive;
pub mod error;
pub mod model;
pub mod parser;

pub use archive::{decode_export, parse_archive, parse_reader, read_export_text};
pub use error::{ErrorKind, ParseError};
pub use model::{
    Battery, ConfidenceInterval, ConfidenceLevel, IndexScale, ScoreBand, ScoreRef, Subtest,
};
pub use parser::parse_export_text;
