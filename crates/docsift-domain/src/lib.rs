//! docsift Domain Layer
//!
//! Core types and seam traits shared by every other docsift crate.
//!
//! ## Key Concepts
//!
//! - **Record**: one finalized structured output, tagged with the identifier
//!   of the document it came from
//! - **Source identifier**: the name of an input document; the unit the
//!   processing ledger tracks
//! - **LlmProvider**: an opaque, possibly unreliable text-to-text function
//! - **TextExtractor**: turns a source document into plain text
//!
//! Infrastructure implementations live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record;
pub mod traits;

pub use record::{Record, DEFAULT_SOURCE_ID_FIELD};
pub use traits::{LlmProvider, TextExtractor};
