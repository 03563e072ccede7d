//! Foundation types for the RTM indexer.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - File identities handed out by the workspace file set
//! - [`LineCol`], [`Extent`] - Line/column positions and ranges
//! - [`LineIndex`] - Byte offset ↔ line/column conversion
//! - [`TextRange`], [`TextSize`] - Byte ranges
//!
//! This module has NO dependencies on other crate modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{Extent, LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
