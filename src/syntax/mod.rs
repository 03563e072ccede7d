//! Structural syntax for RTM overlay sources.
//!
//! - [`tree`]: the symbol tree shared by every other layer
//! - `grammar`: the static rule table
//! - [`parser`]: the stack-based line scanner producing trees

mod grammar;
pub mod parser;
pub mod tree;

pub use parser::parse;
pub use tree::{Symbol, SymbolId, SymbolKind, SymbolTree};
