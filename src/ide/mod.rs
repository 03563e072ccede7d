//! IDE features — high-level APIs for editor requests.
//!
//! Each function corresponds to an LSP request and works on our own types;
//! conversion to protocol types happens at the server boundary.
//!
//! ## Usage
//!
//! ```
//! use rtm::{LineCol, MemorySource};
//! use rtm::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new(MemorySource::new());
//! let file = host.set_file_content("ORD.rtm", "$ENTRY ORD\n$DATA\nAMT N5\n$PROG\nAMT = 1\n");
//!
//! let target = host.goto_definition(file, LineCol::new(4, 0)).unwrap();
//! assert_eq!(target.name, "AMT");
//! ```

mod analysis;
mod document_links;
mod folding;
mod goto;
mod selection;
mod symbols;

pub use analysis::AnalysisHost;
pub use document_links::{DocumentLink, document_links};
pub use folding::{FoldingRange, folding_ranges};
pub use goto::{NavigationTarget, find_references, goto_definition};
pub use selection::selection_ranges;
pub use symbols::{DocumentSymbol, SymbolInfo, document_symbols, workspace_symbols};
