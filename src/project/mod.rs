//! Workspace configuration and the bundled source collaborators.

mod config;
mod memory;
mod workspace_loader;

pub use config::WorkspaceConfig;
pub use memory::MemorySource;
pub use workspace_loader::DiskSource;
