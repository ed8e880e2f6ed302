//! Concrete [`RemoteAdapter`](crate::sync::RemoteAdapter) backends.

mod folder;
mod memory;

pub use folder::FolderRemote;
pub use memory::MemoryRemote;
