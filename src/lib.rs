//! Bufmgr page buffer pool library

// Global type definitions
pub mod types;

// Import various modules
pub mod buffer;
pub mod config;
pub mod page;
pub mod store;
pub mod vfs;

// Re-export page items for easier access
pub use page::Page;

// Re-export buffer items for easier access
pub use buffer::{BufMgr, BufferError, BufferResult, PageGuard};
pub use config::BufferConfig;

// Re-export store items for easier access
pub use store::{FileRef, MemStore, PageStore, PagedFile};

// Re-export vfs items for easier access
pub use vfs::VfsError;
pub use vfs::VfsInterface;
