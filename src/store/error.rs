//! Page store error definitions

use crate::types::PageNo;
use crate::vfs::VfsError;
use std::error::Error;
use std::fmt;

/// Page store error types
#[derive(Debug)]
pub enum StoreError {
    /// Underlying file system error
    Vfs(VfsError),
    /// Page number is not an allocated page of this store
    InvalidPage(PageNo),
    /// On-disk metadata failed validation
    Corrupted(String),
    /// Failure injected by a test store
    Injected(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Vfs(err) => write!(f, "VFS error: {}", err),
            StoreError::InvalidPage(page_no) => write!(f, "Invalid page number: {}", page_no),
            StoreError::Corrupted(msg) => write!(f, "Corrupted store: {}", msg),
            StoreError::Injected(msg) => write!(f, "Injected failure: {}", msg),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Vfs(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VfsError> for StoreError {
    fn from(err: VfsError) -> Self {
        StoreError::Vfs(err)
    }
}

/// Result type for page store operations
pub type StoreResult<T> = Result<T, StoreError>;
