//! Buffer manager error definitions

use super::{BufferTag, IndexError};
use crate::store::StoreError;
use std::error::Error;
use std::fmt;

/// Buffer manager errors
#[derive(Debug)]
pub enum BufferError {
    /// Every frame is pinned
    PoolExhausted,
    /// Page is not resident in the buffer pool
    NotResident(BufferTag),
    /// Unpin requested for a page with pin count zero
    NotPinned(BufferTag),
    /// Flush requested while the page is pinned
    PagePinned(BufferTag),
    /// Loading a page from its store failed
    ReadFailed { tag: BufferTag, source: StoreError },
    /// Writing a page back to its store failed
    WriteFailed { tag: BufferTag, source: StoreError },
    /// Page allocation or disposal failed in the store
    Store(StoreError),
    /// Identity index refused an operation that cannot legally fail
    Index(IndexError),
    /// Frame table and identity index disagree
    InconsistentState(String),
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::PoolExhausted => write!(f, "Buffer pool exhausted: all frames pinned"),
            BufferError::NotResident(tag) => write!(f, "Page not resident: {}", tag),
            BufferError::NotPinned(tag) => write!(f, "Page not pinned: {}", tag),
            BufferError::PagePinned(tag) => write!(f, "Page is pinned: {}", tag),
            BufferError::ReadFailed { tag, source } => {
                write!(f, "Read of {} failed: {}", tag, source)
            }
            BufferError::WriteFailed { tag, source } => {
                write!(f, "Write of {} failed: {}", tag, source)
            }
            BufferError::Store(err) => write!(f, "Store error: {}", err),
            BufferError::Index(err) => write!(f, "Hash table error: {}", err),
            BufferError::InconsistentState(msg) => write!(f, "Inconsistent buffer state: {}", msg),
        }
    }
}

impl Error for BufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BufferError::ReadFailed { source, .. } | BufferError::WriteFailed { source, .. } => {
                Some(source)
            }
            BufferError::Store(err) => Some(err),
            BufferError::Index(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for BufferError {
    fn from(err: StoreError) -> Self {
        BufferError::Store(err)
    }
}

/// Result type for buffer manager operations
pub type BufferResult<T> = Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_display() {
        let tag = BufferTag::new(1, 2);
        assert_eq!(
            BufferError::NotPinned(tag).to_string(),
            "Page not pinned: file 1 page 2"
        );
        assert_eq!(
            BufferError::PoolExhausted.to_string(),
            "Buffer pool exhausted: all frames pinned"
        );
    }

    #[test]
    fn test_buffer_error_source() {
        let err = BufferError::WriteFailed {
            tag: BufferTag::new(1, 2),
            source: StoreError::InvalidPage(2),
        };
        assert!(err.source().is_some());
        assert!(BufferError::PoolExhausted.source().is_none());
    }
}
