//! Page store module
//!
//! A page store is the durable home of the pages of one file. The buffer
//! manager only talks to stores through the `PageStore` trait; two
//! implementations are provided, an in-memory one and a file-backed one.

pub mod error;
pub use error::{StoreError, StoreResult};

pub mod memory;
pub use memory::{MemStore, StoreStats};

pub mod paged_file;
pub use paged_file::PagedFile;

use crate::page::Page;
use crate::types::{FileId, PageNo};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Durable storage for the fixed-size pages of a single file
///
/// Every method may fail with an I/O level error. Callers treat such a
/// failure as final and never retry it.
pub trait PageStore: Send + Sync {
    /// Returns the process-unique identity of this store
    fn file_id(&self) -> FileId;

    /// Fills `page` with the durable content of `page_no`
    fn read_page(&self, page_no: PageNo, page: &mut Page) -> StoreResult<()>;

    /// Persists `page` as the durable content of `page_no`
    fn write_page(&self, page_no: PageNo, page: &Page) -> StoreResult<()>;

    /// Reserves a new page number
    fn allocate_page(&self) -> StoreResult<PageNo>;

    /// Releases `page_no` back to the store
    fn dispose_page(&self, page_no: PageNo) -> StoreResult<()>;
}

/// Shared handle to an open page store
pub type FileRef = Arc<dyn PageStore>;

static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(1);

/// Hands out a fresh file identity
pub fn next_file_id() -> FileId {
    NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed)
}
