//! In-memory page store
//!
//! Keeps page content in a hash map and counts every successful operation,
//! which makes it the store of choice for tests and benchmarks. Each kind of
//! operation can be told to fail exactly once.

use super::{PageStore, StoreError, StoreResult, next_file_id};
use crate::page::Page;
use crate::types::{FileId, PageNo};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Counters of successful store operations
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub reads: u64,
    pub writes: u64,
    pub allocs: u64,
    pub disposes: u64,
}

#[derive(Default)]
struct FailPoints {
    read: bool,
    write: bool,
    alloc: bool,
    dispose: bool,
}

struct MemInner {
    pages: HashMap<PageNo, Page>,
    free: Vec<PageNo>,
    next_page_no: PageNo,
    stats: StoreStats,
    fail: FailPoints,
}

/// Page store backed by process memory
pub struct MemStore {
    file_id: FileId,
    inner: Mutex<MemInner>,
}

impl MemStore {
    /// Creates an empty store with a fresh file identity
    pub fn new() -> Self {
        Self {
            file_id: next_file_id(),
            inner: Mutex::new(MemInner {
                pages: HashMap::new(),
                free: Vec::new(),
                next_page_no: 0,
                stats: StoreStats::default(),
                fail: FailPoints::default(),
            }),
        }
    }

    /// Returns a snapshot of the operation counters
    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats
    }

    /// Returns a copy of the durable content of `page_no`
    pub fn page_content(&self, page_no: PageNo) -> Option<Page> {
        self.inner.lock().pages.get(&page_no).cloned()
    }

    /// Returns true if `page_no` is currently allocated
    pub fn is_allocated(&self, page_no: PageNo) -> bool {
        self.inner.lock().pages.contains_key(&page_no)
    }

    /// Makes the next `read_page` call fail
    pub fn fail_next_read(&self) {
        self.inner.lock().fail.read = true;
    }

    /// Makes the next `write_page` call fail
    pub fn fail_next_write(&self) {
        self.inner.lock().fail.write = true;
    }

    /// Makes the next `allocate_page` call fail
    pub fn fail_next_alloc(&self) {
        self.inner.lock().fail.alloc = true;
    }

    /// Makes the next `dispose_page` call fail
    pub fn fail_next_dispose(&self) {
        self.inner.lock().fail.dispose = true;
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore for MemStore {
    fn file_id(&self) -> FileId {
        self.file_id
    }

    fn read_page(&self, page_no: PageNo, page: &mut Page) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail.read) {
            return Err(StoreError::Injected(format!("read of page {}", page_no)));
        }
        let stored = inner.pages.get(&page_no).ok_or(StoreError::InvalidPage(page_no))?;
        page.copy_from(stored);
        inner.stats.reads += 1;
        Ok(())
    }

    fn write_page(&self, page_no: PageNo, page: &Page) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail.write) {
            return Err(StoreError::Injected(format!("write of page {}", page_no)));
        }
        let stored = inner
            .pages
            .get_mut(&page_no)
            .ok_or(StoreError::InvalidPage(page_no))?;
        stored.copy_from(page);
        inner.stats.writes += 1;
        Ok(())
    }

    fn allocate_page(&self) -> StoreResult<PageNo> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail.alloc) {
            return Err(StoreError::Injected("page allocation".to_string()));
        }
        let page_no = match inner.free.pop() {
            Some(page_no) => page_no,
            None => {
                let page_no = inner.next_page_no;
                inner.next_page_no += 1;
                page_no
            }
        };
        inner.pages.insert(page_no, Page::new());
        inner.stats.allocs += 1;
        Ok(page_no)
    }

    fn dispose_page(&self, page_no: PageNo) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail.dispose) {
            return Err(StoreError::Injected(format!("dispose of page {}", page_no)));
        }
        if inner.pages.remove(&page_no).is_none() {
            return Err(StoreError::InvalidPage(page_no));
        }
        inner.free.push(page_no);
        inner.stats.disposes += 1;
        Ok(())
    }
}
