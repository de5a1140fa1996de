// Page store tests

use super::*;
use super::paged_file::FileHeader;
use crate::page::Page;
use crate::types::PAGE_SIZE;
use crate::vfs::{FileHandle, LocalFs, VfsError, VfsInterface, VfsResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

/// Local file system whose handles can fail the next header write
struct FlakyHeaderFs {
    fail_header_write: Arc<AtomicBool>,
}

struct FlakyHeaderHandle {
    inner: Box<dyn FileHandle>,
    fail_header_write: Arc<AtomicBool>,
}

impl FileHandle for FlakyHeaderHandle {
    fn pread(&self, buf: &mut [u8], offset: u64) -> VfsResult<usize> {
        self.inner.pread(buf, offset)
    }

    fn pwrite(&self, buf: &[u8], offset: u64) -> VfsResult<usize> {
        if offset == 0 && self.fail_header_write.swap(false, Ordering::SeqCst) {
            return Err(VfsError::InvalidArgument("injected".to_string()));
        }
        self.inner.pwrite(buf, offset)
    }

    fn len(&self) -> VfsResult<u64> {
        self.inner.len()
    }

    fn sync(&self) -> VfsResult<()> {
        self.inner.sync()
    }
}

impl VfsInterface for FlakyHeaderFs {
    fn open_or_create(&self, path: &str) -> VfsResult<Box<dyn FileHandle>> {
        Ok(Box::new(FlakyHeaderHandle {
            inner: LocalFs::new().open_or_create(path)?,
            fail_header_write: Arc::clone(&self.fail_header_write),
        }))
    }
}

fn page_with(byte: u8) -> Page {
    let mut page = Page::new();
    page.data_mut().fill(byte);
    page
}

#[test]
fn test_file_ids_are_unique() {
    let a = MemStore::new();
    let b = MemStore::new();
    assert_ne!(a.file_id(), b.file_id());
}

#[test]
fn test_mem_store_write_read() {
    let store = MemStore::new();
    let page_no = store.allocate_page().unwrap();

    store.write_page(page_no, &page_with(7)).unwrap();

    let mut page = Page::new();
    store.read_page(page_no, &mut page).unwrap();
    assert_eq!(page, page_with(7));
    assert_eq!(
        store.stats(),
        StoreStats { reads: 1, writes: 1, allocs: 1, disposes: 0 }
    );
}

#[test]
fn test_mem_store_reuses_disposed_pages() {
    let store = MemStore::new();
    let first = store.allocate_page().unwrap();
    let second = store.allocate_page().unwrap();
    assert_ne!(first, second);

    store.dispose_page(first).unwrap();
    assert!(!store.is_allocated(first));
    assert!(matches!(store.dispose_page(first), Err(StoreError::InvalidPage(_))));

    assert_eq!(store.allocate_page().unwrap(), first);
}

#[test]
fn test_mem_store_failure_injection_fires_once() {
    let store = MemStore::new();
    let page_no = store.allocate_page().unwrap();

    store.fail_next_write();
    assert!(matches!(
        store.write_page(page_no, &page_with(1)),
        Err(StoreError::Injected(_))
    ));
    assert!(store.write_page(page_no, &page_with(1)).is_ok());

    store.fail_next_read();
    let mut page = Page::new();
    assert!(store.read_page(page_no, &mut page).is_err());
    assert!(store.read_page(page_no, &mut page).is_ok());

    store.fail_next_alloc();
    assert!(store.allocate_page().is_err());

    store.fail_next_dispose();
    assert!(store.dispose_page(page_no).is_err());
    assert!(store.is_allocated(page_no));
}

#[test]
fn test_paged_file_allocate_write_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.dat");

    let (a, b) = {
        let file = PagedFile::open_local(&path).unwrap();
        assert_eq!(file.page_count(), 1);

        let a = file.allocate_page().unwrap();
        let b = file.allocate_page().unwrap();
        assert_eq!((a, b), (1, 2));

        file.write_page(a, &page_with(0x11)).unwrap();
        file.write_page(b, &page_with(0x22)).unwrap();
        file.sync().unwrap();
        (a, b)
    };

    let file = PagedFile::open_local(&path).unwrap();
    assert_eq!(file.page_count(), 3);

    let mut page = Page::new();
    file.read_page(a, &mut page).unwrap();
    assert_eq!(page, page_with(0x11));
    file.read_page(b, &mut page).unwrap();
    assert_eq!(page, page_with(0x22));
}

#[test]
fn test_paged_file_free_list_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("free.dat");

    {
        let file = PagedFile::open_local(&path).unwrap();
        for _ in 0..4 {
            file.allocate_page().unwrap();
        }
        file.dispose_page(2).unwrap();
        file.dispose_page(4).unwrap();
        assert_eq!(file.free_count(), 2);
    }

    let file = PagedFile::open_local(&path).unwrap();
    assert_eq!(file.free_count(), 2);

    // Most recently disposed page comes back first, zero-filled
    assert_eq!(file.allocate_page().unwrap(), 4);
    assert_eq!(file.allocate_page().unwrap(), 2);
    assert_eq!(file.allocate_page().unwrap(), 5);

    let mut page = page_with(0xFF);
    file.read_page(4, &mut page).unwrap();
    assert!(page.is_zeroed());
}

#[test]
fn test_paged_file_rejects_invalid_pages() {
    let dir = TempDir::new().unwrap();
    let file = PagedFile::open_local(dir.path().join("bad.dat")).unwrap();
    let page_no = file.allocate_page().unwrap();
    let mut page = Page::new();

    assert!(matches!(file.read_page(0, &mut page), Err(StoreError::InvalidPage(0))));
    assert!(matches!(file.write_page(9, &page), Err(StoreError::InvalidPage(9))));

    file.dispose_page(page_no).unwrap();
    assert!(matches!(file.dispose_page(page_no), Err(StoreError::InvalidPage(_))));
    assert!(matches!(file.read_page(page_no, &mut page), Err(StoreError::InvalidPage(_))));
}

#[test]
fn test_paged_file_failed_header_write_keeps_free_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flaky.dat");
    let fail = Arc::new(AtomicBool::new(false));
    let fs = FlakyHeaderFs { fail_header_write: Arc::clone(&fail) };

    {
        let file = PagedFile::open(&fs, path.to_str().unwrap()).unwrap();
        let a = file.allocate_page().unwrap();
        let b = file.allocate_page().unwrap();
        assert_eq!((a, b), (1, 2));
        file.dispose_page(a).unwrap();

        fail.store(true, Ordering::SeqCst);
        assert!(matches!(file.allocate_page(), Err(StoreError::Vfs(_))));

        // The failed pop left the free list intact: page 1 again, then growth
        assert_eq!(file.allocate_page().unwrap(), a);
        assert_eq!(file.allocate_page().unwrap(), 3);
        assert_eq!(file.free_count(), 0);
    }

    let file = PagedFile::open_local(&path).unwrap();
    assert_eq!(file.page_count(), 4);
    assert_eq!(file.free_count(), 0);
    assert_eq!(file.allocate_page().unwrap(), 4);
}

#[test]
fn test_paged_file_rejects_bad_free_link() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("link.dat");
    let file = PagedFile::open_local(&path).unwrap();

    let page_no = file.allocate_page().unwrap();
    file.allocate_page().unwrap();
    file.dispose_page(page_no).unwrap();

    // Point the free page at the header page behind the store's back
    let handle = LocalFs::new().open_or_create(path.to_str().unwrap()).unwrap();
    handle.pwrite_all(&0u32.to_le_bytes(), page_no as u64 * PAGE_SIZE as u64).unwrap();
    drop(handle);

    assert!(matches!(file.allocate_page(), Err(StoreError::Corrupted(_))));
    assert_eq!(file.free_count(), 1);
}

#[test]
fn test_paged_file_detects_corrupted_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.dat");
    let path_str = path.to_str().unwrap();

    {
        let file = PagedFile::open_local(&path).unwrap();
        file.allocate_page().unwrap();
    }

    // Flip a byte inside the page count
    let handle = LocalFs::new().open_or_create(path_str).unwrap();
    handle.pwrite_all(&[0x7F], 8).unwrap();
    drop(handle);

    assert!(matches!(
        PagedFile::open_local(&path),
        Err(StoreError::Corrupted(_))
    ));
}

#[test]
fn test_file_header_encode_decode() {
    let header = FileHeader {
        page_count: 42,
        free_head: 7,
        ..FileHeader::new()
    };
    let mut page = Page::new();
    header.encode(&mut page);
    assert_eq!(FileHeader::decode(&page).unwrap(), header);
    assert_eq!(page.data().len(), PAGE_SIZE);
}
