//! File-backed page store
//!
//! File layout, every slot `PAGE_SIZE` bytes:
//!
//! ```text
//! +-------------+--------+--------+-----+--------------------+
//! | header (0)  | page 1 | page 2 | ... | page page_count-1  |
//! +-------------+--------+--------+-----+--------------------+
//! ```
//!
//! Disposed pages form a singly linked free list whose head lives in the
//! header; each free page stores the next free page number in its first
//! four bytes.

use super::{PageStore, StoreError, StoreResult, next_file_id};
use crate::page::Page;
use crate::types::{FileId, INVALID_PAGE_NO, PAGE_SIZE, PageNo};
use crate::vfs::{FileHandle, LocalFs, VfsError, VfsInterface};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;

pub const FILE_MAGIC: u32 = 0x4255_464D; // "BUFM"
pub const FILE_VERSION: u32 = 1;
pub const HEADER_PAGE_NO: PageNo = 0;

// magic + version + page_count + free_head, followed by the crc32
const HEADER_BODY_LEN: usize = 16;

/// Persistent header stored in page 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of page slots in the file, header included
    pub page_count: u32,
    /// First page of the free list, INVALID_PAGE_NO when empty
    pub free_head: PageNo,
}

impl FileHeader {
    pub fn new() -> Self {
        Self {
            magic: FILE_MAGIC,
            version: FILE_VERSION,
            page_count: 1,
            free_head: INVALID_PAGE_NO,
        }
    }

    fn body(&self) -> [u8; HEADER_BODY_LEN] {
        let mut body = [0u8; HEADER_BODY_LEN];
        body[0..4].copy_from_slice(&self.magic.to_le_bytes());
        body[4..8].copy_from_slice(&self.version.to_le_bytes());
        body[8..12].copy_from_slice(&self.page_count.to_le_bytes());
        body[12..16].copy_from_slice(&self.free_head.to_le_bytes());
        body
    }

    /// Serializes the header and its checksum into `page`
    pub fn encode(&self, page: &mut Page) {
        let body = self.body();
        page.zero();
        page.write_bytes(0, &body);
        page.write_bytes(HEADER_BODY_LEN, &crc32fast::hash(&body).to_le_bytes());
    }

    /// Parses and validates a header page
    pub fn decode(page: &Page) -> StoreResult<Self> {
        let data = page.data();
        let word = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        let header = Self {
            magic: word(0),
            version: word(4),
            page_count: word(8),
            free_head: word(12),
        };
        if header.magic != FILE_MAGIC {
            return Err(StoreError::Corrupted(format!("bad magic {:#010x}", header.magic)));
        }
        if header.version != FILE_VERSION {
            return Err(StoreError::Corrupted(format!(
                "unsupported version {}",
                header.version
            )));
        }
        if crc32fast::hash(&data[..HEADER_BODY_LEN]) != word(HEADER_BODY_LEN) {
            return Err(StoreError::Corrupted("header checksum mismatch".to_string()));
        }
        if header.page_count == 0 {
            return Err(StoreError::Corrupted("page count is zero".to_string()));
        }
        Ok(header)
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

struct FileState {
    header: FileHeader,
    free: HashSet<PageNo>,
}

/// Page store persisted in a single file through the VFS
pub struct PagedFile {
    file_id: FileId,
    handle: Box<dyn FileHandle>,
    state: Mutex<FileState>,
}

fn page_offset(page_no: PageNo) -> u64 {
    page_no as u64 * PAGE_SIZE as u64
}

impl PagedFile {
    /// Opens the page file at `path`, initializing it if empty
    ///
    /// # Arguments
    /// * `vfs` - File system to open the file through
    /// * `path` - Location of the page file
    pub fn open(vfs: &dyn VfsInterface, path: &str) -> StoreResult<Self> {
        let handle = vfs.open_or_create(path)?;
        let mut page = Page::new();

        let header = if handle.len()? == 0 {
            let header = FileHeader::new();
            header.encode(&mut page);
            handle.pwrite_all(page.data(), page_offset(HEADER_PAGE_NO))?;
            debug!("initialized page file {}", path);
            header
        } else {
            handle.pread_full(page.data_mut(), page_offset(HEADER_PAGE_NO))?;
            FileHeader::decode(&page)?
        };

        let free = Self::load_free_list(handle.as_ref(), &header)?;
        debug!(
            "opened page file {} with {} pages, {} free",
            path,
            header.page_count,
            free.len()
        );

        Ok(Self {
            file_id: next_file_id(),
            handle,
            state: Mutex::new(FileState { header, free }),
        })
    }

    /// Opens a page file on the local file system
    pub fn open_local(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            VfsError::InvalidArgument(format!("non UTF-8 path {}", path.display()))
        })?;
        Self::open(&LocalFs::new(), path_str)
    }

    fn load_free_list(handle: &dyn FileHandle, header: &FileHeader) -> StoreResult<HashSet<PageNo>> {
        let mut free = HashSet::new();
        let mut link = [0u8; 4];
        let mut next = header.free_head;

        while next != INVALID_PAGE_NO {
            if next == HEADER_PAGE_NO || next >= header.page_count || !free.insert(next) {
                return Err(StoreError::Corrupted(format!("bad free list entry {}", next)));
            }
            handle.pread_full(&mut link, page_offset(next))?;
            next = u32::from_le_bytes(link);
        }
        Ok(free)
    }

    fn write_header(&self, header: &FileHeader) -> StoreResult<()> {
        let mut page = Page::new();
        header.encode(&mut page);
        self.handle.pwrite_all(page.data(), page_offset(HEADER_PAGE_NO))?;
        Ok(())
    }

    fn check_data_page(state: &FileState, page_no: PageNo) -> StoreResult<()> {
        if page_no == HEADER_PAGE_NO
            || page_no >= state.header.page_count
            || state.free.contains(&page_no)
        {
            return Err(StoreError::InvalidPage(page_no));
        }
        Ok(())
    }

    /// Number of page slots in the file, header included
    pub fn page_count(&self) -> u32 {
        self.state.lock().header.page_count
    }

    /// Number of disposed pages awaiting reuse
    pub fn free_count(&self) -> usize {
        self.state.lock().free.len()
    }

    /// Flushes the file to stable storage
    pub fn sync(&self) -> StoreResult<()> {
        self.handle.sync()?;
        Ok(())
    }
}

impl PageStore for PagedFile {
    fn file_id(&self) -> FileId {
        self.file_id
    }

    fn read_page(&self, page_no: PageNo, page: &mut Page) -> StoreResult<()> {
        Self::check_data_page(&self.state.lock(), page_no)?;
        self.handle.pread_full(page.data_mut(), page_offset(page_no))?;
        Ok(())
    }

    fn write_page(&self, page_no: PageNo, page: &Page) -> StoreResult<()> {
        Self::check_data_page(&self.state.lock(), page_no)?;
        self.handle.pwrite_all(page.data(), page_offset(page_no))?;
        Ok(())
    }

    fn allocate_page(&self) -> StoreResult<PageNo> {
        let mut state = self.state.lock();
        let mut header = state.header;
        let zeroed = Page::new();

        let page_no = if header.free_head != INVALID_PAGE_NO {
            let page_no = header.free_head;
            let mut link = [0u8; 4];
            self.handle.pread_full(&mut link, page_offset(page_no))?;
            let next = u32::from_le_bytes(link);
            if next != INVALID_PAGE_NO && (next == page_no || !state.free.contains(&next)) {
                return Err(StoreError::Corrupted(format!(
                    "free page {} links to page {}",
                    page_no, next
                )));
            }
            header.free_head = next;
            page_no
        } else {
            let page_no = header.page_count;
            header.page_count += 1;
            page_no
        };

        // The header goes first so a free page keeps its link until it is unlisted
        self.write_header(&header)?;
        state.header = header;
        state.free.remove(&page_no);

        self.handle.pwrite_all(zeroed.data(), page_offset(page_no))?;
        Ok(page_no)
    }

    fn dispose_page(&self, page_no: PageNo) -> StoreResult<()> {
        let mut state = self.state.lock();
        Self::check_data_page(&state, page_no)?;

        let mut link = Page::new();
        link.write_bytes(0, &state.header.free_head.to_le_bytes());
        self.handle.pwrite_all(link.data(), page_offset(page_no))?;

        let mut header = state.header;
        header.free_head = page_no;
        self.write_header(&header)?;

        state.header = header;
        state.free.insert(page_no);
        Ok(())
    }
}
