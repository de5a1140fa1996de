//! Buffer Pool implementation for the storage engine
//!
//! Provides page caching over a fixed set of frames, clock (second chance)
//! replacement, pin counting and dirty page write-back.

pub mod desc;
pub mod error;
pub mod guard;
pub mod hash;

pub use desc::BufDesc;
pub use error::{BufferError, BufferResult};
pub use guard::PageGuard;
pub use hash::{BufHashTbl, BufferTag, IndexError};

use crate::config::{BufferConfig, ConfigResult};
use crate::page::Page;
use crate::store::FileRef;
use crate::types::{FrameId, PageNo};
use log::{debug, error, trace, warn};
use std::fmt;
use std::sync::Arc;

fn inconsistent(msg: String) -> BufferError {
    error!("buffer invariant violated: {}", msg);
    BufferError::InconsistentState(msg)
}

fn release_new_page(file: &FileRef, page_no: PageNo) {
    if let Err(err) = file.dispose_page(page_no) {
        warn!(
            "could not release page {} of file {}: {}",
            page_no,
            file.file_id(),
            err
        );
    }
}

/// Buffer manager struct
pub struct BufMgr {
    /// Number of frames in the pool
    num_bufs: usize,
    /// One descriptor per frame
    buf_table: Vec<BufDesc>,
    /// Page content, indexed like buf_table
    buf_pool: Vec<Page>,
    /// Identity index of resident pages
    hash_table: BufHashTbl,
    /// Next frame the clock examines
    clock_hand: FrameId,
    /// Reference bit given to a page when it becomes resident
    refbit_on_load: bool,
}

impl BufMgr {
    /// Creates a buffer manager with `num_bufs` frames and default settings
    ///
    /// # Panics
    /// Panics if `num_bufs` is zero
    pub fn new(num_bufs: usize) -> Self {
        assert!(num_bufs > 0, "buffer pool needs at least one frame");
        Self::build(num_bufs, BufferConfig::default().refbit_on_load)
    }

    /// Creates a buffer manager from a configuration
    ///
    /// # Returns
    /// * `Ok(BufMgr)` - A pool sized by `config.num_frames`
    /// * `Err(ConfigError::Invalid)` - The configuration failed validation
    pub fn with_config(config: &BufferConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config.num_frames, config.refbit_on_load))
    }

    fn build(num_bufs: usize, refbit_on_load: bool) -> Self {
        BufMgr {
            num_bufs,
            buf_table: (0..num_bufs).map(BufDesc::new).collect(),
            buf_pool: (0..num_bufs).map(|_| Page::new()).collect(),
            hash_table: BufHashTbl::new(num_bufs),
            clock_hand: num_bufs - 1,
            refbit_on_load,
        }
    }

    #[inline]
    fn advance_clock(&mut self) {
        self.clock_hand = (self.clock_hand + 1) % self.num_bufs;
    }

    /// Picks a frame for a new resident page using the clock policy
    ///
    /// A dirty victim is written back before its frame is handed out. The
    /// scan is bounded to two revolutions: the first may only clear
    /// reference bits, the second then reaches every unpinned frame.
    ///
    /// # Returns
    /// * `Ok(frame)` - A cleared frame
    /// * `Err(BufferError::PoolExhausted)` - Every frame is pinned
    fn alloc_buf(&mut self) -> BufferResult<FrameId> {
        for _ in 0..2 * self.num_bufs {
            let frame = self.clock_hand;
            let desc = &mut self.buf_table[frame];

            if !desc.valid {
                desc.clear();
                self.advance_clock();
                return Ok(frame);
            }

            if desc.refbit {
                desc.refbit = false;
                self.advance_clock();
                continue;
            }

            if desc.pin_cnt > 0 {
                self.advance_clock();
                continue;
            }

            let Some(file) = desc.file.as_ref() else {
                return Err(inconsistent(format!("valid frame {} has no file", frame)));
            };
            let tag = BufferTag::new(file.file_id(), desc.page_no);

            if desc.dirty {
                debug!("writing back {} from frame {} before reuse", tag, frame);
                file.write_page(desc.page_no, &self.buf_pool[frame])
                    .map_err(|source| BufferError::WriteFailed { tag, source })?;
            }

            self.hash_table
                .remove(&tag)
                .map_err(|err| inconsistent(format!("evicting frame {}: {}", frame, err)))?;
            self.buf_table[frame].clear();
            self.advance_clock();

            debug!("evicted {} from frame {}", tag, frame);
            return Ok(frame);
        }

        Err(BufferError::PoolExhausted)
    }

    /// Registers `page_no` of `file` as resident in `frame`, pinned once
    ///
    /// On failure the frame is left cleared.
    fn install(&mut self, frame: FrameId, file: &FileRef, page_no: PageNo) -> BufferResult<()> {
        let tag = BufferTag::new(file.file_id(), page_no);

        if let Err(err) = self.hash_table.insert(tag, frame) {
            error!("hash table refused {} for frame {}: {}", tag, frame, err);
            self.buf_table[frame].clear();
            return Err(BufferError::Index(err));
        }
        self.buf_table[frame].set(Arc::clone(file), page_no, self.refbit_on_load);
        Ok(())
    }

    /// Pins `page_no` of `file`, loading it on a miss
    fn pin_page(&mut self, file: &FileRef, page_no: PageNo) -> BufferResult<FrameId> {
        let tag = BufferTag::new(file.file_id(), page_no);

        // HIT: pin and mark referenced, no I/O
        if let Ok(frame) = self.hash_table.lookup(&tag) {
            let desc = &mut self.buf_table[frame];
            desc.pin_cnt += 1;
            desc.refbit = true;
            trace!("hit {} in frame {}, pin count {}", tag, frame, desc.pin_cnt);
            return Ok(frame);
        }

        // MISS: claim a frame and load from the store
        let frame = self.alloc_buf()?;
        if let Err(source) = file.read_page(page_no, &mut self.buf_pool[frame]) {
            debug!("load of {} into frame {} failed: {}", tag, frame, source);
            return Err(BufferError::ReadFailed { tag, source });
        }
        self.install(frame, file, page_no)?;

        debug!("loaded {} into frame {}", tag, frame);
        Ok(frame)
    }

    /// Allocates a new page in `file` and pins it in a zero-filled frame
    ///
    /// If the page cannot be made resident its number is handed back to the store.
    fn pin_new_page(&mut self, file: &FileRef) -> BufferResult<(PageNo, FrameId)> {
        let page_no = file.allocate_page()?;

        let frame = match self.alloc_buf() {
            Ok(frame) => frame,
            Err(err) => {
                release_new_page(file, page_no);
                return Err(err);
            }
        };

        self.buf_pool[frame].zero();
        if let Err(err) = self.install(frame, file, page_no) {
            release_new_page(file, page_no);
            return Err(err);
        }

        debug!("allocated file {} page {} in frame {}", file.file_id(), page_no, frame);
        Ok((page_no, frame))
    }

    /// Retrieves a page from the buffer pool, pinning it
    ///
    /// Each successful call must be matched by one `unpin_page`.
    ///
    /// # Arguments
    /// * `file` - Store owning the page
    /// * `page_no` - Page number within `file`
    ///
    /// # Returns
    /// * `Ok(&mut Page)` - The resident page content
    /// * `Err(BufferError)` - PoolExhausted, ReadFailed or WriteFailed
    pub fn read_page(&mut self, file: &FileRef, page_no: PageNo) -> BufferResult<&mut Page> {
        let frame = self.pin_page(file, page_no)?;
        Ok(&mut self.buf_pool[frame])
    }

    /// Releases a pin on a page
    ///
    /// # Arguments
    /// * `file` - Store owning the page
    /// * `page_no` - Page number within `file`
    /// * `dirty` - Whether the caller modified the page; once set, the
    ///   dirty flag stays until the page is written back
    ///
    /// # Returns
    /// * `Ok(())` - Successfully unpinned
    /// * `Err(BufferError)` - NotResident or NotPinned
    pub fn unpin_page(&mut self, file: &FileRef, page_no: PageNo, dirty: bool) -> BufferResult<()> {
        let tag = BufferTag::new(file.file_id(), page_no);
        let frame = self
            .hash_table
            .lookup(&tag)
            .map_err(|_| BufferError::NotResident(tag))?;

        let desc = &mut self.buf_table[frame];
        if desc.pin_cnt == 0 {
            return Err(BufferError::NotPinned(tag));
        }

        desc.pin_cnt -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /// Allocates a brand-new page in `file` and pins it
    ///
    /// # Returns
    /// * `Ok((page_no, &mut Page))` - The new page number and its zero-filled content
    /// * `Err(BufferError)` - Store, PoolExhausted, WriteFailed or Index
    pub fn alloc_page(&mut self, file: &FileRef) -> BufferResult<(PageNo, &mut Page)> {
        let (page_no, frame) = self.pin_new_page(file)?;
        Ok((page_no, &mut self.buf_pool[frame]))
    }

    /// Drops a page from the pool and releases it in its store
    ///
    /// The page is dropped even when pinned or dirty; callers must not hold
    /// a reference to a disposed page. The store failure is returned even
    /// though the in-memory cleanup already happened.
    pub fn dispose_page(&mut self, file: &FileRef, page_no: PageNo) -> BufferResult<()> {
        let tag = BufferTag::new(file.file_id(), page_no);

        if let Ok(frame) = self.hash_table.remove(&tag) {
            self.buf_table[frame].clear();
            debug!("disposed {} from frame {}", tag, frame);
        }

        file.dispose_page(page_no)?;
        Ok(())
    }

    /// Writes back and drops every resident page of `file`
    ///
    /// Stops at the first pinned page with `PagePinned`; pages handled
    /// before it stay written and dropped.
    pub fn flush_file(&mut self, file: &FileRef) -> BufferResult<()> {
        let file_id = file.file_id();

        for frame in 0..self.num_bufs {
            let desc = &mut self.buf_table[frame];
            if !desc.owned_by(file_id) {
                continue;
            }
            if !desc.valid {
                return Err(inconsistent(format!(
                    "invalid frame {} still tagged with file {}",
                    frame, file_id
                )));
            }

            let tag = BufferTag::new(file_id, desc.page_no);
            if desc.pin_cnt > 0 {
                return Err(BufferError::PagePinned(tag));
            }

            if desc.dirty {
                debug!("flushing {} from frame {}", tag, frame);
                file.write_page(desc.page_no, &self.buf_pool[frame])
                    .map_err(|source| BufferError::WriteFailed { tag, source })?;
                desc.dirty = false;
            }

            self.hash_table
                .remove(&tag)
                .map_err(|err| inconsistent(format!("flushing frame {}: {}", frame, err)))?;
            desc.clear();
        }
        Ok(())
    }

    /// Writes every dirty page back, keeping it resident
    pub fn flush_all(&mut self) -> BufferResult<()> {
        for frame in 0..self.num_bufs {
            let desc = &mut self.buf_table[frame];
            if !(desc.valid && desc.dirty) {
                continue;
            }
            let Some(file) = desc.file.as_ref() else {
                return Err(inconsistent(format!("valid frame {} has no file", frame)));
            };

            let tag = BufferTag::new(file.file_id(), desc.page_no);
            file.write_page(desc.page_no, &self.buf_pool[frame])
                .map_err(|source| BufferError::WriteFailed { tag, source })?;
            desc.dirty = false;
        }
        Ok(())
    }

    /// Pins a page and wraps it in a guard that unpins on drop
    pub fn fetch_page(&mut self, file: &FileRef, page_no: PageNo) -> BufferResult<PageGuard<'_>> {
        let frame = self.pin_page(file, page_no)?;
        Ok(PageGuard::new(self, Arc::clone(file), page_no, frame))
    }

    /// Allocates a page in `file` and wraps it in a guard that unpins on drop
    pub fn new_page(&mut self, file: &FileRef) -> BufferResult<PageGuard<'_>> {
        let (page_no, frame) = self.pin_new_page(file)?;
        Ok(PageGuard::new(self, Arc::clone(file), page_no, frame))
    }

    /// Looks up the frame holding a page
    ///
    /// # Returns
    /// * `Some(frame)` - Frame containing the page
    /// * `None` - Page not in buffer pool
    pub fn lookup(&self, file: &FileRef, page_no: PageNo) -> Option<FrameId> {
        self.hash_table
            .lookup(&BufferTag::new(file.file_id(), page_no))
            .ok()
    }

    /// Returns the pin count of a resident page
    pub fn pin_count(&self, file: &FileRef, page_no: PageNo) -> Option<u32> {
        self.lookup(file, page_no)
            .map(|frame| self.buf_table[frame].pin_cnt)
    }

    /// Returns the dirty flag of a resident page
    pub fn is_dirty(&self, file: &FileRef, page_no: PageNo) -> Option<bool> {
        self.lookup(file, page_no)
            .map(|frame| self.buf_table[frame].dirty)
    }

    /// Returns the descriptor of `frame`
    ///
    /// # Panics
    /// Panics if `frame` is out of range
    pub fn frame(&self, frame: FrameId) -> &BufDesc {
        &self.buf_table[frame]
    }

    /// Returns all frame descriptors in frame order
    pub fn frames(&self) -> &[BufDesc] {
        &self.buf_table
    }

    /// Returns the number of frames in the pool
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_bufs
    }

    /// Returns the number of resident pages
    #[inline]
    pub fn resident_count(&self) -> usize {
        self.hash_table.len()
    }

    /// Prints the frame table to stdout
    pub fn print_self(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for BufMgr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Print buffer...")?;
        for desc in &self.buf_table {
            write!(f, "{}\tpinCnt: {}", desc.frame_no, desc.pin_cnt)?;
            if let Some(tag) = desc.tag() {
                write!(f, "\tvalid\t{}", tag)?;
                if desc.dirty {
                    write!(f, "\tdirty")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "hash table entries: {}", self.hash_table.len())
    }
}

impl Drop for BufMgr {
    fn drop(&mut self) {
        // Best effort: write back every dirty page, failures are only logged
        for (frame, desc) in self.buf_table.iter().enumerate() {
            if !(desc.valid && desc.dirty) {
                continue;
            }
            let Some(file) = desc.file.as_ref() else {
                continue;
            };
            debug!("flushing page {} from frame {}", desc.page_no, frame);
            if let Err(err) = file.write_page(desc.page_no, &self.buf_pool[frame]) {
                warn!(
                    "teardown write-back of file {} page {} failed: {}",
                    file.file_id(),
                    desc.page_no,
                    err
                );
            }
        }
    }
}
