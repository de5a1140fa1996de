//! Scoped page pins
//!
//! A PageGuard owns one pin on a resident page and releases it when dropped,
//! so the pin cannot leak on early returns. Modifications are only recorded
//! as dirty when the holder says so with `mark_dirty`.

use super::{BufMgr, BufferResult};
use crate::page::Page;
use crate::store::FileRef;
use crate::types::{FrameId, PageNo};
use log::warn;
use std::ops::{Deref, DerefMut};

/// Pinned page handle borrowed from a BufMgr
pub struct PageGuard<'a> {
    mgr: &'a mut BufMgr,
    file: FileRef,
    page_no: PageNo,
    frame: FrameId,
    dirty: bool,
    released: bool,
}

impl<'a> PageGuard<'a> {
    pub(super) fn new(mgr: &'a mut BufMgr, file: FileRef, page_no: PageNo, frame: FrameId) -> Self {
        Self {
            mgr,
            file,
            page_no,
            frame,
            dirty: false,
            released: false,
        }
    }

    #[inline]
    pub fn page_no(&self) -> PageNo {
        self.page_no
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    /// Records that the page was modified; the unpin will mark it dirty
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Unpins now and reports the outcome instead of logging it
    pub fn release(mut self) -> BufferResult<()> {
        self.released = true;
        self.mgr.unpin_page(&self.file, self.page_no, self.dirty)
    }
}

impl Deref for PageGuard<'_> {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.mgr.buf_pool[self.frame]
    }
}

impl DerefMut for PageGuard<'_> {
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.mgr.buf_pool[self.frame]
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.mgr.unpin_page(&self.file, self.page_no, self.dirty) {
            warn!("dropping guard for page {}: {}", self.page_no, err);
        }
    }
}
