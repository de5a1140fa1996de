//! Frame descriptors
//!
//! One BufDesc per frame records which page the frame holds and the
//! pin, dirty and reference state the replacement policy consults. A
//! descriptor is either fully valid or fully cleared.

use super::BufferTag;
use crate::store::FileRef;
use crate::types::{FileId, FrameId, INVALID_PAGE_NO, PageNo};
use std::fmt;

/// BufDesc struct, used to describe frame state
pub struct BufDesc {
    pub(super) frame_no: FrameId,
    pub(super) file: Option<FileRef>,
    pub(super) page_no: PageNo,
    pub(super) pin_cnt: u32,
    pub(super) dirty: bool,
    pub(super) valid: bool,
    pub(super) refbit: bool,
}

impl BufDesc {
    /// Creates a cleared descriptor for frame `frame_no`
    pub(super) fn new(frame_no: FrameId) -> Self {
        Self {
            frame_no,
            file: None,
            page_no: INVALID_PAGE_NO,
            pin_cnt: 0,
            dirty: false,
            valid: false,
            refbit: false,
        }
    }

    /// Drops ownership and resets every state bit
    pub(super) fn clear(&mut self) {
        self.file = None;
        self.page_no = INVALID_PAGE_NO;
        self.pin_cnt = 0;
        self.dirty = false;
        self.valid = false;
        self.refbit = false;
    }

    /// Marks the frame as holding `page_no` of `file`, pinned once
    pub(super) fn set(&mut self, file: FileRef, page_no: PageNo, refbit: bool) {
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_cnt = 1;
        self.dirty = false;
        self.valid = true;
        self.refbit = refbit;
    }

    /// Returns true if the descriptor is tagged with store `file_id`
    pub(super) fn owned_by(&self, file_id: FileId) -> bool {
        self.file.as_ref().is_some_and(|f| f.file_id() == file_id)
    }

    #[inline]
    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    #[inline]
    pub fn page_no(&self) -> PageNo {
        self.page_no
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_cnt
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn refbit(&self) -> bool {
        self.refbit
    }

    /// Returns the identity of the resident page, if any
    pub fn tag(&self) -> Option<BufferTag> {
        match (&self.file, self.valid) {
            (Some(file), true) => Some(BufferTag::new(file.file_id(), self.page_no)),
            _ => None,
        }
    }
}

impl fmt::Debug for BufDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufDesc")
            .field("frame_no", &self.frame_no)
            .field("file", &self.file.as_ref().map(|file| file.file_id()))
            .field("page_no", &self.page_no)
            .field("pin_cnt", &self.pin_cnt)
            .field("dirty", &self.dirty)
            .field("valid", &self.valid)
            .field("refbit", &self.refbit)
            .finish()
    }
}
