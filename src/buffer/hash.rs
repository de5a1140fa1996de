//! Buffer hash table
//!
//! Maps the identity of a resident page to the frame holding it. Keys are
//! unique; inserting an identity twice is an error rather than an update.

use crate::types::{FileId, FrameId, PageNo};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use xxhash_rust::xxh64::Xxh64Builder;

/// BufferTag names a page by its store and page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferTag {
    /// Identity of the owning page store
    pub file: FileId,
    /// Page number within that store
    pub page_no: PageNo,
}

impl BufferTag {
    /// Creates a new BufferTag
    #[inline]
    pub fn new(file: FileId, page_no: PageNo) -> Self {
        Self { file, page_no }
    }
}

impl fmt::Display for BufferTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {} page {}", self.file, self.page_no)
    }
}

/// Hash table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// Identity is already mapped to a frame
    DuplicateKey(BufferTag),
    /// Identity is not mapped
    NotFound(BufferTag),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::DuplicateKey(tag) => write!(f, "Duplicate hash table key: {}", tag),
            IndexError::NotFound(tag) => write!(f, "Hash table key not found: {}", tag),
        }
    }
}

impl Error for IndexError {}

/// Identity index from BufferTag to frame number
pub struct BufHashTbl {
    map: HashMap<BufferTag, FrameId, Xxh64Builder>,
}

impl BufHashTbl {
    /// Creates a table sized for a pool of `num_frames` frames
    pub fn new(num_frames: usize) -> Self {
        // Headroom so a full pool never triggers a rehash
        let capacity = num_frames + num_frames / 5 + 1;
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, Xxh64Builder::new(0)),
        }
    }

    /// Maps `tag` to `frame`
    pub fn insert(&mut self, tag: BufferTag, frame: FrameId) -> Result<(), IndexError> {
        if self.map.contains_key(&tag) {
            return Err(IndexError::DuplicateKey(tag));
        }
        self.map.insert(tag, frame);
        Ok(())
    }

    /// Returns the frame holding `tag`
    pub fn lookup(&self, tag: &BufferTag) -> Result<FrameId, IndexError> {
        self.map.get(tag).copied().ok_or(IndexError::NotFound(*tag))
    }

    /// Removes the mapping for `tag`, returning the frame it pointed to
    pub fn remove(&mut self, tag: &BufferTag) -> Result<FrameId, IndexError> {
        self.map.remove(tag).ok_or(IndexError::NotFound(*tag))
    }

    /// Number of mapped identities
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over every (identity, frame) pair in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&BufferTag, &FrameId)> {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_lookup_remove() {
        let mut table = BufHashTbl::new(4);
        let tag = BufferTag::new(1, 10);

        table.insert(tag, 3).unwrap();
        assert_eq!(table.lookup(&tag), Ok(3));
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove(&tag), Ok(3));
        assert_eq!(table.lookup(&tag), Err(IndexError::NotFound(tag)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut table = BufHashTbl::new(4);
        let tag = BufferTag::new(1, 10);

        table.insert(tag, 0).unwrap();
        assert_eq!(table.insert(tag, 1), Err(IndexError::DuplicateKey(tag)));
        // Existing mapping untouched
        assert_eq!(table.lookup(&tag), Ok(0));
    }

    #[test]
    fn test_remove_missing() {
        let mut table = BufHashTbl::new(4);
        let tag = BufferTag::new(2, 5);
        assert_eq!(table.remove(&tag), Err(IndexError::NotFound(tag)));
    }

    #[test]
    fn test_same_page_different_files() {
        let mut table = BufHashTbl::new(4);
        table.insert(BufferTag::new(1, 7), 0).unwrap();
        table.insert(BufferTag::new(2, 7), 1).unwrap();

        assert_eq!(table.lookup(&BufferTag::new(1, 7)), Ok(0));
        assert_eq!(table.lookup(&BufferTag::new(2, 7)), Ok(1));
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(BufferTag::new(3, 42).to_string(), "file 3 page 42");
    }
}
