//! Page structure definition
//!
//! A page is an opaque, fixed-size block of bytes. Neither the buffer
//! manager nor the page stores interpret its content, with the single
//! exception of free-list links written by `PagedFile` into disposed pages.

use crate::types::PAGE_SIZE;

/// Heap-allocated page buffer of exactly `PAGE_SIZE` bytes
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Creates a new zero-filled Page
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Returns the page content
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }

    /// Returns the page content for modification
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Resets every byte to zero
    #[inline]
    pub fn zero(&mut self) {
        self.data.fill(0);
    }

    /// Overwrites this page with the content of `other`
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data[..]);
    }

    /// Copies `bytes` into the page at `offset`, leaving the rest untouched
    ///
    /// # Panics
    /// Panics if the write would run past the end of the page
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        assert!(offset + bytes.len() <= PAGE_SIZE, "write past end of page");
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Returns true if every byte is zero
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }

    /// Returns the page size in bytes
    #[inline]
    pub fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    // Printing 8KB of bytes is never useful; show a short prefix instead
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("prefix", &&self.data[..16])
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
