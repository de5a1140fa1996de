//! VFS interface definitions

use crate::vfs::error::VfsResult;

/// Handle to an open file supporting positional reads and writes
///
/// The handle closes the underlying file when dropped.
pub trait FileHandle: Send + Sync {
    /// Read from the file at a specific offset
    ///
    /// # Returns
    /// * `Ok(usize)` - The number of bytes read, 0 at end of file
    fn pread(&self, buf: &mut [u8], offset: u64) -> VfsResult<usize>;

    /// Write to the file at a specific offset
    fn pwrite(&self, buf: &[u8], offset: u64) -> VfsResult<usize>;

    /// Returns the current file length in bytes
    fn len(&self) -> VfsResult<u64>;

    /// Flushes file content to stable storage
    fn sync(&self) -> VfsResult<()>;

    /// Reads exactly `buf.len()` bytes at `offset`, zero-filling past end of file
    fn pread_full(&self, buf: &mut [u8], offset: u64) -> VfsResult<()> {
        let mut done = 0;
        while done < buf.len() {
            let n = self.pread(&mut buf[done..], offset + done as u64)?;
            if n == 0 {
                buf[done..].fill(0);
                break;
            }
            done += n;
        }
        Ok(())
    }

    /// Writes all of `buf` at `offset`
    fn pwrite_all(&self, buf: &[u8], offset: u64) -> VfsResult<()> {
        let mut done = 0;
        while done < buf.len() {
            let n = self.pwrite(&buf[done..], offset + done as u64)?;
            if n == 0 {
                return Err(crate::vfs::VfsError::ShortTransfer {
                    expected: buf.len(),
                    actual: done,
                });
            }
            done += n;
        }
        Ok(())
    }
}

/// VFS interface trait
pub trait VfsInterface {
    /// Open a file for reading and writing, creating it if missing
    ///
    /// # Arguments
    /// * `path` - The path to the file
    ///
    /// # Returns
    /// * `Ok(Box<dyn FileHandle>)` if the file was opened successfully
    /// * `Err(VfsError)` if an error occurred
    fn open_or_create(&self, path: &str) -> VfsResult<Box<dyn FileHandle>>;
}
