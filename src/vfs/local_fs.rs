//! Local file system implementation using libc system calls

use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::interface::{FileHandle, VfsInterface};
use libc::{self, c_int, c_void, off_t, size_t};
use std::ffi::CString;

/// Local file handle implementation
pub struct LocalFileHandle {
    fd: c_int,
}

impl LocalFileHandle {
    /// Create a new LocalFileHandle from a file descriptor
    pub fn new(fd: c_int) -> Self {
        LocalFileHandle { fd }
    }
}

impl FileHandle for LocalFileHandle {
    fn pread(&self, buf: &mut [u8], offset: u64) -> VfsResult<usize> {
        let result = unsafe {
            libc::pread(
                self.fd,
                buf.as_mut_ptr() as *mut c_void,
                buf.len() as size_t,
                offset as off_t,
            )
        };

        if result < 0 {
            Err(VfsError::last_os_error("pread"))
        } else {
            Ok(result as usize)
        }
    }

    fn pwrite(&self, buf: &[u8], offset: u64) -> VfsResult<usize> {
        let result = unsafe {
            libc::pwrite(
                self.fd,
                buf.as_ptr() as *const c_void,
                buf.len() as size_t,
                offset as off_t,
            )
        };

        if result < 0 {
            Err(VfsError::last_os_error("pwrite"))
        } else {
            Ok(result as usize)
        }
    }

    fn len(&self) -> VfsResult<u64> {
        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::fstat(self.fd, &mut stat) };

        if result < 0 {
            Err(VfsError::last_os_error("fstat"))
        } else {
            Ok(stat.st_size as u64)
        }
    }

    fn sync(&self) -> VfsResult<()> {
        let result = unsafe { libc::fsync(self.fd) };

        if result < 0 {
            Err(VfsError::last_os_error("fsync"))
        } else {
            Ok(())
        }
    }
}

impl Drop for LocalFileHandle {
    fn drop(&mut self) {
        // Nothing useful can be done about a failed close here
        let _ = unsafe { libc::close(self.fd) };
    }
}

/// Local file system implementation
#[derive(Debug, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        LocalFs
    }
}

impl VfsInterface for LocalFs {
    fn open_or_create(&self, path: &str) -> VfsResult<Box<dyn FileHandle>> {
        let c_path = CString::new(path)?;
        let flags = libc::O_CREAT | libc::O_RDWR;

        let fd = unsafe { libc::open(c_path.as_ptr(), flags, 0o644 as libc::c_uint) };

        if fd < 0 {
            let err = std::io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(libc::ENOENT) => Err(VfsError::NotFound(path.to_string())),
                Some(libc::EACCES) | Some(libc::EPERM) => {
                    Err(VfsError::PermissionDenied(path.to_string()))
                }
                errno => Err(VfsError::SystemError(
                    errno.unwrap_or(0),
                    format!("open failed for path '{}': {}", path, err),
                )),
            };
        }

        Ok(Box::new(LocalFileHandle::new(fd)))
    }
}
