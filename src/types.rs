/// Global type definitions
///
/// Stores constants and type aliases shared by the page stores and the buffer manager

/// Page size in bytes (8KB)
pub const PAGE_SIZE: usize = 8192;

/// Page number within a single page store
pub type PageNo = u32;

/// Sentinel page number carried by cleared frame descriptors
pub const INVALID_PAGE_NO: PageNo = PageNo::MAX;

/// Identity of a page store, unique within the process
pub type FileId = u32;

/// Index of a frame in the buffer pool
pub type FrameId = usize;
