//! Page module
//!
//! Contains the fixed-size page buffer that frames hold and page stores
//! read into and write out of.

pub mod page;

// Re-export Page struct for easier access
pub use page::Page;
