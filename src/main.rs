//! Bufmgr demo program entry
//!
//! Usage: bufmgr [config.json]

// Use jemalloc as global allocator
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

use bufmgr::store::{FileRef, PagedFile};
use bufmgr::{BufMgr, BufferConfig};
use std::error::Error;
use std::fs;
use std::sync::Arc;

const DEMO_PAGES: u32 = 16;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => BufferConfig::load(path)?,
        None => BufferConfig::default(),
    };
    println!("Bufmgr starting with {} frames...", config.num_frames);

    fs::create_dir_all(&config.data_dir)?;
    let path = config.data_dir.join("demo.pages");
    let file: FileRef = Arc::new(PagedFile::open_local(&path)?);

    let mut mgr = BufMgr::with_config(&config)?;

    // Allocate pages and stamp each with its own page number
    let mut pages = Vec::new();
    for _ in 0..DEMO_PAGES {
        let mut guard = mgr.new_page(&file)?;
        let page_no = guard.page_no();
        guard.write_bytes(0, &page_no.to_le_bytes());
        guard.mark_dirty();
        guard.release()?;
        pages.push(page_no);
    }

    // Read everything back, forcing evictions when the pool is small
    for &page_no in &pages {
        let guard = mgr.fetch_page(&file, page_no)?;
        let stamp = u32::from_le_bytes(guard.data()[..4].try_into()?);
        if stamp != page_no {
            return Err(format!("page {} carries stamp {}", page_no, stamp).into());
        }
    }

    mgr.print_self();
    mgr.flush_file(&file)?;
    println!("Bufmgr wrote {} pages to {}", pages.len(), path.display());
    Ok(())
}
