// VFS functionality tests

use super::*;
use tempfile::TempDir;

fn test_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_str().unwrap().to_string()
}

#[test]
fn test_vfs_open_creates_file() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFs::new();
    let path = test_path(&dir, "pages.dat");

    let file = fs.open_or_create(&path).unwrap();
    assert_eq!(file.len().unwrap(), 0);
    drop(file);

    assert!(dir.path().join("pages.dat").exists());
}

#[test]
fn test_vfs_pread_pwrite() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFs::new();
    let path = test_path(&dir, "pages.dat");
    let file = fs.open_or_create(&path).unwrap();

    // Write data at specific offsets using pwrite
    let data1 = b"Hello";
    let data2 = b"World";
    assert_eq!(file.pwrite(data1, 0).unwrap(), data1.len());
    assert_eq!(file.pwrite(data2, 6).unwrap(), data2.len());
    assert_eq!(file.len().unwrap(), 11);

    let mut buf1 = [0u8; 5];
    let mut buf2 = [0u8; 5];
    assert_eq!(file.pread(&mut buf1, 0).unwrap(), buf1.len());
    assert_eq!(file.pread(&mut buf2, 6).unwrap(), buf2.len());
    assert_eq!(&buf1, data1);
    assert_eq!(&buf2, data2);
}

#[test]
fn test_vfs_pread_full_zero_fills_past_eof() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFs::new();
    let file = fs.open_or_create(&test_path(&dir, "short.dat")).unwrap();

    file.pwrite_all(b"abc", 0).unwrap();

    let mut buf = [0xFFu8; 8];
    file.pread_full(&mut buf, 0).unwrap();
    assert_eq!(&buf, b"abc\0\0\0\0\0");
}

#[test]
fn test_vfs_sync_keeps_length() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFs::new();
    let file = fs.open_or_create(&test_path(&dir, "sync.dat")).unwrap();

    file.pwrite_all(b"Hello, VFS! This is a longer string.", 0).unwrap();
    file.sync().unwrap();
    assert_eq!(file.len().unwrap(), 36);
}

#[test]
fn test_vfs_reopen_sees_previous_writes() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFs::new();
    let path = test_path(&dir, "reopen.dat");

    {
        let file = fs.open_or_create(&path).unwrap();
        file.pwrite_all(b"persisted", 4).unwrap();
    }

    let file = fs.open_or_create(&path).unwrap();
    let mut buf = [0u8; 9];
    file.pread_full(&mut buf, 4).unwrap();
    assert_eq!(&buf, b"persisted");
}

#[test]
fn test_vfs_error_handling() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFs::new();
    let missing = test_path(&dir, "no_such_dir/file.dat");

    // Parent directory does not exist
    assert!(matches!(fs.open_or_create(&missing), Err(VfsError::NotFound(_))));

    // Interior NUL byte
    assert!(matches!(
        fs.open_or_create("bad\0path"),
        Err(VfsError::InvalidArgument(_))
    ));
}
