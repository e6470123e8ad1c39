//! Integration tests for the buffer manager over on-disk page files.
//!
//! These tests verify cross-component behavior that unit tests don't cover.

use clockdb::storage::{DiskFile, FileHandle};
use clockdb::{BufferManager, Error, PageId};
use tempfile::tempdir;

fn create_file(dir: &tempfile::TempDir, name: &str) -> FileHandle {
    FileHandle::new(DiskFile::create(dir.path().join(name)).unwrap())
}

/// Test data persistence across multiple eviction cycles.
#[test]
fn test_data_persistence_across_evictions() {
    let dir = tempdir().unwrap();
    let file = create_file(&dir, "test.db");
    let mut bpm = BufferManager::new(2);

    let mut page_ids = vec![];
    for i in 0u8..5 {
        let mut page = bpm.new_page(&file).unwrap();
        page.data_mut()[0] = i;
        page.data_mut()[1] = i.wrapping_mul(3);
        page_ids.push(page.page_id());
    }

    for (i, &page_id) in page_ids.iter().enumerate() {
        let page = bpm.fetch_page(&file, page_id).unwrap();
        assert_eq!(page.data()[0], i as u8);
        assert_eq!(page.data()[1], (i as u8).wrapping_mul(3));
    }
}

/// Test flush and reload across manager instances.
#[test]
fn test_flush_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let data = b"persistent!";

    let page_id;

    {
        let file = FileHandle::new(DiskFile::create(&path).unwrap());
        let mut bpm = BufferManager::new(10);

        let (pid, handle) = bpm.allocate_page(&file).unwrap();
        page_id = pid;
        bpm.page_mut(&handle).unwrap().data_mut()[..data.len()].copy_from_slice(data);
        bpm.unpin_page(&file, page_id, true).unwrap();

        bpm.flush_file(&file).unwrap();
        assert_eq!(bpm.resident_pages(), 0);
    }

    {
        let file = FileHandle::new(DiskFile::open(&path).unwrap());
        let mut bpm = BufferManager::new(10);

        let page = bpm.fetch_page(&file, page_id).unwrap();
        assert_eq!(&page.data()[..data.len()], data);
    }
}

/// Dirty pages still in the pool are written when the manager is dropped.
#[test]
fn test_drop_writes_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    {
        let file = FileHandle::new(DiskFile::create(&path).unwrap());
        let mut bpm = BufferManager::new(4);
        let mut page = bpm.new_page(&file).unwrap();
        page.data_mut()[0] = 0x5C;
    }

    let file = FileHandle::new(DiskFile::open(&path).unwrap());
    assert_eq!(file.read_page(PageId::new(0)).unwrap().data()[0], 0x5C);
}

/// Two files with the same page numbers never share a frame.
#[test]
fn test_multiple_files() {
    let dir = tempdir().unwrap();
    let a = create_file(&dir, "a.db");
    let b = create_file(&dir, "b.db");
    let mut bpm = BufferManager::new(4);

    {
        let mut page = bpm.new_page(&a).unwrap();
        page.data_mut()[0] = b'a';
    }
    {
        let mut page = bpm.new_page(&b).unwrap();
        page.data_mut()[0] = b'b';
    }

    assert_ne!(
        bpm.frame_of(&a, PageId::new(0)),
        bpm.frame_of(&b, PageId::new(0))
    );

    bpm.flush_file(&a).unwrap();
    assert!(bpm.is_resident(&b, PageId::new(0)));

    assert_eq!(bpm.fetch_page(&a, PageId::new(0)).unwrap().data()[0], b'a');
    assert_eq!(bpm.fetch_page(&b, PageId::new(0)).unwrap().data()[0], b'b');
}

/// Disposed pages are gone from the file and their slot is reused.
#[test]
fn test_dispose_then_reallocate() {
    let dir = tempdir().unwrap();
    let file = create_file(&dir, "test.db");
    let mut bpm = BufferManager::new(3);

    for _ in 0..3 {
        let (page_id, _) = bpm.allocate_page(&file).unwrap();
        bpm.unpin_page(&file, page_id, false).unwrap();
    }

    bpm.dispose_page(&file, PageId::new(1)).unwrap();
    assert!(matches!(
        bpm.read_page(&file, PageId::new(1)),
        Err(Error::PageNotFound(_))
    ));

    let (page_id, _) = bpm.allocate_page(&file).unwrap();
    assert_eq!(page_id, PageId::new(1));
    assert_eq!(bpm.pin_count(&file, page_id), Some(1));
}

/// Test stats accuracy under load.
#[test]
fn test_stats_accuracy() {
    let dir = tempdir().unwrap();
    let file = create_file(&dir, "test.db");
    let mut bpm = BufferManager::new(2);

    let page_id = bpm.new_page(&file).unwrap().page_id();

    for _ in 0..5 {
        let _ = bpm.fetch_page(&file, page_id).unwrap();
    }

    let stats = *bpm.stats();
    assert_eq!(stats.hits, 5);
    assert_eq!(stats.misses, 0);

    for i in 0..3u8 {
        let mut page = bpm.new_page(&file).unwrap();
        page.data_mut()[0] = i;
    }

    let stats = *bpm.stats();
    assert!(stats.evictions >= 1);
    assert!(stats.pages_written >= 1);

    bpm.reset_stats();
    assert_eq!(*bpm.stats(), clockdb::BufferStats::default());

    let _ = bpm.fetch_page(&file, page_id).unwrap();
    let stats = *bpm.stats();
    assert_eq!(stats.hits + stats.misses, 1);
}
