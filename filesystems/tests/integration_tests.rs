// End-to-end tests against image files on disk

use fatdir_filesystems::dirfat::constants::{ENTRY_SIZE, FAT_ALLOCATED, FAT_FREE, POINTER_SIZE};
use fatdir_filesystems::{DirFs, DirHandle, FatDirError, FatImage, FormatOptions};
use std::fs::File;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

fn formatted_image(options: &FormatOptions) -> (TempDir, DirFs) {
    init_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let fs = DirFs::new(dir.path().join("FileSystem.bin"));
    fs.format(options).expect("Format failed");
    (dir, fs)
}

fn read_fat(fs: &DirFs) -> Vec<u16> {
    let image = FatImage::open(File::open(fs.path()).unwrap()).unwrap();
    (0..image.fat().len() as u16)
        .map(|i| image.fat().status(i).unwrap())
        .collect()
}

#[test]
fn test_image_size_matches_geometry() {
    for &(sector, per_cluster, disk) in &[(64u16, 1u16, 10u16), (64, 4, 33), (512, 1, 100), (100, 3, 7)] {
        let (_dir, fs) = formatted_image(&FormatOptions::new(sector, per_cluster, disk));
        let len = std::fs::metadata(fs.path()).unwrap().len();
        assert_eq!(len, sector as u64 * per_cluster as u64 * disk as u64);
    }
}

#[test]
fn test_allocation_table_after_format() {
    let (_dir, fs) = formatted_image(&FormatOptions::new(64, 1, 200));
    let fat = read_fat(&fs);
    assert_eq!(fat[0], FAT_ALLOCATED);
    assert!(fat[1..].iter().all(|&s| s == FAT_FREE));
}

#[test]
fn test_opendir_root_and_errors() {
    let (_dir, fs) = formatted_image(&FormatOptions::default());
    assert_eq!(fs.opendir("root").unwrap(), DirHandle::ROOT);
    assert!(matches!(fs.opendir(""), Err(FatDirError::InvalidPath(_))));
    assert!(matches!(fs.opendir("notroot/x"), Err(FatDirError::InvalidPath(_))));
    assert!(matches!(fs.opendir("root/missing"), Err(FatDirError::PathNotFound(_))));
}

#[test]
fn test_driver_scenario() {
    let (_dir, fs) = formatted_image(&FormatOptions::new(64, 1, 10));

    let root = fs.opendir("root/").unwrap();
    let help = fs.mkdir(root, "help").unwrap();
    assert_eq!(fs.opendir("root/help").unwrap(), help);

    let os = fs.mkdir(help, "os").unwrap();
    assert_eq!(fs.opendir("root/help/os").unwrap(), os);

    let aardvark = fs.mkdir(fs.opendir("root/").unwrap(), "aardvark").unwrap();
    let fsa = fs.mkdir(fs.opendir("root/help").unwrap(), "fsa").unwrap();
    assert_eq!(fs.opendir("root/aardvark").unwrap(), aardvark);
    assert_eq!(fs.opendir("root/help/fsa").unwrap(), fsa);

    let before = read_fat(&fs);
    let result = fs.mkdir(help, "abcdefghijklmnopqrstuv");
    assert!(matches!(result, Err(FatDirError::NameTooLong { len: 22, .. })));
    assert_eq!(read_fat(&fs), before);
    assert_eq!(fs.read_entry(help).unwrap().children_count, 2);

    let names: Vec<String> = fs
        .list("root/help")
        .unwrap()
        .into_iter()
        .map(|l| l.entry.name_string())
        .collect();
    assert_eq!(names, vec!["os", "fsa"]);
}

#[test]
fn test_overflow_cluster_children_are_reachable() {
    // 64-byte clusters: 9 pointer slots after the entry, 16 per overflow cluster
    let (_dir, fs) = formatted_image(&FormatOptions::new(64, 1, 64));

    let mut handles = Vec::new();
    for i in 0..8 {
        handles.push(fs.mkdir(DirHandle::ROOT, &format!("dir{}", i)).unwrap());
    }
    assert_eq!(fs.read_entry(DirHandle::ROOT).unwrap().children_count, 8);

    // Initial slots are exhausted; this one spills into an overflow cluster
    let spilled = fs.mkdir(DirHandle::ROOT, "spilled").unwrap();
    assert_eq!(fs.read_entry(DirHandle::ROOT).unwrap().children_count, 10);
    assert_eq!(fs.opendir("root/spilled").unwrap(), spilled);

    // The link replaced the last slot of the root cluster
    let bytes = std::fs::read(fs.path()).unwrap();
    let info = fs.info().unwrap();
    let root_offset = info.data_start as usize * info.cluster_bytes as usize;
    let link = &bytes[root_offset + ENTRY_SIZE + 8 * POINTER_SIZE..][..POINTER_SIZE];
    assert_eq!(link[0], 2);

    // Further children keep filling the overflow cluster
    let later = fs.mkdir(DirHandle::ROOT, "later").unwrap();
    assert_eq!(fs.opendir("root/later").unwrap(), later);
    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(fs.opendir(&format!("root/dir{}", i)).unwrap(), *handle);
    }

    let listed = fs.list("root").unwrap();
    assert_eq!(listed.len(), 10);
    assert_eq!(listed[8].handle, spilled);
    assert_eq!(listed[9].handle, later);
}

#[test]
fn test_second_overflow_cluster() {
    // 8 + 15 children fill the initial cluster and the first overflow cluster
    let (_dir, fs) = formatted_image(&FormatOptions::new(64, 1, 80));
    for i in 0..23 {
        fs.mkdir(DirHandle::ROOT, &format!("c{}", i)).unwrap();
    }
    assert_eq!(fs.read_entry(DirHandle::ROOT).unwrap().children_count, 24);

    let deep = fs.mkdir(DirHandle::ROOT, "deep").unwrap();
    assert_eq!(fs.read_entry(DirHandle::ROOT).unwrap().children_count, 26);
    assert_eq!(fs.opendir("root/deep").unwrap(), deep);
    assert_eq!(fs.opendir("root/c22").unwrap(), fs.list("root").unwrap()[22].handle);
    assert_eq!(fs.list("root").unwrap().len(), 24);
}

#[test]
fn test_disk_full_is_reported() {
    let (_dir, fs) = formatted_image(&FormatOptions::new(64, 1, 5));
    // 3 data clusters: root and two children
    fs.mkdir(DirHandle::ROOT, "a").unwrap();
    fs.mkdir(DirHandle::ROOT, "b").unwrap();

    let before = read_fat(&fs);
    assert!(matches!(fs.mkdir(DirHandle::ROOT, "c"), Err(FatDirError::DiskFull)));
    assert_eq!(read_fat(&fs), before);
    assert_eq!(fs.read_entry(DirHandle::ROOT).unwrap().children_count, 2);
}

#[test]
fn test_reformat_replaces_image() {
    let (_dir, fs) = formatted_image(&FormatOptions::default());
    fs.mkdir(DirHandle::ROOT, "old").unwrap();

    fs.format(&FormatOptions::new(128, 1, 20)).unwrap();
    assert!(matches!(fs.opendir("root/old"), Err(FatDirError::PathNotFound(_))));
    assert_eq!(std::fs::metadata(fs.path()).unwrap().len(), 128 * 20);
}

#[test]
fn test_infeasible_format_keeps_existing_image() {
    let (_dir, fs) = formatted_image(&FormatOptions::default());
    fs.mkdir(DirHandle::ROOT, "kept").unwrap();

    assert!(matches!(
        fs.format(&FormatOptions::new(64, 1, 2)),
        Err(FatDirError::LayoutInfeasible(_))
    ));
    assert!(fs.opendir("root/kept").is_ok());
}

#[test]
fn test_garbage_file_is_not_an_image() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    std::fs::write(&path, vec![0xFFu8; 640]).unwrap();

    let fs = DirFs::new(&path);
    assert!(matches!(fs.opendir("root"), Err(FatDirError::CorruptImage(_))));
}
