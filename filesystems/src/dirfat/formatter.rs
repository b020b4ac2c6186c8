// Image formatter
// Lays down superblock, allocation table and root directory on a fresh image

use fatdir_core::{FatDirError, FormatOptions};
use log::info;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use super::allocator::AllocationTable;
use super::constants::*;
use super::directory::DirEntry;
use super::layout::calculate_layout;
use super::superblock::Superblock;

/// Format any seekable device as a new image.
///
/// The device is filled with 0xFF for the full image length before the superblock,
/// allocation table and root directory are written. Nothing is written if the
/// geometry is infeasible.
pub fn format_device<W: Write + Seek>(device: &mut W, options: &FormatOptions) -> Result<Superblock, FatDirError> {
    let layout = calculate_layout(options)?;
    let superblock = Superblock::new(options, &layout);
    let cluster_bytes = superblock.cluster_bytes();

    // Fill, one cluster at a time
    let fill = vec![IMAGE_FILL_BYTE; cluster_bytes as usize];
    device.seek(SeekFrom::Start(0))?;
    for _ in 0..superblock.disk_size {
        device.write_all(&fill)?;
    }

    device.seek(SeekFrom::Start(0))?;
    device.write_all(&superblock.encode())?;

    let mut fat = AllocationTable::new(superblock.data_length);
    fat.mark_allocated(ROOT_CLUSTER)?;
    device.seek(SeekFrom::Start(superblock.fat_start as u64 * cluster_bytes))?;
    device.write_all(&fat.to_bytes())?;

    let root = DirEntry::new_directory(ROOT_NAME)?;
    let mut root_cluster = vec![0u8; cluster_bytes as usize];
    root_cluster[..ENTRY_SIZE].copy_from_slice(&root.encode());
    device.seek(SeekFrom::Start((superblock.data_start as u64 + ROOT_CLUSTER as u64) * cluster_bytes))?;
    device.write_all(&root_cluster)?;
    device.flush()?;

    info!(
        "Formatted image: {} clusters of {} bytes, allocation table {}+{}, data {}+{}",
        superblock.disk_size,
        cluster_bytes,
        superblock.fat_start,
        superblock.fat_length,
        superblock.data_start,
        superblock.data_length
    );

    Ok(superblock)
}

/// Create (or replace) an image file at `path`
pub fn format_image(path: impl AsRef<Path>, options: &FormatOptions) -> Result<Superblock, FatDirError> {
    let path = path.as_ref();
    // Check the geometry before the file is created or truncated
    calculate_layout(options)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let superblock = format_device(&mut file, options)?;
    file.sync_all()?;

    info!("Wrote image {}", path.display());
    Ok(superblock)
}
