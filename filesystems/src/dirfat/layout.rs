// Allocation table and data area sizing
// Splits a disk of N clusters into superblock, allocation table and data area

use fatdir_core::{FatDirError, FormatOptions};
use log::debug;
use super::constants::*;

/// Region boundaries derived from the image geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cluster_bytes: u32,
    pub fat_start: u16,
    pub fat_length: u16,
    pub data_start: u16,
    pub data_length: u16,
}

impl Layout {
    /// Allocation table clusters needed to hold `data_length` status words
    pub fn fat_clusters_needed(data_length: u32, cluster_bytes: u32) -> u32 {
        (data_length * FAT_ENTRY_SIZE as u32).div_ceil(cluster_bytes)
    }
}

/// Calculate the largest data area that fits beside its allocation table.
///
/// Cluster 0 holds the superblock. The data area length `d` is the largest value
/// with `ceil(2d / cluster_bytes) + d <= disk_size - 1`; every cluster left over
/// after the data area goes to the allocation table.
pub fn calculate_layout(options: &FormatOptions) -> Result<Layout, FatDirError> {
    options.validate()?;

    let cluster_bytes = options.cluster_bytes() as u32;
    let disk_size = options.disk_size as u32;

    // Superblock, one table cluster and one data cluster at minimum
    if disk_size < 3 {
        return Err(FatDirError::LayoutInfeasible(format!(
            "Disk of {} clusters cannot hold a superblock, allocation table and data cluster",
            disk_size
        )));
    }

    let available = disk_size - 1;
    let data_length = (1..available)
        .rev()
        .find(|&d| Layout::fat_clusters_needed(d, cluster_bytes) + d <= available)
        .ok_or_else(|| FatDirError::LayoutInfeasible(format!(
            "No data area fits on a disk of {} clusters of {} bytes",
            disk_size, cluster_bytes
        )))?;

    let fat_length = available - data_length;
    let layout = Layout {
        cluster_bytes,
        fat_start: FAT_START_CLUSTER,
        fat_length: fat_length as u16,
        data_start: FAT_START_CLUSTER + fat_length as u16,
        data_length: data_length as u16,
    };

    debug!(
        "Layout for {} clusters of {} bytes: fat {}+{}, data {}+{}",
        disk_size, cluster_bytes, layout.fat_start, layout.fat_length,
        layout.data_start, layout.data_length
    );

    Ok(layout)
}
