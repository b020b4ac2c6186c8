// Child pointer slot traversal
//
// A directory's pointer slots form one logical sequence: the slots after the entry
// in its own cluster, then the slots of each overflow cluster. When a segment
// fills, its last slot becomes a link to the next overflow cluster, so the
// children count covers link slots as well as child pointers.

use fatdir_core::{DirHandle, FatDirError};
use log::trace;
use std::io::{Read, Seek, Write};
use super::constants::*;
use super::directory::{ChildPointer, PointerType};
use super::image::FatImage;

/// One run of contiguous pointer slots inside a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    cluster: u16,
    base: usize,
    capacity: usize,
}

/// Where the next child pointer of a directory goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextSlot {
    /// A free slot inside an existing segment
    Free { cluster: u16, offset: usize },
    /// The last slot of a full segment; it must become a link to a new overflow cluster
    Overflow { cluster: u16, offset: usize },
}

fn first_segment<D: Read + Write + Seek>(image: &FatImage<D>, handle: DirHandle) -> Segment {
    Segment {
        cluster: handle.cluster(),
        base: ENTRY_SIZE,
        capacity: image.initial_capacity(),
    }
}

fn overflow_segment<D: Read + Write + Seek>(image: &FatImage<D>, cluster: u16) -> Segment {
    Segment {
        cluster,
        base: 0,
        capacity: image.overflow_capacity(),
    }
}

/// Clusters of the child entries of a directory, in slot order.
///
/// Scans at most `children_count` logical slots, following link slots into overflow
/// clusters and stopping at the first empty slot.
pub fn child_clusters<D: Read + Write + Seek>(
    image: &mut FatImage<D>,
    handle: DirHandle,
    children_count: u16,
) -> Result<Vec<u16>, FatDirError> {
    let mut children = Vec::new();
    let mut remaining = children_count as usize;
    let mut segment = first_segment(image, handle);
    let mut hops = 0usize;

    'segments: while remaining > 0 {
        let data = image.read_cluster(segment.cluster)?;

        for slot in 0..segment.capacity {
            if remaining == 0 {
                break 'segments;
            }
            remaining -= 1;

            let offset = segment.base + slot * POINTER_SIZE;
            let ptr = ChildPointer::decode(&data[offset..offset + POINTER_SIZE])?;
            trace!("Directory {} slot {}:{} -> {:?}", handle, segment.cluster, slot, ptr);

            match ptr.kind {
                PointerType::Empty => break 'segments,
                PointerType::Entry => {
                    image.check_cluster(ptr.start)?;
                    children.push(ptr.start);
                }
                PointerType::Link => {
                    image.check_cluster(ptr.start)?;
                    hops += 1;
                    if hops > image.superblock().data_length as usize {
                        return Err(FatDirError::CorruptImage(format!(
                            "Overflow chain of directory {} loops",
                            handle
                        )));
                    }
                    segment = overflow_segment(image, ptr.start);
                    continue 'segments;
                }
            }
        }

        // Segment exhausted without a link
        break;
    }

    Ok(children)
}

/// Locate the slot for a directory's next child pointer given its current children count
pub fn next_slot<D: Read + Write + Seek>(
    image: &mut FatImage<D>,
    handle: DirHandle,
    children_count: u16,
) -> Result<NextSlot, FatDirError> {
    let mut index = children_count as usize;
    let mut segment = first_segment(image, handle);
    let mut hops = 0usize;

    loop {
        let last = segment.capacity - 1;
        if index < last {
            return Ok(NextSlot::Free {
                cluster: segment.cluster,
                offset: segment.base + index * POINTER_SIZE,
            });
        }
        if index == last {
            return Ok(NextSlot::Overflow {
                cluster: segment.cluster,
                offset: segment.base + last * POINTER_SIZE,
            });
        }

        // Segment is full; its last slot must link onward
        let data = image.read_cluster(segment.cluster)?;
        let offset = segment.base + last * POINTER_SIZE;
        let link = ChildPointer::decode(&data[offset..offset + POINTER_SIZE])?;
        if link.kind != PointerType::Link {
            return Err(FatDirError::CorruptImage(format!(
                "Directory {} counts {} slots but cluster {} has no overflow link",
                handle, children_count, segment.cluster
            )));
        }
        image.check_cluster(link.start)?;
        hops += 1;
        if hops > image.superblock().data_length as usize {
            return Err(FatDirError::CorruptImage(format!(
                "Overflow chain of directory {} loops",
                handle
            )));
        }

        index -= segment.capacity;
        segment = overflow_segment(image, link.start);
    }
}
