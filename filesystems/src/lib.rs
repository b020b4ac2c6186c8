// Directory FAT image manager
// Formats flat image files and creates and resolves directories inside them

pub mod dirfat;

pub use dirfat::{
    calculate_layout, format_device, format_image, split_path, AllocationTable, ChildPointer,
    DirEntry, DirFs, DirectoryWriter, FatImage, ImageInfo, Layout, ListedEntry, PathResolver,
    PointerType, Superblock,
};
pub use fatdir_core::{DirHandle, FatDirError, FormatOptions};
