// Directory FAT image: superblock + allocation table + single-cluster directories

pub mod allocator;
pub mod constants;
pub mod directory;
pub mod formatter;
pub mod image;
pub mod layout;
pub mod ops;
pub mod path_resolver;
pub mod pointer_chain;
pub mod superblock;
pub mod timestamps;
pub mod writer;

pub use allocator::AllocationTable;
pub use directory::{ChildPointer, DirEntry, PointerType};
pub use formatter::{format_device, format_image};
pub use image::FatImage;
pub use layout::{calculate_layout, Layout};
pub use ops::{DirFs, ImageInfo};
pub use path_resolver::{split_path, ListedEntry, PathResolver};
pub use superblock::Superblock;
pub use writer::DirectoryWriter;
