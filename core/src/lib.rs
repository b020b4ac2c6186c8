pub mod error;
pub mod handle;
pub mod options;

pub use error::FatDirError;
pub use handle::DirHandle;
pub use options::{FormatOptions, DEFAULT_IMAGE_NAME, LABEL_CAPACITY, MIN_SECTOR_SIZE};
