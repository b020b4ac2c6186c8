// On-disk constants for the directory FAT image format
// All multi-byte fields are big-endian

// Superblock field offsets (byte offset 0 of the image)
pub const SB_SECTOR_SIZE: usize = 0x00;
pub const SB_CLUSTER_SIZE: usize = 0x02;
pub const SB_DISK_SIZE: usize = 0x04;
pub const SB_FAT_START: usize = 0x06;
pub const SB_FAT_LENGTH: usize = 0x08;
pub const SB_DATA_START: usize = 0x0A;
pub const SB_DATA_LENGTH: usize = 0x0C;
pub const SB_DISK_NAME: usize = 0x0E;
pub const SUPERBLOCK_SIZE: usize = 46;
pub const DISK_NAME_LEN: usize = 32;

// Directory entry record
pub const ENTRY_SIZE: usize = 28;
pub const ENTRY_NAME_CAPACITY: usize = 16;

// Child pointer record
pub const POINTER_SIZE: usize = 4;

// Allocation table status words
pub const FAT_FREE: u16 = 0xFFFF;
pub const FAT_ALLOCATED: u16 = 0xFFFE;
pub const FAT_ENTRY_SIZE: usize = 2;

// Entry type tags
pub const ENTRY_TYPE_DIRECTORY: u8 = 1;

// Pointer type tags
pub const PTR_TYPE_EMPTY: u8 = 0;
pub const PTR_TYPE_ENTRY: u8 = 1;
pub const PTR_TYPE_LINK: u8 = 2;

// Fill byte for a freshly formatted image
pub const IMAGE_FILL_BYTE: u8 = 0xFF;

// Layout
pub const FAT_START_CLUSTER: u16 = 1;
pub const ROOT_CLUSTER: u16 = 0;
pub const ROOT_NAME: &str = "root";

static_assertions::const_assert_eq!(SB_DISK_NAME + DISK_NAME_LEN, SUPERBLOCK_SIZE);
static_assertions::const_assert_eq!(1 + 2 + 2 + 1 + ENTRY_NAME_CAPACITY + 4 + 2, ENTRY_SIZE);
static_assertions::const_assert_eq!(1 + 1 + 2, POINTER_SIZE);
