use clap::{Parser, Subcommand};
use fatdir_core::{DirHandle, FormatOptions, DEFAULT_IMAGE_NAME};
use fatdir_filesystems::DirFs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fatdir")]
#[command(about = "Format directory FAT images and manage their directories", long_about = None)]
struct Cli {
    /// Image file to operate on
    #[arg(short, long, global = true, default_value = DEFAULT_IMAGE_NAME)]
    image: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new image
    Format {
        /// JSON file with format options
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Bytes per sector (>= 64)
        #[arg(long)]
        sector_size: Option<u16>,
        /// Sectors per cluster
        #[arg(long)]
        cluster_size: Option<u16>,
        /// Disk size in clusters
        #[arg(long)]
        disk_size: Option<u16>,
        /// Disk label (up to 32 bytes)
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Resolve an absolute path to a directory handle
    Opendir {
        /// Path such as root/help/os
        path: String,
    },
    /// Create a directory
    Mkdir {
        /// Full path of the new directory, or a parent handle when NAME is given
        target: String,
        /// Child name, when TARGET is a parent handle
        name: Option<String>,
    },
    /// List the children of a directory
    Ls {
        #[arg(default_value = "root")]
        path: String,
    },
    /// Show image geometry and usage
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::debug!("Using image {}", cli.image.display());
    let fs = DirFs::new(&cli.image);

    match cli.command {
        Commands::Format { config, sector_size, cluster_size, disk_size, label } => {
            let mut options = match config {
                Some(path) => FormatOptions::from_json_file(&path)?,
                None => FormatOptions::default(),
            };
            if let Some(v) = sector_size {
                options.sector_size = v;
            }
            if let Some(v) = cluster_size {
                options.cluster_size = v;
            }
            if let Some(v) = disk_size {
                options.disk_size = v;
            }
            if let Some(v) = label {
                options.label = v;
            }

            let sb = fs.format(&options)?;
            println!("Formatted {} ({} bytes)", cli.image.display(), sb.image_bytes());
            println!("  Allocation table: clusters {}..{}", sb.fat_start, sb.fat_start + sb.fat_length);
            println!("  Data area: clusters {}..{}", sb.data_start, sb.data_start + sb.data_length);
        }
        Commands::Opendir { path } => {
            let handle = fs.opendir(&path)?;
            println!("{}", handle);
        }
        Commands::Mkdir { target, name } => {
            let handle = match name {
                Some(name) => {
                    let parent: DirHandle = target.parse()?;
                    fs.mkdir(parent, &name)?
                }
                None => fs.mkdir_path(&target)?,
            };
            println!("{}", handle);
        }
        Commands::Ls { path } => {
            let entries = fs.list(&path)?;
            if entries.is_empty() {
                println!("(empty)");
            }
            for listed in entries {
                let created = listed
                    .entry
                    .created()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>5}  {}  {:3} children  {}",
                    listed.handle.cluster(),
                    created,
                    listed.entry.children_count,
                    listed.entry.name_string()
                );
            }
        }
        Commands::Info { json } => {
            let info = fs.info()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Image: {}", cli.image.display());
                println!("  Label: {}", info.label);
                println!("  Sector size: {} bytes", info.sector_size);
                println!("  Cluster size: {} sectors ({} bytes)", info.cluster_size, info.cluster_bytes);
                println!("  Disk size: {} clusters", info.disk_size);
                println!("  Allocation table: start {}, length {}", info.fat_start, info.fat_length);
                println!("  Data area: start {}, length {}", info.data_start, info.data_length);
                println!("  Free clusters: {}", info.free_clusters);
                println!("  Root children: {}", info.root_children);
            }
        }
    }

    Ok(())
}
