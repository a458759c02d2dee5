//! Command-line interface for inspecting, packing, verifying and rendering maps

use crate::io::configuration::{ARCHIVE_EXTENSION, LEGACY_EXTENSION};
use crate::io::error::{MapError, Result, file_system, format_error, precondition};
use crate::io::image::export_preview_png;
use crate::io::progress::ProgressManager;
use crate::map::tilemap::TileMap;
use crate::quadtree::stream::is_archive;
use crate::render::atlas::TileAtlas;
use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "quadmap")]
#[command(
    author,
    version,
    about = "Inspect, pack and render quad-tree compressed tile maps",
    propagate_version = true
)]
/// Command-line arguments for the map tool
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Subcommands of the map tool
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a summary of a legacy map or archive
    Info {
        /// Map file to inspect
        #[arg(value_name = "MAP")]
        map: PathBuf,
    },

    /// Convert legacy maps into quad-tree archives next to the inputs
    Pack {
        /// Legacy map file or directory of legacy maps
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Overwrite archives that already exist
        #[arg(short, long)]
        no_skip: bool,
    },

    /// Check that archives decode and re-encode byte for byte
    Verify {
        /// Archive file or directory of archives
        #[arg(value_name = "TARGET")]
        target: PathBuf,
    },

    /// Render a map preview as PNG
    Render {
        /// Map file to render
        #[arg(value_name = "MAP")]
        map: PathBuf,

        /// Directory of `<file>_<tile>.png` tile images
        #[arg(short, long)]
        tiles: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    /// Log level selected by `--quiet` and `--verbose`
    pub const fn log_level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Runs one CLI command, writing reports to `out`
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new processor for parsed arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Run the selected command
    ///
    /// # Errors
    ///
    /// Returns an error if a target cannot be read, a map is malformed, or
    /// an output cannot be written
    pub fn process(&mut self, out: &mut dyn Write) -> Result<()> {
        match &self.cli.command {
            Command::Info { map } => {
                let map = read_map_file(map)?;
                out.write_all(map.map_info().as_bytes())?;
                Ok(())
            }
            Command::Pack { target, no_skip } => {
                let files = collect_files(target, LEGACY_EXTENSION)?;
                let skip_existing = !*no_skip;
                run_batch(&mut self.progress_manager, &files, out, |path| {
                    pack_file(path, skip_existing)
                })
            }
            Command::Verify { target } => {
                let files = collect_files(target, ARCHIVE_EXTENSION)?;
                run_batch(&mut self.progress_manager, &files, out, verify_file)
            }
            Command::Render {
                map,
                tiles,
                output,
            } => {
                let atlas = TileAtlas::load_dir(tiles)?;
                let map = read_map_file(map)?;
                export_preview_png(&map, &atlas, output)?;
                writeln!(out, "{}", output.display())?;
                Ok(())
            }
        }
    }
}

fn run_batch(
    progress_manager: &mut Option<ProgressManager>,
    files: &[PathBuf],
    out: &mut dyn Write,
    mut action: impl FnMut(&Path) -> Result<&'static str>,
) -> Result<()> {
    if files.is_empty() {
        warn!("no matching files found");
        return Ok(());
    }

    if let Some(pm) = progress_manager.as_mut() {
        pm.initialize(files.len());
    }

    for file in files {
        if let Some(pm) = progress_manager.as_mut() {
            pm.start_file(file);
        }
        let status = action(file)?;
        if let Some(pm) = progress_manager.as_mut() {
            pm.complete_file(status);
        }
        writeln!(out, "{status}\t{}", file.display())?;
    }

    if let Some(pm) = progress_manager.as_ref() {
        pm.finish();
    }
    Ok(())
}

/// Load a legacy map or archive, choosing the format by its magic
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed
pub fn read_map_file(path: &Path) -> Result<TileMap> {
    let bytes = std::fs::read(path).map_err(|e| file_system(path, "read map", e))?;
    let mut map = TileMap::invalid();
    map.load(&bytes)?;
    Ok(map)
}

/// Files to process: the target itself, or its matching entries sorted by name
///
/// # Errors
///
/// Returns an error if a target file has the wrong extension, the target
/// does not exist, or the directory cannot be read
pub fn collect_files(target: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let matches = |path: &Path| path.extension().and_then(|s| s.to_str()) == Some(extension);

    if target.is_file() {
        if matches(target) {
            Ok(vec![target.to_path_buf()])
        } else {
            Err(precondition(
                "collect files",
                &format!("'{}' is not a .{extension} file", target.display()),
            ))
        }
    } else if target.is_dir() {
        let mut files = Vec::new();
        let entries =
            std::fs::read_dir(target).map_err(|e| file_system(target, "read directory", e))?;
        for entry in entries {
            let path = entry
                .map_err(|e| file_system(target, "read directory entry", e))?
                .path();
            if path.is_file() && matches(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    } else {
        Err(precondition(
            "collect files",
            &format!("'{}' does not exist", target.display()),
        ))
    }
}

fn pack_file(path: &Path, skip_existing: bool) -> Result<&'static str> {
    let output = path.with_extension(ARCHIVE_EXTENSION);
    if skip_existing && output.exists() {
        info!("skipping {}, archive exists", path.display());
        return Ok("skipped");
    }

    let bytes = std::fs::read(path).map_err(|e| file_system(path, "read map", e))?;
    let map = TileMap::from_legacy(&bytes)?;
    let archive = map.to_archive()?;
    std::fs::write(&output, &archive).map_err(|e| file_system(&output, "write archive", e))?;
    info!(
        "packed {} ({} bytes -> {} bytes)",
        path.display(),
        bytes.len(),
        archive.len()
    );
    Ok("packed")
}

fn verify_file(path: &Path) -> Result<&'static str> {
    let bytes = std::fs::read(path).map_err(|e| file_system(path, "read archive", e))?;
    if !is_archive(&bytes) {
        return Err(format_error("archive", &"missing QMAP magic"));
    }
    let map = TileMap::from_archive(&bytes)?;
    let reencoded = map.to_archive()?;
    if reencoded != bytes {
        return Err(MapError::Format {
            context: "archive",
            reason: format!(
                "'{}' does not re-encode to identical bytes",
                path.display()
            ),
        });
    }
    Ok("ok")
}
