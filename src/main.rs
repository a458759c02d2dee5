//! CLI entry point for the quad-tree tile map tool

use clap::Parser;
use quadmap::io::cli::{Cli, FileProcessor};

fn main() -> quadmap::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level_filter())
        .format_timestamp(None)
        .init();

    let mut processor = FileProcessor::new(cli);
    let stdout = std::io::stdout();
    processor.process(&mut stdout.lock())
}
