//! Input/output operations and error handling
//!
//! File formats, the command-line front end and progress display live here,
//! outside the in-memory map core.

/// Command-line interface and batch processing
pub mod cli;
/// Format constants and runtime defaults
pub mod configuration;
/// Error types and context management
pub mod error;
/// PNG preview export
pub mod image;
/// Legacy fixed-layout map file reader and writer
pub mod legacy;
/// Progress bar management for batch commands
pub mod progress;
