//! Error types and context management for map operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all map operations
#[derive(Debug)]
pub enum MapError {
    /// Serialized data is malformed
    ///
    /// Covers bad headers, stream length mismatches and presence/payload
    /// desynchronization found while replaying a quad-tree stream.
    Format {
        /// Stage or layer being decoded when the problem was found
        context: &'static str,
        /// Description of what's wrong with the data
        reason: String,
    },

    /// Cell coordinates lie outside the grid
    OutOfBounds {
        /// Requested column
        x: usize,
        /// Requested row
        y: usize,
        /// Grid width in cells
        width: usize,
        /// Grid height in cells
        height: usize,
    },

    /// Rectangle is empty or does not fit inside the grid
    InvalidRegion {
        /// Left edge of the rectangle
        x: usize,
        /// Top edge of the rectangle
        y: usize,
        /// Rectangle width
        width: usize,
        /// Rectangle height
        height: usize,
        /// Grid dimensions (width, height)
        grid_dimensions: (usize, usize),
    },

    /// Operation called in a state that does not allow it
    Precondition {
        /// Name of the rejected operation
        operation: &'static str,
        /// Explanation of the violated precondition
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to load a tile image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },
}

impl MapError {
    /// Whether this error is a malformed-data error
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Whether this error is a coordinate or rectangle range error
    pub const fn is_range(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }

    /// Whether this error is a violated precondition
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format { context, reason } => {
                write!(f, "Malformed {context}: {reason}")
            }
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => {
                write!(
                    f,
                    "Cell ({x}, {y}) is out of bounds (grid size {width}x{height})"
                )
            }
            Self::InvalidRegion {
                x,
                y,
                width,
                height,
                grid_dimensions,
            } => {
                write!(
                    f,
                    "Region {width}x{height} at ({x}, {y}) does not fit grid {}x{}",
                    grid_dimensions.0, grid_dimensions.1
                )
            }
            Self::Precondition { operation, reason } => {
                write!(f, "Cannot {operation}: {reason}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for map results
pub type Result<T> = std::result::Result<T, MapError>;

/// Enriches format errors with the stage that produced them
pub trait WithContext<T> {
    /// Replace the context of a format error
    ///
    /// # Errors
    ///
    /// Propagates the original error, relabelled when it is a format error
    fn with_operation(self, operation: &'static str) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<MapError>,
{
    fn with_operation(self, operation: &'static str) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Range and I/O errors already carry their own location
            if let MapError::Format { context, .. } = &mut error {
                *context = operation;
            }
            error
        })
    }
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create a format error
pub fn format_error(context: &'static str, reason: &impl ToString) -> MapError {
    MapError::Format {
        context,
        reason: reason.to_string(),
    }
}

/// Create a precondition error
pub fn precondition(operation: &'static str, reason: &impl ToString) -> MapError {
    MapError::Precondition {
        operation,
        reason: reason.to_string(),
    }
}

/// Create a file system error bound to a path
pub fn file_system(
    path: impl Into<PathBuf>,
    operation: &'static str,
    source: std::io::Error,
) -> MapError {
    MapError::FileSystem {
        path: path.into(),
        operation,
        source,
    }
}
