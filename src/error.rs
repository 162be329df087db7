//! Crate-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::descriptor::DescriptorError;

/// Result type for fsproj operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort processing of a single project file.
#[derive(Error, Debug)]
pub enum Error {
    /// The project file could not be turned into a descriptor.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A filesystem or process operation failed.
    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Progress output could not be written.
    #[error("cannot write output: {0}")]
    Output(#[source] std::io::Error),

    /// The process working directory could not be determined.
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { context, path: path.into(), source }
    }
}
