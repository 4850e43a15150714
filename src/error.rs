//! Error types for pageflow library.

use std::io;
use thiserror::Error;

use crate::tree::NodeId;

/// Result type alias for pageflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during pagination and export.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when writing an exported file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A measurement oracle could not report a rendered height.
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// The measurement surface is already attached to the render tree.
    #[error("Measurement surface is already in use")]
    SurfaceBusy,

    /// The document view or measurement surface is not bound yet.
    #[error("Document view is not available")]
    ViewUnavailable,

    /// An export was requested while another one is still running.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// A node addressed by id is no longer part of the document.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// No node lives at a tree path that was handed out during the same pass.
    #[error("No node at path {0:?}")]
    PathNotFound(Vec<usize>),

    /// A font file could not be loaded for measurement.
    #[error("Font error: {0}")]
    Font(String),

    /// Malformed HTML input.
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A document writer failed to serialize the export document.
    #[error("Write error: {0}")]
    Write(String),

    /// No writer is registered for the requested format.
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ViewUnavailable;
        assert_eq!(err.to_string(), "Document view is not available");

        let err = Error::NodeNotFound(NodeId::new(42));
        assert_eq!(err.to_string(), "Node not found: n42");

        let err = Error::PathNotFound(vec![0, 3]);
        assert_eq!(err.to_string(), "No node at path [0, 3]");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
