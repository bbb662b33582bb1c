pub mod bio;
pub mod cli;
pub mod core;
pub mod report;
pub mod tools;
pub mod utils;

pub use crate::core::pipeline::{DecomplexOutcome, Decomplexer};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecomplexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Aligner failure: {0}")]
    Aligner(String),

    #[error("{tool} did not finish within {seconds} seconds")]
    AlignerTimeout { tool: String, seconds: u64 },

    #[error("Malformed similarity matrix line {line} in {}: '{content}'", .path.display())]
    MalformedMatrixLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Malformed label line {line}: '{content}'")]
    MalformedLabelLine { line: usize, content: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DecomplexError>;

/// Fail with `InputNotFound` unless `path` exists.
pub fn require_input(path: &std::path::Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DecomplexError::InputNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let missing = DecomplexError::InputNotFound(PathBuf::from("/data/its.fasta"));
        assert_eq!(format!("{}", missing), "Input not found: /data/its.fasta");

        let timeout = DecomplexError::AlignerTimeout {
            tool: "blastn".to_string(),
            seconds: 30,
        };
        assert_eq!(format!("{}", timeout), "blastn did not finish within 30 seconds");

        let matrix = DecomplexError::MalformedMatrixLine {
            path: PathBuf::from("its.sim"),
            line: 7,
            content: "a b".to_string(),
        };
        assert_eq!(
            format!("{}", matrix),
            "Malformed similarity matrix line 7 in its.sim: 'a b'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: DecomplexError = io_err.into();

        match err {
            DecomplexError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_require_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(require_input(dir.path()).is_ok());

        let missing = dir.path().join("absent.fasta");
        match require_input(&missing) {
            Err(DecomplexError::InputNotFound(p)) => assert_eq!(p, missing),
            other => panic!("Expected InputNotFound, got {:?}", other),
        }
    }
}
