//! Common test utilities for decomplex integration tests
//!
//! Fixture writers for FASTA, label and similarity-matrix files inside a
//! throwaway directory.
#![allow(dead_code)]

use decomplex::bio::labels::ClassTable;
use decomplex::bio::sequence::Sequence;
use decomplex::core::similarity::SimilarityMatrix;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment that manages a temporary directory
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get a path within the test environment
    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Write `(id, description, residues)` records as FASTA
    pub fn write_fasta(&self, name: &str, records: &[(&str, &str, &str)]) -> PathBuf {
        let mut text = String::new();
        for (id, description, residues) in records {
            if description.is_empty() {
                text.push_str(&format!(">{}\n{}\n", id, residues));
            } else {
                text.push_str(&format!(">{} {}\n{}\n", id, description, residues));
            }
        }
        self.write(name, &text)
    }

    /// Write a tab-separated label file, one `id<TAB>label` row each
    pub fn write_labels(&self, name: &str, rows: &[(&str, &str)]) -> PathBuf {
        let mut text = String::from("#id\tspecies\n");
        for (id, label) in rows {
            text.push_str(&format!(">{}\t{}\n", id, label));
        }
        self.write(name, &text)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture folder");
        }
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}

pub fn sequences(ids: &[&str]) -> Vec<Sequence> {
    ids.iter()
        .map(|id| Sequence::new(id.to_string(), b"ACGTACGTAC".to_vec()))
        .collect()
}

pub fn class_table(rows: &[(&str, &str)]) -> ClassTable {
    let mut table = ClassTable::new();
    for (id, label) in rows {
        table.insert(id, label);
    }
    table
}

/// Symmetric matrix with self-similarity 1 for every id
pub fn symmetric_matrix(ids: &[&str], pairs: &[(&str, &str, f64)]) -> SimilarityMatrix {
    let mut matrix = SimilarityMatrix::new();
    for id in ids {
        matrix.insert_max(id, id, 1.0);
    }
    for (i, j, score) in pairs {
        matrix.insert_pair_max(i, j, *score);
    }
    matrix
}
