//! Ground-truth taxon labels for sequences.
//!
//! A label file is tab separated: column 0 holds the sequence id (optionally
//! prefixed with '>'), and a configurable column holds the taxon label. Lines
//! starting with the comment prefix are ignored.

use crate::{DecomplexError, Result};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// How to read a label file
#[derive(Debug, Clone)]
pub struct LabelOptions {
    /// Column holding the taxon label
    pub position: usize,
    pub comment_prefix: String,
    /// Marker stripped from the start of the id column
    pub id_marker: char,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            position: 0,
            comment_prefix: "#".to_string(),
            id_marker: '>',
        }
    }
}

impl LabelOptions {
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

/// Label -> sequence ids, and the inverse sequence id -> label.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: IndexMap<String, Vec<String>>,
    classification: HashMap<String, String>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `seq_id` as carrying `label`. A sequence keeps its first label.
    pub fn insert(&mut self, seq_id: &str, label: &str) -> bool {
        if self.classification.contains_key(seq_id) {
            return false;
        }
        self.classification
            .insert(seq_id.to_string(), label.to_string());
        self.classes
            .entry(label.to_string())
            .or_default()
            .push(seq_id.to_string());
        true
    }

    /// Load labels for the sequences in `known_ids` from a label file.
    pub fn load<P: AsRef<Path>>(
        path: P,
        known_ids: &HashSet<&str>,
        options: &LabelOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        crate::require_input(path)?;
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(reader, known_ids, options)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        known_ids: &HashSet<&str>,
        options: &LabelOptions,
    ) -> Result<Self> {
        let mut table = Self::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with(options.comment_prefix.as_str()) {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let seq_id = fields[0].trim().trim_start_matches(options.id_marker);
            if seq_id.is_empty() {
                let issue = DecomplexError::MalformedLabelLine {
                    line: index + 1,
                    content: line.clone(),
                };
                warn!("{}, skipping", issue);
                skipped += 1;
                continue;
            }

            if !known_ids.contains(seq_id) {
                continue;
            }

            // A position past the last column means "no label", not an error
            let label = fields
                .get(options.position)
                .map(|field| field.trim_end())
                .unwrap_or("");

            if !table.insert(seq_id, label) {
                debug!("Sequence {} labelled more than once, keeping first label", seq_id);
            }
        }

        if skipped > 0 {
            warn!("Skipped {} malformed label lines", skipped);
        }
        debug!(
            "Loaded {} labels across {} classes",
            table.classification.len(),
            table.classes.len()
        );

        Ok(table)
    }

    /// Label of a sequence, or "" for sequences the label file does not cover
    pub fn label_of(&self, seq_id: &str) -> &str {
        self.classification
            .get(seq_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Number of sequences bearing `label`
    pub fn support(&self, label: &str) -> usize {
        self.classes.get(label).map_or(0, Vec::len)
    }

    /// Ground-truth groups in first-seen order
    pub fn groups(&self) -> &IndexMap<String, Vec<String>> {
        &self.classes
    }

    pub fn labelled_count(&self) -> usize {
        self.classification.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classification.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn ids<'a>(values: &[&'a str]) -> HashSet<&'a str> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_load_strips_marker_and_skips_comments() {
        let text = "#id\tspecies\n>s1\tFusarium oxysporum\ns2\tFusarium solani\ns3\tFusarium oxysporum\n";
        let table = ClassTable::from_reader(
            Cursor::new(text),
            &ids(&["s1", "s2", "s3"]),
            &LabelOptions::default().with_position(1),
        )
        .unwrap();

        assert_eq!(table.label_of("s1"), "Fusarium oxysporum");
        assert_eq!(table.support("Fusarium oxysporum"), 2);
        assert_eq!(table.support("Fusarium solani"), 1);
        assert_eq!(
            table.groups().keys().cloned().collect::<Vec<_>>(),
            vec!["Fusarium oxysporum".to_string(), "Fusarium solani".to_string()]
        );
    }

    #[test]
    fn test_position_past_last_column_is_empty_label() {
        let table = ClassTable::from_reader(
            Cursor::new("s1\tgenus\n"),
            &ids(&["s1"]),
            &LabelOptions::default().with_position(5),
        )
        .unwrap();

        assert_eq!(table.label_of("s1"), "");
        assert_eq!(table.support(""), 1);
    }

    #[test]
    fn test_unknown_ids_and_malformed_lines_are_ignored() {
        let table = ClassTable::from_reader(
            Cursor::new("\tlabel_without_id\nother\tsp1\ns1\tsp1\n"),
            &ids(&["s1", "s2"]),
            &LabelOptions::default().with_position(1),
        )
        .unwrap();

        assert_eq!(table.labelled_count(), 1);
        assert_eq!(table.label_of("other"), "");
        // Not in the label file at all
        assert_eq!(table.label_of("s2"), "");
        assert_eq!(table.support("sp1"), 1);
    }

    #[test]
    fn test_first_label_wins() {
        let mut table = ClassTable::new();
        assert!(table.insert("s1", "sp1"));
        assert!(!table.insert("s1", "sp2"));
        assert_eq!(table.label_of("s1"), "sp1");
        assert_eq!(table.support("sp2"), 0);
    }

    #[test]
    fn test_missing_label_file() {
        let result = ClassTable::load("/nonexistent/labels.tsv", &ids(&[]), &LabelOptions::default());
        assert!(matches!(result, Err(DecomplexError::InputNotFound(_))));
    }
}
