use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output folder + input file name up to its last '.'
///
/// `dnabarcoder` and `data/its.v2.fasta` give `dnabarcoder/its.v2`.
pub fn working_base(output_dir: &Path, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match name.rfind('.') {
        Some(0) | None => name.as_str(),
        Some(dot) => &name[..dot],
    };
    output_dir.join(stem)
}

/// `base` with `suffix` appended verbatim (`its` + `.diff.fasta`)
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Files a run reads or writes next to each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub similarity: PathBuf,
    pub cluster_report: PathBuf,
    pub filtered_fasta: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, input: &Path) -> Self {
        let base = working_base(output_dir, input);
        Self {
            similarity: with_suffix(&base, ".sim"),
            cluster_report: with_suffix(&base, ".similar"),
            filtered_fasta: with_suffix(&base, ".diff.fasta"),
            summary: with_suffix(&base, ".summary.json"),
        }
    }

    pub fn with_similarity(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.similarity = path;
        }
        self
    }
}

pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_working_base_strips_last_extension() {
        let out = Path::new("dnabarcoder");
        assert_eq!(
            working_base(out, Path::new("data/its.v2.fasta")),
            PathBuf::from("dnabarcoder/its.v2")
        );
        assert_eq!(
            working_base(out, Path::new("/abs/unite")),
            PathBuf::from("dnabarcoder/unite")
        );
    }

    #[test]
    fn test_hidden_file_keeps_name() {
        assert_eq!(
            working_base(Path::new("out"), Path::new(".hidden")),
            PathBuf::from("out/.hidden")
        );
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new(Path::new("out"), Path::new("its.fasta"));
        assert_eq!(paths.similarity, PathBuf::from("out/its.sim"));
        assert_eq!(paths.cluster_report, PathBuf::from("out/its.similar"));
        assert_eq!(paths.filtered_fasta, PathBuf::from("out/its.diff.fasta"));
        assert_eq!(paths.summary, PathBuf::from("out/its.summary.json"));

        let paths = paths.with_similarity(Some(PathBuf::from("shared.sim")));
        assert_eq!(paths.similarity, PathBuf::from("shared.sim"));
    }

    #[test]
    fn test_ensure_output_dir_creates_nested_folders() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Existing folder is fine
        ensure_output_dir(&nested).unwrap();
    }
}
