use crate::bio::labels::LabelOptions;
use crate::tools::blast::BlastOptions;
use crate::{DecomplexError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clustering: ClusteringConfig,
    pub labels: LabelConfig,
    pub aligner: AlignerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum score for two sequences to be neighbors
    pub threshold: f64,
    /// Alignments shorter than this are scored proportionally lower
    pub min_coverage: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Column of the label file holding the taxon label
    pub position: usize,
    pub comment_prefix: String,
    pub id_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub blastn: Option<PathBuf>,
    pub makeblastdb: Option<PathBuf>,
    /// 0 uses every available CPU
    pub threads: usize,
    /// 0 disables the timeout
    pub timeout_seconds: u64,
    pub short_task_below: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            min_coverage: 400,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            position: 0,
            comment_prefix: "#".to_string(),
            id_marker: ">".to_string(),
        }
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            blastn: None,
            makeblastdb: None,
            threads: 0,
            timeout_seconds: 3600,
            short_task_below: 300,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("dnabarcoder"),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let threshold = self.clustering.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(DecomplexError::Config(format!(
                "clustering.threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        if self.labels.comment_prefix.is_empty() {
            return Err(DecomplexError::Config(
                "labels.comment_prefix must not be empty".to_string(),
            ));
        }
        if self.labels.id_marker.chars().count() != 1 {
            return Err(DecomplexError::Config(format!(
                "labels.id_marker must be a single character, got '{}'",
                self.labels.id_marker
            )));
        }
        Ok(())
    }

    pub fn label_options(&self) -> LabelOptions {
        let defaults = LabelOptions::default();
        LabelOptions {
            position: self.labels.position,
            comment_prefix: self.labels.comment_prefix.clone(),
            id_marker: self.labels.id_marker.chars().next().unwrap_or(defaults.id_marker),
        }
    }

    pub fn blast_options(&self) -> BlastOptions {
        BlastOptions {
            blastn: self.aligner.blastn.clone(),
            makeblastdb: self.aligner.makeblastdb.clone(),
            threads: if self.aligner.threads == 0 {
                num_cpus::get()
            } else {
                self.aligner.threads
            },
            timeout: (self.aligner.timeout_seconds > 0)
                .then(|| Duration::from_secs(self.aligner.timeout_seconds)),
            min_coverage: self.clustering.min_coverage,
            short_task_below: self.aligner.short_task_below,
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    crate::require_input(path)?;
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| DecomplexError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| DecomplexError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
