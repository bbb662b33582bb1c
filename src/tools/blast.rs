use crate::bio::sequence::Sequence;
use crate::tools::traits::{Aligner, AlignmentHit};
use crate::{DecomplexError, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Keep the aligner working directory when a search fails
pub const PRESERVE_ON_FAILURE_ENV: &str = "DECOMPLEX_PRESERVE_ALIGNER_ON_FAILURE";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for a BLAST+ self-alignment
#[derive(Debug, Clone)]
pub struct BlastOptions {
    pub blastn: Option<PathBuf>,
    pub makeblastdb: Option<PathBuf>,
    pub threads: usize,
    /// None waits forever
    pub timeout: Option<Duration>,
    /// Coverage the hits will be scored against
    pub min_coverage: usize,
    /// Switch to `-task blastn-short` below this minimum coverage
    pub short_task_below: usize,
}

impl Default for BlastOptions {
    fn default() -> Self {
        Self {
            blastn: None,
            makeblastdb: None,
            threads: num_cpus::get(),
            timeout: Some(Duration::from_secs(3600)),
            min_coverage: 400,
            short_task_below: 300,
        }
    }
}

/// BLAST+ (makeblastdb + blastn) integration
pub struct BlastAligner {
    blastn: PathBuf,
    makeblastdb: PathBuf,
    options: BlastOptions,
}

impl BlastAligner {
    /// Locate the BLAST+ binaries, preferring explicit paths over PATH lookup
    pub fn new(options: BlastOptions) -> Result<Self> {
        let blastn = locate_binary("blastn", options.blastn.as_deref())?;
        let makeblastdb = locate_binary("makeblastdb", options.makeblastdb.as_deref())?;
        debug!(
            "Using blastn at {} and makeblastdb at {}",
            blastn.display(),
            makeblastdb.display()
        );

        Ok(Self {
            blastn,
            makeblastdb,
            options,
        })
    }

    pub fn options(&self) -> &BlastOptions {
        &self.options
    }

    pub fn uses_short_task(&self) -> bool {
        self.options.min_coverage < self.options.short_task_below
    }

    fn search_in(
        &self,
        workdir: &Path,
        query: &[Sequence],
        reference: &[Sequence],
    ) -> Result<Vec<AlignmentHit>> {
        let reference_path = workdir.join("reference.fasta");
        let query_path = workdir.join("query.fasta");
        let db_path = workdir.join("db");
        let output_path = workdir.join("hits.tsv");

        write_plain_fasta(&reference_path, reference)?;
        write_plain_fasta(&query_path, query)?;

        self.run_tool(
            &self.makeblastdb,
            "makeblastdb",
            vec![
                "-in".into(),
                reference_path.into_os_string(),
                "-dbtype".into(),
                "nucl".into(),
                "-out".into(),
                db_path.clone().into_os_string(),
            ],
            workdir,
        )?;

        let mut args: Vec<OsString> = vec![
            "-query".into(),
            query_path.into_os_string(),
            "-db".into(),
            db_path.into_os_string(),
        ];
        if self.uses_short_task() {
            args.push("-task".into());
            args.push("blastn-short".into());
        }
        args.extend([
            "-outfmt".into(),
            "6".into(),
            "-out".into(),
            output_path.clone().into_os_string(),
            "-num_threads".into(),
            self.options.threads.max(1).to_string().into(),
        ]);
        self.run_tool(&self.blastn, "blastn", args, workdir)?;

        if !output_path.exists() {
            return Err(DecomplexError::Aligner(format!(
                "blastn finished but wrote no output at {}",
                output_path.display()
            )));
        }

        let file = File::open(&output_path)?;
        parse_tabular(BufReader::new(file))
    }

    /// Run one tool to completion, killing it once the timeout passes
    fn run_tool(&self, program: &Path, tool: &str, args: Vec<OsString>, workdir: &Path) -> Result<()> {
        let log_path = workdir.join(format!("{}.log", tool));
        let log = File::create(&log_path)?;

        debug!("Running {} {:?}", program.display(), args);
        let mut child = Command::new(program)
            .args(&args)
            .current_dir(workdir)
            .stdout(Stdio::null())
            .stderr(Stdio::from(log))
            .spawn()
            .map_err(|e| DecomplexError::Aligner(format!("Failed to start {}: {}", tool, e)))?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Some(limit) = self.options.timeout {
                if started.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DecomplexError::AlignerTimeout {
                        tool: tool.to_string(),
                        seconds: limit.as_secs(),
                    });
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            let stderr = fs::read_to_string(&log_path).unwrap_or_default();
            return Err(DecomplexError::Aligner(format!(
                "{} failed with exit code {:?}: {}",
                tool,
                status.code(),
                stderr.trim()
            )));
        }

        debug!("{} finished in {:.1}s", tool, started.elapsed().as_secs_f64());
        Ok(())
    }
}

impl Aligner for BlastAligner {
    fn search(&mut self, query: &[Sequence], reference: &[Sequence]) -> Result<Vec<AlignmentHit>> {
        info!(
            "Running blastn: {} queries against {} references{}",
            query.len(),
            reference.len(),
            if self.uses_short_task() { " (blastn-short)" } else { "" }
        );

        let workdir = tempfile::Builder::new()
            .prefix("decomplex-blast-")
            .tempdir()?;

        match self.search_in(workdir.path(), query, reference) {
            Ok(hits) => {
                info!("blastn reported {} hits", hits.len());
                Ok(hits)
            }
            Err(e) => {
                if std::env::var_os(PRESERVE_ON_FAILURE_ENV).is_some() {
                    let kept = workdir.keep();
                    warn!("Aligner working directory preserved at {}", kept.display());
                }
                Err(e)
            }
        }
    }

    fn verify_installation(&self) -> Result<()> {
        let output = Command::new(&self.blastn)
            .arg("-version")
            .output()
            .map_err(|e| DecomplexError::Aligner(format!("Failed to run blastn: {}", e)))?;

        if !output.status.success() {
            return Err(DecomplexError::Aligner(
                "blastn -version exited with an error".to_string(),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        debug!("{}", version.lines().next().unwrap_or("blastn"));
        Ok(())
    }

    fn name(&self) -> &str {
        "blastn"
    }
}

fn locate_binary(name: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(DecomplexError::Aligner(format!(
            "{} not found at {}",
            name,
            path.display()
        ))),
        None => which::which(name).map_err(|_| {
            DecomplexError::Aligner(format!(
                "{} not found on PATH; install BLAST+ or set its path in the [aligner] config",
                name
            ))
        }),
    }
}

/// BLAST reports ids only, so headers carry nothing else
/// Id-only headers; records without residues are left out since
/// makeblastdb rejects them.
fn write_plain_fasta(path: &Path, sequences: &[Sequence]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for seq in sequences.iter().filter(|seq| !seq.is_empty()) {
        writeln!(writer, ">{}", seq.id)?;
        writer.write_all(&seq.sequence)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse `-outfmt 6` output. Any unreadable line fails the whole parse.
pub fn parse_tabular<R: BufRead>(reader: R) -> Result<Vec<AlignmentHit>> {
    let mut hits = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 8 {
            return Err(unreadable(index, &line));
        }

        let identity: f64 = parts[2].trim().parse().map_err(|_| unreadable(index, &line))?;
        let alignment_length: usize = parts[3].trim().parse().map_err(|_| unreadable(index, &line))?;
        let query_start: usize = parts[6].trim().parse().map_err(|_| unreadable(index, &line))?;
        let query_end: usize = parts[7].trim().parse().map_err(|_| unreadable(index, &line))?;

        hits.push(AlignmentHit {
            query_id: parts[0].trim_end().to_string(),
            subject_id: parts[1].trim_end().to_string(),
            identity,
            alignment_length,
            query_start,
            query_end,
        });
    }

    Ok(hits)
}

fn unreadable(index: usize, line: &str) -> DecomplexError {
    DecomplexError::Aligner(format!(
        "Unreadable blastn output at line {}: '{}'",
        index + 1,
        line
    ))
}
