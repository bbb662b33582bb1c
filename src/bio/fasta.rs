use crate::bio::sequence::Sequence;
use crate::{DecomplexError, Result};
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use memmap2::Mmap;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::line_ending,
    combinator::{map, opt},
    IResult,
};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::warn;

/// Parse a FASTA header line, returning the text after '>' untouched
fn parse_header(input: &[u8]) -> IResult<&[u8], &str> {
    let (input, _) = tag(b">")(input)?;
    let (input, line) = map(take_till(|c: u8| c == b'\n' || c == b'\r'), |s| {
        std::str::from_utf8(s).unwrap_or("")
    })(input)?;
    let (input, _) = opt(line_ending)(input)?;
    let input = input.strip_prefix(b"\r").unwrap_or(input);
    Ok((input, line))
}

/// Split header text into the id and the description after it
fn split_header(header: &str) -> (&str, Option<&str>) {
    match header.split_once(|c: char| c == ' ' || c == '\t') {
        Some((id, rest)) => {
            let description = rest.trim_matches(|c: char| c == ' ' || c == '\t');
            (id, (!description.is_empty()).then_some(description))
        }
        None => (header, None),
    }
}

/// Parse sequence lines until next header or EOF
///
/// Residues are kept as written (no case folding) so the filtered output
/// reproduces the input records.
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;
        // Lone '\r' line endings
        let rest = rest.strip_prefix(b"\r").unwrap_or(rest);

        sequence.extend(line.iter().copied().filter(|c| !c.is_ascii_whitespace()));
        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], Sequence> {
    let (input, header) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let (id, description) = split_header(header);
    let mut seq = Sequence::new(id.to_string(), sequence).with_raw_header(header.to_string());
    if let Some(desc) = description {
        seq = seq.with_description(desc.to_string());
    }

    Ok((input, seq))
}

/// Parse FASTA from a byte buffer
///
/// Records without residues are kept, with a warning.
pub fn parse_fasta_from_bytes(buffer: &[u8]) -> Result<Vec<Sequence>> {
    let mut input = buffer;
    let mut sequences = Vec::new();

    while !input.is_empty() {
        // Skip empty lines and whitespace
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        if input[0] != b'>' {
            return Err(DecomplexError::Parse(
                "FASTA record does not start with '>'".to_string(),
            ));
        }

        match parse_record(input) {
            Ok((remaining, seq)) => {
                if seq.is_empty() {
                    warn!("FASTA record {} has no residues", seq.id);
                }
                sequences.push(seq);
                input = remaining;
            }
            Err(e) => {
                return Err(DecomplexError::Parse(format!("Failed to parse FASTA: {:?}", e)));
            }
        }
    }

    Ok(sequences)
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
    let path = path.as_ref();
    crate::require_input(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)
    } else {
        parse_fasta_uncompressed(path)
    }
}

/// Parse an uncompressed FASTA file
fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<Sequence>> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_from_bytes(&mmap[..])
}

/// Parse a gzipped FASTA file
fn parse_fasta_gzip(path: &Path) -> Result<Vec<Sequence>> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;

    parse_fasta_from_bytes(&buffer)
}

/// Index sequences by identifier, preserving file order.
pub fn index_by_id(sequences: &[Sequence]) -> Result<IndexMap<&str, &Sequence>> {
    let mut index = IndexMap::with_capacity(sequences.len());
    for seq in sequences {
        if index.insert(seq.id.as_str(), seq).is_some() {
            return Err(DecomplexError::Parse(format!(
                "Duplicate sequence identifier '{}'",
                seq.id
            )));
        }
    }
    Ok(index)
}

/// Write sequences to any writer, one residue line per record
pub fn write_fasta_to_writer<'a, W, I>(writer: &mut W, sequences: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Sequence>,
{
    for seq in sequences {
        writeln!(writer, "{}", seq.header())?;
        writer.write_all(&seq.sequence)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
