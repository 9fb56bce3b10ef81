use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

/// Opens a log file as a lazy stream of decoded lines, transparently
/// decompressing when the filename ends in `.gz`. The file handle closes when
/// the returned iterator is dropped. Invalid UTF-8 surfaces as an `io::Error`
/// item and is fatal for the consumer.
pub fn open_log_lines(path: &Path) -> Result<Lines<Box<dyn BufRead>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader.lines())
}
