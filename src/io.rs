//! Text-file collaborators around the network.
//!
//! - examples: one example per line, integer features separated by commas and/or
//!   whitespace; every row is standardized on its own;
//! - labels: whitespace-separated integer class ids, one-hot encoded;
//! - predictions: one class id per line, in input order.
//!
//! Blank lines in example files are skipped. Malformed tokens and unreadable files are
//! reported as [`Error::Parse`] and [`Error::Io`], never as zero rows.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::{Error, Matrix, Result};

/// Subtract the mean and divide by the population standard deviation, in place.
///
/// A constant row has no spread and is mapped to zeros.
pub fn standardize(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std_dev = var.sqrt();

    if std_dev == 0.0 {
        values.fill(0.0);
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - mean) / std_dev;
    }
}

/// A `1 x num_classes` row with a `1` at `label`.
pub fn one_hot(label: usize, num_classes: usize) -> Result<Matrix> {
    if num_classes == 0 {
        return Err(Error::InvalidConfig("num_classes must be > 0".to_owned()));
    }
    if label >= num_classes {
        return Err(Error::InvalidData(format!(
            "label {label} out of range for {num_classes} classes"
        )));
    }
    let mut row = Matrix::zeros(1, num_classes);
    row[(0, label)] = 1.0;
    Ok(row)
}

/// Parse standardized example rows from `reader`. `path` is only used in errors.
pub fn parse_examples<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Matrix>> {
    let mut examples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;

        let mut values = Vec::new();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            values.push(parse_int(token, path, idx + 1)? as f64);
        }
        if values.is_empty() {
            continue;
        }

        standardize(&mut values);
        examples.push(Matrix::row(values));
    }
    Ok(examples)
}

/// Read and standardize the examples stored at `path`.
pub fn load_examples<P: AsRef<Path>>(path: P) -> Result<Vec<Matrix>> {
    let p = path.as_ref();
    let file = File::open(p).map_err(|source| io_error(p, source))?;
    parse_examples(BufReader::new(file), p)
}

/// Parse one-hot label rows from `reader`. `path` is only used in errors.
pub fn parse_labels<R: BufRead>(reader: R, path: &Path, num_classes: usize) -> Result<Vec<Matrix>> {
    let mut labels = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;
        for token in line.split_whitespace() {
            let id = parse_int(token, path, idx + 1)?;
            let id = usize::try_from(id).map_err(|_| {
                Error::InvalidData(format!(
                    "{}:{}: negative label {id}",
                    path.display(),
                    idx + 1
                ))
            })?;
            labels.push(one_hot(id, num_classes)?);
        }
    }
    Ok(labels)
}

/// Read the labels stored at `path`, one-hot encoded to `num_classes` columns.
pub fn load_labels<P: AsRef<Path>>(path: P, num_classes: usize) -> Result<Vec<Matrix>> {
    let p = path.as_ref();
    let file = File::open(p).map_err(|source| io_error(p, source))?;
    parse_labels(BufReader::new(file), p, num_classes)
}

/// Write one prediction per line.
pub fn write_predictions_to<W: Write>(mut writer: W, predictions: &[usize]) -> std::io::Result<()> {
    for p in predictions {
        writeln!(writer, "{p}")?;
    }
    writer.flush()
}

/// Write one prediction per line to the file at `path`, replacing it.
pub fn write_predictions<P: AsRef<Path>>(path: P, predictions: &[usize]) -> Result<()> {
    let p = path.as_ref();
    let file = File::create(p).map_err(|source| io_error(p, source))?;
    write_predictions_to(BufWriter::new(file), predictions).map_err(|source| io_error(p, source))
}

fn parse_int(token: &str, path: &Path, line: usize) -> Result<i64> {
    token.parse::<i64>().map_err(|_| Error::Parse {
        path: path.to_path_buf(),
        line,
        token: token.to_owned(),
    })
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}
