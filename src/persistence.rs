//! Flat-file persistence for Gram matrices and solver solutions
//!
//! Both formats are plain text without a header: values are space separated,
//! a matrix is written one row per line, a vector on a single line. Values use
//! the shortest representation that parses back to the same `f64`, so a
//! reload is bit-identical to what was written.
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! concurrent reader sees either no file or a complete one.

use crate::core::{Result, SVMError};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write a row-major matrix with `n_cols` columns
pub fn write_matrix<P: AsRef<Path>>(path: P, data: &[f64], n_cols: usize) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        if n_cols == 0 {
            return Ok(());
        }
        for row in data.chunks(n_cols) {
            writeln!(writer, "{}", format_row(row))?;
        }
        Ok(())
    })
}

/// Read a matrix written by [`write_matrix`]; rows are returned as read
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(&line).map_err(|e| {
            SVMError::ParseError(format!("{}:{}: {}", path.display(), line_num + 1, e))
        })?);
    }

    Ok(rows)
}

/// Write a vector on a single line
pub fn write_vector<P: AsRef<Path>>(path: P, values: &[f64]) -> Result<()> {
    write_atomically(path.as_ref(), |writer| {
        writeln!(writer, "{}", format_row(values))?;
        Ok(())
    })
}

/// Read a vector written by [`write_vector`]
pub fn read_vector<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    parse_row(&line)
        .map_err(|e| SVMError::ParseError(format!("{}:1: {}", path.display(), e)))
}

fn format_row(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_row(line: &str) -> std::result::Result<Vec<f64>, String> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| format!("Invalid value: {token}"))
        })
        .collect()
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temporary_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write(&mut writer)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
