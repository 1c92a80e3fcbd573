// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-test transcript files

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to write test transcript: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid test name: {name:?}")]
    InvalidTestName { name: String },
}

/// Append-only record of what a fixture did, one file per test
pub struct Transcript {
    path: PathBuf,
    writer: BufWriter<File>,
    started: DateTime<Utc>,
}

impl Transcript {
    pub fn create(test_name: &str) -> Result<Self, TranscriptError> {
        if test_name.is_empty() || test_name.len() > 200 {
            return Err(TranscriptError::InvalidTestName {
                name: test_name.to_string(),
            });
        }
        let path = unique_log_path(test_name)?;
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
        let started = Utc::now();
        let mut transcript = Self {
            path,
            writer: BufWriter::new(file),
            started,
        };
        writeln!(transcript.writer, "=== git-process test transcript ===")?;
        writeln!(transcript.writer, "Test: {test_name}")?;
        writeln!(transcript.writer, "Started: {}", started.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(transcript.writer)?;
        transcript.writer.flush()?;
        Ok(transcript)
    }

    pub fn record(&mut self, line: &str) -> Result<(), TranscriptError> {
        let elapsed = Utc::now().signed_duration_since(self.started);
        writeln!(self.writer, "[+{:>6}ms] {}", elapsed.num_milliseconds(), line)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `target/test-logs/<date>/<test>-<time>-<uuid>.log`, with the directory created
pub fn unique_log_path(test_name: &str) -> Result<PathBuf, TranscriptError> {
    let now = Utc::now();
    let dir = find_workspace_root()
        .join("target")
        .join("test-logs")
        .join(now.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&dir)?;

    let filename = format!(
        "{}-{}-{}.log",
        sanitize_filename(test_name),
        now.format("%H-%M-%S"),
        Uuid::new_v4()
    );
    Ok(dir.join(filename))
}

fn find_workspace_root() -> PathBuf {
    let start = env::current_dir().unwrap_or_else(|_| env::temp_dir());
    let mut dir = start.as_path();
    loop {
        let manifest = dir.join("Cargo.toml");
        if fs::read_to_string(&manifest).is_ok_and(|content| content.contains("[workspace]")) {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return start,
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_filename("sync::rebase/one two"), "sync__rebase_one_two");
    }

    #[test]
    fn transcripts_get_distinct_files() {
        let mut a = Transcript::create("transcript_a").unwrap();
        let b = Transcript::create("transcript_a").unwrap();
        assert_ne!(a.path(), b.path());

        a.record("git status").unwrap();
        let content = fs::read_to_string(a.path()).unwrap();
        assert!(content.contains("Test: transcript_a"));
        assert!(content.contains("git status"));
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(matches!(
            Transcript::create(""),
            Err(TranscriptError::InvalidTestName { .. })
        ));
    }
}
