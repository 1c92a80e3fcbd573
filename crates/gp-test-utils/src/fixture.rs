// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Throwaway repositories for integration tests

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

use crate::transcript::Transcript;

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// A work tree on `master` with one commit, optionally with a bare `origin`
/// that already has `master` pushed to it.
///
/// Helpers panic on git failures, pointing at the transcript file.
pub struct GitFixture {
    home: TempDir,
    origin: Option<TempDir>,
    work: TempDir,
    transcript: RefCell<Transcript>,
}

impl GitFixture {
    /// Work tree plus a bare `origin` remote
    pub fn new(test_name: &str) -> Self {
        let fixture = Self::new_local_only(test_name);
        let origin = TempDir::new().expect("create origin dir");
        fixture.git_in(origin.path(), &["init", "-q", "--bare", "-b", "master"]);
        let origin_path = origin.path().to_string_lossy().to_string();
        fixture.git(&["remote", "add", "origin", &origin_path]);
        fixture.git(&["push", "-q", "-u", "origin", "master"]);
        Self {
            origin: Some(origin),
            ..fixture
        }
    }

    /// Work tree with no remotes configured
    pub fn new_local_only(test_name: &str) -> Self {
        let transcript = Transcript::create(test_name).expect("create test transcript");
        let fixture = Self {
            home: TempDir::new().expect("create isolated HOME"),
            origin: None,
            work: TempDir::new().expect("create work tree dir"),
            transcript: RefCell::new(transcript),
        };
        fixture.git(&["init", "-q", "-b", "master"]);
        fixture.configure_identity(fixture.work.path());
        fixture.commit_file("README.md", "Initial content\n", "Initial commit");
        fixture
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    pub fn home_dir(&self) -> &Path {
        self.home.path()
    }

    pub fn origin_dir(&self) -> Option<&Path> {
        self.origin.as_ref().map(TempDir::path)
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.transcript.borrow().path().to_path_buf()
    }

    /// Run git in the work tree and return trimmed stdout
    pub fn git(&self, args: &[&str]) -> String {
        self.git_in(self.work.path(), args)
    }

    pub fn git_in(&self, dir: &Path, args: &[&str]) -> String {
        let output = self
            .command_in(dir, args)
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn git {args:?}: {e}"));
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let mut transcript = self.transcript.borrow_mut();
        let _ = transcript.record(&format!("$ git {} (in {})", args.join(" "), dir.display()));
        if !stdout.is_empty() {
            let _ = transcript.record(&stdout);
        }
        if !stderr.is_empty() {
            let _ = transcript.record(&stderr);
        }
        if !output.status.success() {
            panic!(
                "git {args:?} failed with {:?}: {stderr}\ntranscript: {}",
                output.status.code(),
                transcript.path().display()
            );
        }
        stdout
    }

    /// A `git` command with the fixture's isolated environment
    pub fn command_in(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(dir)
            .env("HOME", self.home.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C");
        cmd
    }

    /// Write `name`, commit it, and return the new HEAD id
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        self.commit_file_in(self.work.path(), name, content, message)
    }

    pub fn commit_file_in(&self, dir: &Path, name: &str, content: &str, message: &str) -> String {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write file");
        self.git_in(dir, &["add", name]);
        self.git_in(dir, &["commit", "-q", "-m", message]);
        self.git_in(dir, &["rev-parse", "HEAD"])
    }

    pub fn rev(&self, name: &str) -> String {
        self.git(&["rev-parse", name])
    }

    /// Id of `name` in the bare origin
    pub fn origin_rev(&self, name: &str) -> String {
        let origin = self.origin_dir().expect("fixture has no origin");
        self.git_in(origin, &["rev-parse", name])
    }

    /// A second clone of `origin`, standing in for another developer
    pub fn clone_origin(&self) -> TempDir {
        let origin = self.origin_dir().expect("fixture has no origin");
        let peer = TempDir::new().expect("create peer clone dir");
        let origin_path = origin.to_string_lossy().to_string();
        let peer_path = peer.path().to_string_lossy().to_string();
        self.git_in(self.home.path(), &["clone", "-q", &origin_path, &peer_path]);
        self.configure_identity(peer.path());
        peer
    }

    fn configure_identity(&self, dir: &Path) {
        self.git_in(dir, &["config", "user.email", "test@example.com"]);
        self.git_in(dir, &["config", "user.name", "Test User"]);
        self.git_in(dir, &["config", "commit.gpgsign", "false"]);
    }
}
