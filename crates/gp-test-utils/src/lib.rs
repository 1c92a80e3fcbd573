// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared test infrastructure for git-process.
//!
//! Integration tests run against real, throwaway repositories: a work tree
//! plus a bare `origin`, isolated from the developer's own git config. Every
//! git command a fixture runs is appended to a per-test transcript under
//! `target/test-logs/` so a failing test can be replayed by hand.

pub mod fixture;
pub mod transcript;

pub use fixture::{git_available, GitFixture};
pub use transcript::{unique_log_path, Transcript, TranscriptError};

/// Route `tracing` output through the test harness' captured stdout.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
