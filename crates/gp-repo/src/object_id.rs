// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt;
use std::str::FromStr;

use crate::error::{GitError, GitResult};

const ABBREV_LEN: usize = 7;

/// A full commit object id in lowercase hex (SHA-1 or SHA-256)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn parse(s: &str) -> GitResult<Self> {
        let s = s.trim();
        let valid_len = s.len() == 40 || s.len() == 64;
        if valid_len && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(GitError::InvalidObjectId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in user-facing messages
    pub fn abbrev(&self) -> &str {
        &self.0[..ABBREV_LEN]
    }
}

impl FromStr for ObjectId {
    type Err = GitError;

    fn from_str(s: &str) -> GitResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.abbrev())
    }
}
