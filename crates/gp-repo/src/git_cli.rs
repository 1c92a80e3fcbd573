// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! [`GitBackend`] implemented by running the `git` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, trace};

use crate::backend::{
    FetchSummary, GitBackend, MergeOutcome, PushReport, RebaseOutcome, RefSpec, RefUpdate,
    RefUpdateStatus,
};
use crate::error::{GitError, GitResult};
use crate::object_id::ObjectId;
use crate::refs;

/// A work tree driven through the `git` command line
#[derive(Clone, Debug)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Open the work tree containing `path`
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()?;
        if !output.status.success() {
            return Err(GitError::NotARepository(path.to_path_buf()));
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(root = %root, "Opened git work tree");
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.root)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_EDITOR", ":");
        cmd
    }

    /// Run git and hand back the raw output, whatever the exit status
    fn output(&self, args: &[&str]) -> GitResult<Output> {
        debug!(args = ?args, "Running git");
        let output = self.command(args).output()?;
        trace!(
            status = ?output.status.code(),
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "git finished"
        );
        Ok(output)
    }

    /// Run git, requiring success, and return trimmed stdout
    fn run(&self, args: &[&str]) -> GitResult<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(failure(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a git query whose exit status 1 means "no"/"not found"
    fn probe(&self, args: &[&str]) -> GitResult<Option<String>> {
        let output = self.output(args)?;
        match output.status.code() {
            Some(0) => Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string())),
            Some(1) => Ok(None),
            _ => Err(failure(args, &output)),
        }
    }

    fn rev_parse(&self, spec: &str) -> GitResult<Option<ObjectId>> {
        self.probe(&["rev-parse", "-q", "--verify", spec])?
            .map(|s| ObjectId::parse(&s))
            .transpose()
    }

    fn head_oid(&self) -> GitResult<Option<ObjectId>> {
        self.rev_parse("HEAD^{commit}")
    }

    fn git_path_exists(&self, name: &str) -> GitResult<bool> {
        let path = self.run(&["rev-parse", "--git-path", name])?;
        Ok(self.root.join(path).exists())
    }
}

fn failure(args: &[&str], output: &Output) -> GitError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    GitError::CommandFailed {
        command: args.join(" "),
        stderr: if stderr.is_empty() { stdout } else { stderr },
    }
}

/// Parse `git push --porcelain` output into per-reference statuses.
///
/// Each ref line is `<flag>\t<from>:<to>\t<summary>`; other lines
/// (`To <url>`, `Done`) are skipped.
fn parse_push_porcelain(remote: &str, stdout: &str) -> Vec<RefUpdate> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, '\t');
            let flag = fields.next()?;
            let refs = fields.next()?;
            let summary = fields.next().unwrap_or("").trim();
            if flag.chars().count() != 1 {
                return None;
            }
            let (source, destination) = refs.split_once(':')?;
            let status = match flag {
                "=" => RefUpdateStatus::UpToDate,
                " " | "+" | "-" | "*" => RefUpdateStatus::Ok,
                _ => RefUpdateStatus::Rejected(rejection_reason(summary)),
            };
            trace!(remote, source, destination, ?status, "Push ref status");
            Some(RefUpdate {
                source: source.to_string(),
                destination: destination.to_string(),
                status,
            })
        })
        .collect()
}

/// `[rejected] (non-fast-forward)` yields `non-fast-forward`
fn rejection_reason(summary: &str) -> String {
    match (summary.find('('), summary.rfind(')')) {
        (Some(open), Some(close)) if open < close => summary[open + 1..close].to_string(),
        _ => summary.trim_matches(|c| c == '[' || c == ']').to_string(),
    }
}

impl GitBackend for GitCli {
    fn resolve_ref(&self, name: &str) -> GitResult<Option<ObjectId>> {
        self.rev_parse(&format!("{name}^{{commit}}"))
    }

    fn read_ref(&self, name: &str) -> GitResult<Option<ObjectId>> {
        refs::validate(name)?;
        self.rev_parse(name)
    }

    fn update_ref(&self, name: &str, new_oid: &ObjectId, force: bool) -> GitResult<()> {
        refs::validate(name)?;
        let message = "git-process: update";
        if force {
            self.run(&["update-ref", "-m", message, name, new_oid.as_str()])?;
            return Ok(());
        }

        match self.read_ref(name)? {
            Some(old) if &old == new_oid => Ok(()),
            Some(old) => {
                if !self.ancestry_contains(new_oid, &old)? {
                    return Err(GitError::RefUpdateRejected {
                        name: name.to_string(),
                        reason: format!("{} is not a descendant of {}", new_oid.abbrev(), old.abbrev()),
                    });
                }
                self.run(&["update-ref", "-m", message, name, new_oid.as_str(), old.as_str()])
                    .map_err(|e| GitError::RefUpdateRejected {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(())
            }
            None => {
                self.run(&["update-ref", "-m", message, name, new_oid.as_str()])?;
                Ok(())
            }
        }
    }

    fn head_ref(&self) -> GitResult<Option<String>> {
        self.probe(&["symbolic-ref", "-q", "HEAD"])
    }

    fn list_branches(&self) -> GitResult<Vec<String>> {
        let out = self.run(&["for-each-ref", "--format=%(refname)", "refs/heads", "refs/remotes"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.ends_with("/HEAD"))
            .map(str::to_string)
            .collect())
    }

    fn remote_names(&self) -> GitResult<Vec<String>> {
        let out = self.run(&["remote"])?;
        Ok(out.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
    }

    fn fetch(&self, remote: &str) -> GitResult<FetchSummary> {
        let args = ["fetch", "--prune", remote];
        let output = self.output(&args)?;
        if !output.status.success() {
            return Err(failure(&args, &output));
        }
        // git reports fetch progress on stderr
        Ok(FetchSummary {
            remote: remote.to_string(),
            output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn merge(&self, base: &ObjectId, message: &str) -> GitResult<MergeOutcome> {
        let head = self.head_oid()?.ok_or_else(|| GitError::UnexpectedOutput {
            command: "rev-parse HEAD".into(),
            output: "HEAD does not point at a commit".into(),
        })?;
        if self.ancestry_contains(&head, base)? {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }
        let fast_forward = self.ancestry_contains(base, &head)?;

        let args = ["merge", "--no-edit", "-m", message, base.as_str()];
        let output = self.output(&args)?;
        if output.status.success() {
            return Ok(if fast_forward {
                MergeOutcome::FastForward
            } else {
                MergeOutcome::Merged
            });
        }
        if self.rev_parse("MERGE_HEAD")?.is_some() {
            return Ok(MergeOutcome::Conflicting);
        }
        Err(failure(&args, &output))
    }

    fn rebase(&self, onto: &ObjectId) -> GitResult<RebaseOutcome> {
        let head = self.head_oid()?.ok_or_else(|| GitError::UnexpectedOutput {
            command: "rev-parse HEAD".into(),
            output: "HEAD does not point at a commit".into(),
        })?;
        if self.ancestry_contains(&head, onto)? {
            return Ok(RebaseOutcome::UpToDate);
        }
        let fast_forward = self.ancestry_contains(onto, &head)?;

        let args = ["rebase", onto.as_str()];
        let output = self.output(&args)?;
        if output.status.success() {
            return Ok(if fast_forward {
                RebaseOutcome::FastForward
            } else {
                RebaseOutcome::Ok
            });
        }
        if self.git_path_exists("rebase-merge")? || self.git_path_exists("rebase-apply")? {
            return Ok(RebaseOutcome::Stopped);
        }
        Err(failure(&args, &output))
    }

    fn push(&self, remote: &str, refspec: &RefSpec, force: bool) -> GitResult<PushReport> {
        let spec = refspec.to_string();
        let mut args = vec!["push", "--porcelain"];
        if force {
            args.push("--force");
        }
        args.push(remote);
        args.push(&spec);

        let output = self.output(&args)?;
        let updates = parse_push_porcelain(remote, &String::from_utf8_lossy(&output.stdout));
        if updates.is_empty() && !output.status.success() {
            return Err(failure(&args, &output));
        }
        Ok(PushReport {
            remote: remote.to_string(),
            updates,
        })
    }

    fn has_uncommitted_changes(&self) -> GitResult<bool> {
        let out = self.run(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!out.is_empty())
    }

    fn ancestry_contains(&self, tip: &ObjectId, target: &ObjectId) -> GitResult<bool> {
        let args = ["merge-base", "--is-ancestor", target.as_str(), tip.as_str()];
        Ok(self.probe(&args)?.is_some())
    }

    fn create_branch(&self, name: &str, start_point: &ObjectId) -> GitResult<()> {
        refs::validate(name)?;
        self.run(&["branch", name, start_point.as_str()])?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> GitResult<()> {
        self.run(&["branch", "-D", name])?;
        Ok(())
    }

    fn checkout(&self, name: &str) -> GitResult<()> {
        self.run(&["checkout", "-q", name])?;
        Ok(())
    }

    fn reset_hard(&self, target: &ObjectId) -> GitResult<()> {
        self.run(&["reset", "-q", "--hard", target.as_str()])?;
        Ok(())
    }

    fn config_get(&self, key: &str) -> GitResult<Option<String>> {
        self.probe(&["config", "--get", key])
    }

    fn config_set(&self, key: &str, value: &str) -> GitResult<()> {
        self.run(&["config", key, value])?;
        Ok(())
    }
}
