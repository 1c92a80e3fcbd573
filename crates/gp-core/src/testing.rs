// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! A scripted repository state behind `MockGitBackend`.
//!
//! Read-only queries answer from the world; mutating calls (fetch, combine,
//! push, ref and config writes) are left unexpected so a test must opt in to
//! each one, and any call it did not expect fails the test.

use std::collections::{BTreeMap, BTreeSet};

use gp_repo::{MockGitBackend, ObjectId};

pub(crate) fn oid(c: char) -> ObjectId {
    ObjectId::parse(&c.to_string().repeat(40)).unwrap()
}

pub(crate) struct World {
    pub head: Option<String>,
    pub refs: BTreeMap<String, ObjectId>,
    pub remotes: Vec<String>,
    pub config: BTreeMap<String, String>,
    pub dirty: bool,
    ancestry: BTreeSet<(ObjectId, ObjectId)>,
}

impl World {
    /// On `feature` (tip `f`), one commit ahead of `master` = `origin/master` = `a`
    pub fn new() -> Self {
        let mut world = World {
            head: Some("refs/heads/feature".to_string()),
            refs: BTreeMap::new(),
            remotes: vec!["origin".to_string()],
            config: BTreeMap::new(),
            dirty: false,
            ancestry: BTreeSet::new(),
        };
        world.set_ref("refs/heads/master", oid('a'));
        world.set_ref("refs/remotes/origin/master", oid('a'));
        world.set_ref("refs/heads/feature", oid('f'));
        world.ancestry(oid('f'), oid('a'));
        world
    }

    pub fn local_only() -> Self {
        let mut world = Self::new();
        world.remotes.clear();
        world.refs.remove("refs/remotes/origin/master");
        world
    }

    pub fn set_ref(&mut self, name: &str, oid: ObjectId) -> &mut Self {
        self.refs.insert(name.to_string(), oid);
        self
    }

    /// Record that `target` is in the history of `tip`
    pub fn ancestry(&mut self, tip: ObjectId, target: ObjectId) -> &mut Self {
        self.ancestry.insert((tip, target));
        self
    }

    pub fn config(&mut self, key: &str, value: &str) -> &mut Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }

    pub fn into_mock(self) -> MockGitBackend {
        let World {
            head,
            refs,
            remotes,
            config,
            dirty,
            ancestry,
        } = self;
        let mut git = MockGitBackend::new();

        let lookup = refs.clone();
        git.expect_resolve_ref()
            .returning(move |name| Ok(lookup.get(name).cloned()));
        let lookup = refs.clone();
        git.expect_read_ref()
            .returning(move |name| Ok(lookup.get(name).cloned()));
        git.expect_head_ref().returning(move || Ok(head.clone()));
        let names: Vec<String> = refs
            .keys()
            .filter(|k| k.starts_with("refs/heads/") || k.starts_with("refs/remotes/"))
            .cloned()
            .collect();
        git.expect_list_branches().returning(move || Ok(names.clone()));
        git.expect_remote_names().returning(move || Ok(remotes.clone()));
        git.expect_has_uncommitted_changes().returning(move || Ok(dirty));
        git.expect_ancestry_contains()
            .returning(move |tip, target| Ok(tip == target || ancestry.contains(&(tip.clone(), target.clone()))));
        git.expect_config_get()
            .returning(move |key| Ok(config.get(key).cloned()));
        git
    }
}
