// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use serde_json::Value as J;

/// Overlay `layer` onto `base`.
///
/// Objects merge key by key; scalars and arrays from `layer` replace what is
/// in `base`. A `null` in `layer` leaves `base` untouched.
pub fn merge_two_json(base: &mut J, layer: J) {
    match (base, layer) {
        (J::Object(a), J::Object(b)) => {
            for (k, v) in b.into_iter().filter(|(_, v)| !v.is_null()) {
                merge_two_json(a.entry(k).or_insert(J::Null), v);
            }
        }
        (_, J::Null) => {}
        (a, b) => *a = b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_layers_replace_scalars_and_keep_the_rest() {
        let mut base = json!({"log-level": "warn", "remote-name": "origin"});
        merge_two_json(&mut base, json!({"log-level": "debug", "integration-branch": null}));
        assert_eq!(base, json!({"log-level": "debug", "remote-name": "origin"}));
    }
}
