// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A minimal `key=value` parser for `plugin.properties`, matching the
//! archive layout in the spec's external-interfaces section. This is
//! deliberately not a full Java-properties implementation: no multi-line
//! continuations, no unicode escapes, just `key=value` pairs, one per line,
//! `#`-prefixed comments and blank lines skipped.

use std::collections::HashMap;

pub fn parse(contents: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    entries
}

/// Splits a comma-separated properties value into trimmed, non-empty parts.
pub fn split_list(value: Option<&String>) -> Vec<String> {
    value
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs_skipping_comments_and_blanks() {
        let contents = "\
# a plugin manifest
plugin.id = acme.build-cache

plugin.version=1.2.3
plugin.main-class =acme.build_cache.Plugin
";
        let parsed = parse(contents);
        assert_eq!(parsed.get("plugin.id").map(String::as_str), Some("acme.build-cache"));
        assert_eq!(parsed.get("plugin.version").map(String::as_str), Some("1.2.3"));
        assert_eq!(parsed.get("plugin.main-class").map(String::as_str), Some("acme.build_cache.Plugin"));
    }

    #[test]
    fn split_list_trims_and_drops_empties() {
        let value = "com.acme, , com.acme.ext".to_string();
        assert_eq!(split_list(Some(&value)), vec!["com.acme".to_string(), "com.acme.ext".to_string()]);
        assert!(split_list(None).is_empty());
    }
}
