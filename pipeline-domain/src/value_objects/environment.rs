// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A read-only mapping from name to string value, visible to steps at
/// execution time. Insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a new `Environment` with `other` merged in, `other` winning on
    /// key collision. Used to layer step-scoped overrides over the pipeline
    /// environment without mutating either.
    pub fn layered_with(&self, other: &Environment) -> Environment {
        let mut vars = self.vars.clone();
        vars.extend(other.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        Environment { vars }
    }
}

impl From<HashMap<String, String>> for Environment {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_with_prefers_override() {
        let base = Environment::new(HashMap::from([("A".into(), "1".into()), ("B".into(), "2".into())]));
        let over = Environment::new(HashMap::from([("B".into(), "override".into())]));
        let merged = base.layered_with(&over);
        assert_eq!(merged.get("A"), Some("1"));
        assert_eq!(merged.get("B"), Some("override"));
    }

    #[test]
    fn empty_has_no_entries() {
        let env = Environment::empty();
        assert!(env.is_empty());
        assert_eq!(env.get("anything"), None);
    }
}
