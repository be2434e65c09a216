// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub severity: IssueSeverity,
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>, severity: IssueSeverity) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            location: None,
            suggestion: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// The result of running a script through [`crate::services::DslValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub script_name: String,
    pub issues: Vec<ValidationIssue>,
    pub validation_time_ms: u64,
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    pub fn new(script_name: impl Into<String>) -> Self {
        Self {
            script_name: script_name.into(),
            issues: Vec::new(),
            validation_time_ms: 0,
            recommendations: Vec::new(),
        }
    }

    /// `isValid ≡ ∀ issue. issue.severity ≠ Error`.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|issue| issue.severity == IssueSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == IssueSeverity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity == IssueSeverity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_when_no_error_severity_issues() {
        let mut report = ValidationReport::new("build.pipeline.toml");
        report.issues.push(ValidationIssue::new("W001", "unused import", IssueSeverity::Warning));
        assert!(report.is_valid());
    }

    #[test]
    fn invalid_when_any_error_issue_present() {
        let mut report = ValidationReport::new("build.pipeline.toml");
        report.issues.push(ValidationIssue::new("E001", "unbalanced braces", IssueSeverity::Error));
        assert!(!report.is_valid());
        assert_eq!(report.errors().count(), 1);
    }
}
