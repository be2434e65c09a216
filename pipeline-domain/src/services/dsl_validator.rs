// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Six-layer script validation. Dangerous-pattern detection here is
//! string-based and best-effort; the sandbox (infrastructure) is the
//! authoritative enforcement boundary, not this validator.

use std::collections::HashSet;

use crate::value_objects::{DslCompilationContext, DslExecutionContext, IssueSeverity, ValidationIssue, ValidationReport};

const MAX_SCRIPT_CHARS: usize = 50_000;

pub struct DslValidator;

impl DslValidator {
    /// Runs all six layers against `script` and returns the accumulated
    /// report. `script_name` is carried through for diagnostics only.
    pub fn validate(script_name: &str, script: &str, compilation_ctx: &DslCompilationContext, execution_ctx: &DslExecutionContext) -> ValidationReport {
        let mut report = ValidationReport::new(script_name);

        Self::check_syntax(script, &mut report);
        Self::check_sandbox_policy(compilation_ctx, execution_ctx, &mut report);
        Self::check_resource_limits(execution_ctx, &mut report);
        Self::check_dependency_policy(compilation_ctx, &mut report);
        Self::check_dsl_rules(script, &mut report);
        Self::check_performance_hints(script, &mut report);

        report.recommendations = Self::derive_recommendations(&report);
        report
    }

    /// Layer 1: empty scripts, unbalanced braces/parens. Encoding is
    /// guaranteed valid UTF-8 by `&str`'s invariant, so there is nothing
    /// further to check there in this implementation.
    fn check_syntax(script: &str, report: &mut ValidationReport) {
        if script.trim().is_empty() {
            report.issues.push(ValidationIssue::new("SYN001", "script is empty", IssueSeverity::Error));
            return;
        }
        if let Some(unbalanced) = Self::find_unbalanced_delimiter(script) {
            report.issues.push(
                ValidationIssue::new("SYN002", format!("unbalanced delimiter '{unbalanced}'"), IssueSeverity::Error)
                    .with_suggestion("check matching braces and parentheses"),
            );
        }
    }

    fn find_unbalanced_delimiter(script: &str) -> Option<char> {
        let mut braces = 0i64;
        let mut parens = 0i64;
        for ch in script.chars() {
            match ch {
                '{' => braces += 1,
                '}' => braces -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
            if braces < 0 {
                return Some('}');
            }
            if parens < 0 {
                return Some(')');
            }
        }
        if braces != 0 {
            return Some('{');
        }
        if parens != 0 {
            return Some('(');
        }
        None
    }

    /// Layer 2: sandbox-policy compliance. Flags configurations that are
    /// internally inconsistent (e.g. an execution policy demanding
    /// class-loader isolation while the compilation context disables the
    /// sandbox outright).
    fn check_sandbox_policy(compilation_ctx: &DslCompilationContext, execution_ctx: &DslExecutionContext, report: &mut ValidationReport) {
        if !compilation_ctx.security_policy.sandbox_enabled {
            report.issues.push(ValidationIssue::new(
                "SEC001",
                "sandbox is disabled for this compilation context",
                IssueSeverity::Warning,
            ));
        }
        if compilation_ctx.security_policy.allow_native_code {
            report.issues.push(ValidationIssue::new("SEC002", "native code execution is permitted", IssueSeverity::Warning));
        }
        if execution_ctx.execution_policy.isolation_level == crate::value_objects::IsolationLevel::None && compilation_ctx.security_policy.sandbox_enabled {
            report.issues.push(ValidationIssue::new(
                "SEC003",
                "isolation level 'None' makes the enabled sandbox policy advisory only",
                IssueSeverity::Info,
            ));
        }
    }

    /// Layer 3: resource-limit sanity (memory > 64 MB, CPU time ≤ 5 min,
    /// threads ≥ 1).
    fn check_resource_limits(execution_ctx: &DslExecutionContext, report: &mut ValidationReport) {
        if let Some(limits) = execution_ctx.resource_limits {
            if !limits.is_sane() {
                report.issues.push(
                    ValidationIssue::new("RES001", "resource limits fall outside the sane range", IssueSeverity::Error)
                        .with_suggestion("memory > 64MB, CPU time <= 5 minutes, threads >= 1"),
                );
            }
        }
    }

    /// Layer 4: blocked-package prefix match, duplicate imports.
    fn check_dependency_policy(compilation_ctx: &DslCompilationContext, report: &mut ValidationReport) {
        let mut seen = HashSet::new();
        for import in &compilation_ctx.imports {
            if !compilation_ctx.permits_package(import) {
                report
                    .issues
                    .push(ValidationIssue::new("DEP001", format!("import '{import}' is blocked by policy"), IssueSeverity::Error));
            }
            if !seen.insert(import.as_str()) {
                report
                    .issues
                    .push(ValidationIssue::new("DEP002", format!("duplicate import '{import}'"), IssueSeverity::Warning));
            }
        }
    }

    /// Layer 5: DSL-specific rules — required blocks, anti-patterns such as
    /// blocking sleeps in a cooperative-concurrency runtime.
    fn check_dsl_rules(script: &str, report: &mut ValidationReport) {
        if !script.contains("stages") && !script.contains("[[stage]]") {
            report.issues.push(ValidationIssue::new(
                "DSL001",
                "script defines no recognizable stage block",
                IssueSeverity::Warning,
            ));
        }
        if script.contains("Thread.sleep") || script.contains("std::thread::sleep") {
            report.issues.push(
                ValidationIssue::new("DSL002", "blocking sleep call detected", IssueSeverity::Warning)
                    .with_suggestion("use the cooperative delay primitive instead of a blocking sleep"),
            );
        }
    }

    /// Layer 6: performance hints — oversized scripts, suspected infinite
    /// loops. Best-effort, string-based.
    fn check_performance_hints(script: &str, report: &mut ValidationReport) {
        if script.len() > MAX_SCRIPT_CHARS {
            report.issues.push(ValidationIssue::new(
                "PERF001",
                format!("script exceeds {MAX_SCRIPT_CHARS} characters"),
                IssueSeverity::Info,
            ));
        }
        if script.contains("while (true)") || script.contains("while(true)") || script.contains("loop {") {
            report.issues.push(ValidationIssue::new(
                "PERF002",
                "possible unbounded loop detected",
                IssueSeverity::Info,
            ));
        }
    }

    fn derive_recommendations(report: &ValidationReport) -> Vec<String> {
        report
            .issues
            .iter()
            .map(|issue| match issue.code.as_str() {
                "SYN001" => "add at least one stage to the script".to_string(),
                "SYN002" => "balance every opening delimiter with a matching close".to_string(),
                "RES001" => "raise memory/lower CPU-time limits into the sane range".to_string(),
                "DEP001" => format!("remove or replace the blocked import ({})", issue.message),
                "DSL002" => "replace blocking sleep with the pipeline's delay step".to_string(),
                "PERF002" => "bound the loop with an explicit exit condition".to_string(),
                _ => format!("review issue {}", issue.code),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_is_invalid() {
        let report = DslValidator::validate("x.pipeline.toml", "", &DslCompilationContext::default(), &DslExecutionContext::default());
        assert!(!report.is_valid());
        assert!(report.issues.iter().any(|i| i.code == "SYN001"));
    }

    #[test]
    fn unbalanced_braces_flagged_as_error() {
        let report = DslValidator::validate(
            "x.pipeline.toml",
            "stages { stage build { }",
            &DslCompilationContext::default(),
            &DslExecutionContext::default(),
        );
        assert!(!report.is_valid());
        assert!(report.issues.iter().any(|i| i.code == "SYN002"));
    }

    #[test]
    fn well_formed_script_is_valid() {
        let report = DslValidator::validate(
            "x.pipeline.toml",
            "stages { stage build { step echo } }",
            &DslCompilationContext::default(),
            &DslExecutionContext::default(),
        );
        assert!(report.is_valid());
    }

    #[test]
    fn blocked_import_is_an_error() {
        let ctx = DslCompilationContext {
            blocked_packages: vec!["java.lang.reflect".into()],
            imports: vec!["java.lang.reflect.Method".into()],
            ..Default::default()
        };
        let report = DslValidator::validate("x.pipeline.toml", "stages { }", &ctx, &DslExecutionContext::default());
        assert!(!report.is_valid());
        assert!(report.issues.iter().any(|i| i.code == "DEP001"));
    }

    #[test]
    fn oversized_script_gets_a_performance_hint() {
        let big_script = format!("stages {{ {} }}", "a".repeat(60_000));
        let report = DslValidator::validate("x.pipeline.toml", &big_script, &DslCompilationContext::default(), &DslExecutionContext::default());
        assert!(report.issues.iter().any(|i| i.code == "PERF001"));
        assert!(report.is_valid());
    }
}
