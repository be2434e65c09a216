// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// The execution environment a [`crate::entities::Pipeline`] runs under.
///
/// A sealed tagged union per the design notes on `Agent`/`PipelineEvent`:
/// every call site matches all three variants exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agent {
    /// No particular agent requirement; runs wherever the engine is hosted.
    Any,
    /// A Docker container agent.
    Docker {
        image: String,
        tag: String,
        host: Option<String>,
    },
    /// A Kubernetes pod agent, described by an inline pod-spec YAML document.
    Kubernetes { yaml: String },
}

impl Default for Agent {
    fn default() -> Self {
        Agent::Any
    }
}

impl Agent {
    /// Labels derived from the agent tag, used for scheduling hints and log
    /// fields. `Any` carries no labels.
    pub fn labels(&self) -> Vec<(String, String)> {
        match self {
            Agent::Any => Vec::new(),
            Agent::Docker { image, tag, host } => {
                let mut labels = vec![
                    ("agent.kind".to_string(), "docker".to_string()),
                    ("agent.image".to_string(), image.clone()),
                    ("agent.tag".to_string(), tag.clone()),
                ];
                if let Some(host) = host {
                    labels.push(("agent.host".to_string(), host.clone()));
                }
                labels
            }
            Agent::Kubernetes { .. } => vec![("agent.kind".to_string(), "kubernetes".to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_has_no_labels() {
        assert!(Agent::Any.labels().is_empty());
    }

    #[test]
    fn docker_labels_include_image_and_tag() {
        let agent = Agent::Docker {
            image: "rust".into(),
            tag: "1.80".into(),
            host: None,
        };
        let labels = agent.labels();
        assert!(labels.contains(&("agent.image".to_string(), "rust".to_string())));
        assert!(labels.contains(&("agent.tag".to_string(), "1.80".to_string())));
        assert_eq!(labels.len(), 3);
    }
}
