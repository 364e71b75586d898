// config.rs — Typed workflow configuration.
//
// `WorkflowConfig` is the serde shape of `.goalflow/workflow.toml`;
// `WorkflowContext` is the validated, read-only form the engine consumes
// (goal-id regex compiled once, default status parsed). Constructed once
// per invocation, never mutated.

use std::path::Path;
use std::str::FromStr;

use gf_goal::{GoalStatus, DEFAULT_ID_PATTERN};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// GitHub repository coordinates (token comes from the environment, not
/// the config file).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubSettings {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
}

/// Branch naming scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSettings {
    #[serde(default = "default_main")]
    pub main: String,
    #[serde(default = "default_develop")]
    pub develop: String,
    #[serde(default = "default_feature_prefix")]
    pub feature_prefix: String,
    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for BranchSettings {
    fn default() -> Self {
        Self {
            main: default_main(),
            develop: default_develop(),
            feature_prefix: default_feature_prefix(),
            release_prefix: default_release_prefix(),
            remote: default_remote(),
        }
    }
}

/// Goal id pattern and default status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSettings {
    #[serde(default = "default_id_pattern")]
    pub id_pattern: String,
    #[serde(default = "default_status")]
    pub default_status: String,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            id_pattern: default_id_pattern(),
            default_status: default_status(),
        }
    }
}

// Serde default functions
fn default_main() -> String {
    "main".to_string()
}

fn default_develop() -> String {
    "develop".to_string()
}

fn default_feature_prefix() -> String {
    "feature".to_string()
}

fn default_release_prefix() -> String {
    "release".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_id_pattern() -> String {
    DEFAULT_ID_PATTERN.to_string()
}

fn default_status() -> String {
    "todo".to_string()
}

/// Top-level workflow configuration from .goalflow/workflow.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub github: GitHubSettings,
    #[serde(default)]
    pub branches: BranchSettings,
    #[serde(default)]
    pub goal: GoalSettings,
}

impl WorkflowConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load config, returning defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

/// Validated, read-only configuration bound at startup.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub github: GitHubSettings,
    pub branches: BranchSettings,
    pub id_pattern: Regex,
    pub default_status: GoalStatus,
}

impl WorkflowContext {
    /// Validate and freeze a loaded config.
    pub fn new(config: WorkflowConfig) -> Result<Self, WorkflowError> {
        let id_pattern = Regex::new(&config.goal.id_pattern).map_err(|e| {
            WorkflowError::Validation(format!(
                "bad goal id pattern {:?}: {}",
                config.goal.id_pattern, e
            ))
        })?;
        let default_status = GoalStatus::from_str(&config.goal.default_status)
            .map_err(WorkflowError::Validation)?;
        Ok(Self {
            github: config.github,
            branches: config.branches,
            id_pattern,
            default_status,
        })
    }

    /// The feature branch bound to a goal: `<feature_prefix>/<goal_id>`.
    pub fn feature_branch(&self, goal_id: &str) -> String {
        format!("{}/{}", self.branches.feature_prefix, goal_id)
    }
}

impl Default for WorkflowContext {
    fn default() -> Self {
        // The built-in defaults always validate.
        Self::new(WorkflowConfig::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let ctx = WorkflowContext::default();
        assert_eq!(ctx.branches.develop, "develop");
        assert_eq!(ctx.branches.remote, "origin");
        assert_eq!(ctx.default_status, GoalStatus::Todo);
        assert!(ctx.id_pattern.is_match("g-a1b2c3"));
        assert!(!ctx.id_pattern.is_match("g-TOOBIG"));
        assert!(!ctx.id_pattern.is_match("goal-1"));
    }

    #[test]
    fn feature_branch_uses_configured_prefix() {
        let mut config = WorkflowConfig::default();
        config.branches.feature_prefix = "feat".to_string();
        let ctx = WorkflowContext::new(config).unwrap();
        assert_eq!(ctx.feature_branch("g-a1b2c3"), "feat/g-a1b2c3");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: WorkflowConfig = toml::from_str(
            r#"
            [github]
            owner = "acme"
            repo = "widgets"

            [branches]
            develop = "dev"
            "#,
        )
        .unwrap();
        assert_eq!(config.github.owner, "acme");
        assert_eq!(config.branches.develop, "dev");
        assert_eq!(config.branches.main, "main");
        assert_eq!(config.goal.id_pattern, DEFAULT_ID_PATTERN);
    }

    #[test]
    fn bad_id_pattern_is_a_validation_error() {
        let mut config = WorkflowConfig::default();
        config.goal.id_pattern = "([".to_string();
        let err = WorkflowContext::new(config).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
