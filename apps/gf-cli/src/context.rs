// context.rs — Per-invocation wiring: paths, config and collaborators.
//
// Everything lives under `.goalflow/` in the project root:
//   workflow.toml — configuration (branches, github, translation)
//   goals/        — the JSON goal store
//   events.jsonl  — lifecycle event log

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use gf_git::GitCli;
use gf_github::{GitHubClient, GitHubConfig};
use gf_goal::{EventDispatcher, JsonGoalStore, LogSink};
use gf_language::LanguageGate;
use gf_translate::{ProviderConfig, ProviderKind, RetryConfig, TranslationClient, TranslationSettings};
use gf_workflow::{WorkflowConfig, WorkflowContext, WorkflowEngine};
use serde::Deserialize;

/// The `[translation]` section of workflow.toml, parsed separately so the
/// workflow crate stays ignorant of translation concerns.
#[derive(Debug, Default, Deserialize)]
struct TranslationSection {
    #[serde(default)]
    translation: TranslationSettings,
}

pub struct AppContext {
    pub project_root: PathBuf,
    pub config: WorkflowConfig,
    pub store: Arc<JsonGoalStore>,
    translation: TranslationSettings,
}

impl AppContext {
    pub fn for_project(project_root: &Path) -> anyhow::Result<Self> {
        let goalflow_dir = project_root.join(".goalflow");
        let config_path = goalflow_dir.join("workflow.toml");

        let config = WorkflowConfig::load_or_default(&config_path);
        let translation = load_translation(&config_path);
        let store = Arc::new(
            JsonGoalStore::new(goalflow_dir.join("goals"))
                .context("opening the goal store")?,
        );

        Ok(Self {
            project_root: project_root.to_path_buf(),
            config,
            store,
            translation,
        })
    }

    /// Build the workflow engine with live collaborators.
    pub fn engine(&self) -> anyhow::Result<WorkflowEngine> {
        let ctx = WorkflowContext::new(self.config.clone())
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        let github_config = GitHubConfig {
            owner: self.config.github.owner.clone(),
            repo: self.config.github.repo.clone(),
        };
        let token = env::var("GITHUB_TOKEN").ok();
        let github = GitHubClient::new(github_config, token);

        let mut events = EventDispatcher::new();
        events.add_sink(Box::new(LogSink::new(
            self.project_root.join(".goalflow").join("events.jsonl"),
        )));

        Ok(WorkflowEngine::new(
            ctx,
            self.store.clone(),
            Arc::new(GitCli::new(&self.project_root)),
            Arc::new(github),
        )
        .with_events(events))
    }

    /// Build the language gate over the configured translation client.
    pub fn language_gate(&self) -> LanguageGate {
        let mut settings = self.translation.clone();
        apply_env_keys(&mut settings);
        // Stored config keys override the file's retry policy.
        settings.retry = RetryConfig::load(self.store.as_ref());

        LanguageGate::new(Arc::new(TranslationClient::from_settings(settings)))
    }
}

fn load_translation(config_path: &Path) -> TranslationSettings {
    let Ok(content) = std::fs::read_to_string(config_path) else {
        return TranslationSettings::default();
    };
    match toml::from_str::<TranslationSection>(&content) {
        Ok(section) => section.translation,
        Err(e) => {
            tracing::warn!("ignoring bad [translation] section: {}", e);
            TranslationSettings::default()
        }
    }
}

/// Fill in provider credentials from the environment when the config file
/// doesn't carry them.
fn apply_env_keys(settings: &mut TranslationSettings) {
    const ENV_KEYS: [(ProviderKind, &str); 3] = [
        (ProviderKind::Gemini, "GEMINI_API_KEY"),
        (ProviderKind::OpenAi, "OPENAI_API_KEY"),
        (ProviderKind::Anthropic, "ANTHROPIC_API_KEY"),
    ];
    for (kind, var) in ENV_KEYS {
        if settings.providers.contains_key(&kind) {
            continue;
        }
        if let Ok(api_key) = env::var(var) {
            if !api_key.is_empty() {
                settings.providers.insert(
                    kind,
                    ProviderConfig {
                        api_key,
                        model: None,
                        base_url: None,
                    },
                );
                if settings.provider.is_none() {
                    settings.provider = Some(kind);
                }
            }
        }
    }
}
