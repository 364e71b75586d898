// store.rs — GoalStore: the storage contract, plus its JSON implementation.
//
// The orchestrator persists through the `GoalStore` trait and never sees
// how records are laid out. `JsonGoalStore` keeps one JSON file per goal:
// `<store_dir>/<goal_id>.json`, with a `config.json` map alongside for the
// string-keyed configuration. Goals stay isolated and the store is easy to
// inspect manually.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GoalError;
use crate::goal::{Goal, GoalStatus, GoalUpdate};

/// Storage contract for goals and string-keyed configuration.
///
/// String keys exist only at this boundary — callers above it consume
/// typed configuration structs.
pub trait GoalStore: Send + Sync {
    /// Persist a new goal. Fails if a goal with this id already exists.
    fn create_goal(&self, goal: &Goal) -> Result<(), GoalError>;

    /// Fetch a goal by id.
    fn get_goal(&self, id: &str) -> Result<Option<Goal>, GoalError>;

    /// Apply a partial update to a stored goal and return the result.
    /// The whole update lands in one write — a status change and its
    /// branch field are never persisted separately.
    fn update_goal(&self, id: &str, update: GoalUpdate) -> Result<Goal, GoalError>;

    /// List goals, optionally filtered by status, newest first.
    fn list_goals(&self, status: Option<GoalStatus>) -> Result<Vec<Goal>, GoalError>;

    /// Find the goal linked to a GitHub issue, if any.
    fn find_by_issue(&self, issue_id: i64) -> Result<Option<Goal>, GoalError>;

    /// Find the goal bound to a branch, if any.
    fn find_by_branch(&self, branch: &str) -> Result<Option<Goal>, GoalError>;

    /// Read a configuration value.
    fn get_config(&self, key: &str) -> Result<Option<String>, GoalError>;

    /// Write a configuration value.
    fn set_config(&self, key: &str, value: &str) -> Result<(), GoalError>;
}

/// File-per-goal JSON store.
pub struct JsonGoalStore {
    store_dir: PathBuf,
}

impl JsonGoalStore {
    /// Create a store backed by the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(store_dir: impl AsRef<Path>) -> Result<Self, GoalError> {
        let store_dir = store_dir.as_ref().to_path_buf();
        fs::create_dir_all(&store_dir).map_err(|source| GoalError::Io {
            path: store_dir.display().to_string(),
            source,
        })?;
        Ok(Self { store_dir })
    }

    fn goal_file(&self, id: &str) -> PathBuf {
        self.store_dir.join(format!("{}.json", id))
    }

    fn config_file(&self) -> PathBuf {
        self.store_dir.join("config.json")
    }

    fn write_goal(&self, goal: &Goal) -> Result<(), GoalError> {
        let path = self.goal_file(&goal.id);
        let json = serde_json::to_string_pretty(goal)?;
        fs::write(&path, json).map_err(|source| GoalError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn read_config(&self) -> Result<BTreeMap<String, String>, GoalError> {
        let path = self.config_file();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&path).map_err(|source| GoalError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl GoalStore for JsonGoalStore {
    fn create_goal(&self, goal: &Goal) -> Result<(), GoalError> {
        if self.goal_file(&goal.id).exists() {
            return Err(GoalError::AlreadyExists(goal.id.clone()));
        }
        self.write_goal(goal)
    }

    fn get_goal(&self, id: &str) -> Result<Option<Goal>, GoalError> {
        let path = self.goal_file(id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| GoalError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn update_goal(&self, id: &str, update: GoalUpdate) -> Result<Goal, GoalError> {
        let mut goal = self
            .get_goal(id)?
            .ok_or_else(|| GoalError::NotFound(id.to_string()))?;
        goal.apply(update)?;
        self.write_goal(&goal)?;
        Ok(goal)
    }

    fn list_goals(&self, status: Option<GoalStatus>) -> Result<Vec<Goal>, GoalError> {
        let mut goals = Vec::new();

        let entries = fs::read_dir(&self.store_dir).map_err(|source| GoalError::Io {
            path: self.store_dir.display().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| GoalError::Io {
                path: self.store_dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json")
                || path.file_name().is_some_and(|n| n == "config.json")
            {
                continue;
            }
            let json = fs::read_to_string(&path).map_err(|source| GoalError::Io {
                path: path.display().to_string(),
                source,
            })?;
            match serde_json::from_str::<Goal>(&json) {
                Ok(goal) => {
                    if status.is_none_or(|s| goal.status == s) {
                        goals.push(goal);
                    }
                }
                Err(e) => {
                    // A corrupt record shouldn't hide every other goal.
                    tracing::warn!(path = %path.display(), "skipping unreadable goal file: {}", e);
                }
            }
        }

        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    fn find_by_issue(&self, issue_id: i64) -> Result<Option<Goal>, GoalError> {
        Ok(self
            .list_goals(None)?
            .into_iter()
            .find(|g| g.github_issue_id == Some(issue_id)))
    }

    fn find_by_branch(&self, branch: &str) -> Result<Option<Goal>, GoalError> {
        Ok(self
            .list_goals(None)?
            .into_iter()
            .find(|g| g.branch_name.as_deref() == Some(branch)))
    }

    fn get_config(&self, key: &str) -> Result<Option<String>, GoalError> {
        Ok(self.read_config()?.get(key).cloned())
    }

    fn set_config(&self, key: &str, value: &str) -> Result<(), GoalError> {
        let mut config = self.read_config()?;
        config.insert(key.to_string(), value.to_string());
        let path = self.config_file();
        let json = serde_json::to_string_pretty(&config)?;
        fs::write(&path, json).map_err(|source| GoalError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_goal(id: &str, title: &str) -> Goal {
        Goal::new(id, title, GoalStatus::Todo)
    }

    #[test]
    fn create_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        let goal = make_goal("g-abc123", "Test Goal");
        store.create_goal(&goal).unwrap();

        let found = store.get_goal("g-abc123").unwrap().unwrap();
        assert_eq!(found.id, "g-abc123");
        assert_eq!(found.title, "Test Goal");
    }

    #[test]
    fn create_duplicate_id_fails() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        store.create_goal(&make_goal("g-abc123", "First")).unwrap();
        let err = store
            .create_goal(&make_goal("g-abc123", "Second"))
            .unwrap_err();
        assert!(matches!(err, GoalError::AlreadyExists(_)));
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();
        assert!(store.get_goal("g-zzzzzz").unwrap().is_none());
    }

    #[test]
    fn update_persists_status_and_branch_together() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();
        store.create_goal(&make_goal("g-abc123", "Goal")).unwrap();

        let updated = store
            .update_goal(
                "g-abc123",
                GoalUpdate {
                    status: Some(GoalStatus::InProgress),
                    branch_name: Some(Some("feature/g-abc123".to_string())),
                    ..GoalUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, GoalStatus::InProgress);

        let reloaded = store.get_goal("g-abc123").unwrap().unwrap();
        assert_eq!(reloaded.status, GoalStatus::InProgress);
        assert_eq!(reloaded.branch_name.as_deref(), Some("feature/g-abc123"));
    }

    #[test]
    fn update_nonexistent_returns_not_found() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();
        let err = store
            .update_goal("g-zzzzzz", GoalUpdate::status(GoalStatus::Done))
            .unwrap_err();
        assert!(matches!(err, GoalError::NotFound(_)));
    }

    #[test]
    fn list_filters_by_status_and_skips_config_file() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        store.create_goal(&make_goal("g-aaaaaa", "Todo")).unwrap();
        let mut started = make_goal("g-bbbbbb", "Started");
        started.status = GoalStatus::InProgress;
        store.create_goal(&started).unwrap();
        store.set_config("github.owner", "acme").unwrap();

        let all = store.list_goals(None).unwrap();
        assert_eq!(all.len(), 2);

        let todo = store.list_goals(Some(GoalStatus::Todo)).unwrap();
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].id, "g-aaaaaa");
    }

    #[test]
    fn find_by_issue_and_branch() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        let mut goal = make_goal("g-abc123", "Linked");
        goal.github_issue_id = Some(7);
        goal.branch_name = Some("feature/g-abc123".to_string());
        store.create_goal(&goal).unwrap();
        store.create_goal(&make_goal("g-ddd444", "Other")).unwrap();

        assert_eq!(store.find_by_issue(7).unwrap().unwrap().id, "g-abc123");
        assert!(store.find_by_issue(8).unwrap().is_none());
        assert_eq!(
            store
                .find_by_branch("feature/g-abc123")
                .unwrap()
                .unwrap()
                .id,
            "g-abc123"
        );
        assert!(store.find_by_branch("feature/g-zzzzzz").unwrap().is_none());
    }

    #[test]
    fn config_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        assert!(store.get_config("translation.max_retries").unwrap().is_none());
        store.set_config("translation.max_retries", "5").unwrap();
        assert_eq!(
            store.get_config("translation.max_retries").unwrap().as_deref(),
            Some("5")
        );

        // Overwrite keeps the latest value.
        store.set_config("translation.max_retries", "2").unwrap();
        assert_eq!(
            store.get_config("translation.max_retries").unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn corrupt_goal_file_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("goals");
        let store = JsonGoalStore::new(&store_path).unwrap();

        store.create_goal(&make_goal("g-abc123", "Good")).unwrap();
        fs::write(store_path.join("g-broken.json"), "{not json").unwrap();

        let listed = store.list_goals(None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "g-abc123");
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("goals");

        {
            let store = JsonGoalStore::new(&store_path).unwrap();
            store.create_goal(&make_goal("g-abc123", "Persistent")).unwrap();
        }
        {
            let store = JsonGoalStore::new(&store_path).unwrap();
            let found = store.get_goal("g-abc123").unwrap().unwrap();
            assert_eq!(found.title, "Persistent");
        }
    }
}
