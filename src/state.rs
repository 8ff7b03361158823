//! Persisted client state.
//!
//! Holds the auth token, the cached user and per-user view preferences.
//! The state is read once when a [`Session`] starts and written back after
//! every change through a [`StateStore`].

use crate::models::User;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Colour theme of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Default order of the mobile navigation bar.
pub const DEFAULT_NAV_ITEMS: [&str; 5] = ["dashboard", "projects", "tasks", "calendar", "team"];

/// View preferences of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub sidebar_collapsed: bool,
    #[serde(default)]
    pub theme: Theme,
    /// Customized order of the mobile navigation bar.
    #[serde(default = "default_nav_items")]
    pub nav_items: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sidebar_collapsed: false,
            theme: Theme::default(),
            nav_items: default_nav_items(),
        }
    }
}

fn default_nav_items() -> Vec<String> {
    DEFAULT_NAV_ITEMS.iter().map(|s| s.to_string()).collect()
}

/// Everything the client remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Keyed by user id.
    #[serde(default)]
    pub preferences: BTreeMap<String, Preferences>,
}

/// Storage backend for [`AppState`].
pub trait StateStore {
    /// Read the saved state; `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<AppState>>;

    fn save(&self, state: &AppState) -> Result<()>;
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn load(&self) -> Result<Option<AppState>> {
        (**self).load()
    }

    fn save(&self, state: &AppState) -> Result<()> {
        (**self).save(state)
    }
}

/// Stores state as pretty JSON in a file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<AppState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        let state = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;

        Ok(Some(state))
    }

    fn save(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

/// Keeps state in memory only; used for `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    saved: Mutex<Option<AppState>>,
}

impl MemoryStateStore {
    /// Last saved state.
    pub fn snapshot(&self) -> Option<AppState> {
        self.saved.lock().ok().and_then(|s| s.clone())
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<AppState>> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("state store lock poisoned"))?;
        *saved = Some(state.clone());
        Ok(())
    }
}

/// Live client state backed by a store.
pub struct Session<S: StateStore> {
    store: S,
    state: AppState,
}

impl<S: StateStore> Session<S> {
    /// Load saved state, or start empty.
    pub fn open(store: S) -> Result<Self> {
        let state = store.load()?.unwrap_or_default();
        Ok(Self { store, state })
    }

    pub fn token(&self) -> Option<&str> {
        self.state.auth_token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.auth_token.is_some()
    }

    /// Remember a token and the user it belongs to.
    pub fn sign_in(&mut self, token: String, user: User) -> Result<()> {
        info!("Signed in as {}", user.email);
        self.state.auth_token = Some(token);
        self.state.user = Some(user);
        self.persist()
    }

    /// Replace the cached user, e.g. after a settings change.
    pub fn update_user(&mut self, user: User) -> Result<()> {
        self.state.user = Some(user);
        self.persist()
    }

    /// Forget the token and user. Preferences are kept.
    pub fn sign_out(&mut self) -> Result<()> {
        self.state.auth_token = None;
        self.state.user = None;
        self.persist()
    }

    /// Preferences of the signed-in user, or defaults.
    pub fn preferences(&self) -> Preferences {
        self.state
            .preferences
            .get(&self.preference_key())
            .cloned()
            .unwrap_or_default()
    }

    /// Change the signed-in user's preferences and save.
    pub fn update_preferences(
        &mut self,
        change: impl FnOnce(&mut Preferences),
    ) -> Result<Preferences> {
        let key = self.preference_key();
        let prefs = self.state.preferences.entry(key).or_default();
        change(prefs);
        let updated = prefs.clone();
        self.persist()?;
        Ok(updated)
    }

    fn preference_key(&self) -> String {
        self.state
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .unwrap_or_else(|| ANONYMOUS_KEY.to_string())
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.state)
    }
}

/// Preference key used when nobody is signed in.
const ANONYMOUS_KEY: &str = "anonymous";

/// Apply a new navigation order, keeping only known items and appending
/// any that were left out.
pub fn reorder_nav_items(requested: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::new();

    for item in requested {
        let item = item.trim().to_lowercase();
        if DEFAULT_NAV_ITEMS.contains(&item.as_str()) && !ordered.contains(&item) {
            ordered.push(item);
        }
    }

    for item in DEFAULT_NAV_ITEMS {
        if !ordered.iter().any(|o| o == item) {
            ordered.push(item.to_string());
        }
    }

    ordered
}
