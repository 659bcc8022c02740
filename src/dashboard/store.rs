use crate::dashboard::layout::DashboardState;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const DASHBOARD_FILE: &str = "dashboard.json";
pub const STORE_VERSION: u32 = 1;

/// Where dashboard state lives between sessions.
///
/// The engine calls `save` after every mutation and ignores failures beyond
/// logging them; durability is up to the implementation.
pub trait DashboardStore: Send {
    /// `Ok(None)` means no state has been saved yet.
    fn load(&self) -> Result<Option<DashboardState>>;
    fn save(&self, state: &DashboardState) -> Result<()>;
}

/// Load state from `store`, falling back to a single tab named
/// `default_tab_name` when nothing usable is stored.
pub fn load_or_default(store: &dyn DashboardStore, default_tab_name: &str) -> DashboardState {
    match store.load() {
        Ok(Some(state)) => state,
        Ok(None) => DashboardState::with_default_tab(default_tab_name),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load dashboard state; using default");
            DashboardState::with_default_tab(default_tab_name)
        }
    }
}

fn default_version() -> u32 {
    STORE_VERSION
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDashboard {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    saved_at: Option<String>,
    state: DashboardState,
}

/// Files written by older builds hold the bare state.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFile {
    Versioned(StoredDashboard),
    Bare(DashboardState),
}

/// Stores the dashboard as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `dashboard.json` inside `base` when it is a directory, `base` itself
    /// otherwise.
    pub fn path_for(base: &str) -> PathBuf {
        let base = Path::new(base);
        if base.is_dir() {
            base.join(DASHBOARD_FILE)
        } else {
            PathBuf::from(base)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DashboardStore for JsonFileStore {
    fn load(&self) -> Result<Option<DashboardState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read dashboard file {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let stored: StoredFile = serde_json::from_str(&content)
            .with_context(|| format!("deserialize dashboard file {}", self.path.display()))?;
        let state = match stored {
            StoredFile::Versioned(stored) => {
                if stored.version > STORE_VERSION {
                    tracing::warn!(
                        version = stored.version,
                        "dashboard file written by a newer version"
                    );
                }
                stored.state
            }
            StoredFile::Bare(state) => state,
        };
        Ok(Some(state))
    }

    fn save(&self, state: &DashboardState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("create dashboard parent folder {}", parent.display())
            })?;
        }
        let stored = StoredDashboard {
            version: STORE_VERSION,
            saved_at: Some(chrono::Local::now().to_rfc3339()),
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&stored).context("serialize dashboard state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write dashboard file {}", self.path.display()))
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: Option<DashboardState>,
    saves: usize,
    fail_saves: bool,
}

/// Keeps the state in memory. Clones share the same storage, so a handle kept
/// outside the engine observes every save.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: DashboardState) -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.state = Some(state);
        }
        store
    }

    pub fn saved(&self) -> Option<DashboardState> {
        self.inner.lock().ok().and_then(|inner| inner.state.clone())
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves).unwrap_or(0)
    }

    /// Make subsequent saves fail, simulating an unavailable backend.
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_saves = fail;
        }
    }
}

impl DashboardStore for MemoryStore {
    fn load(&self) -> Result<Option<DashboardState>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(inner.state.clone())
    }

    fn save(&self, state: &DashboardState) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        if inner.fail_saves {
            return Err(anyhow!("memory store is rejecting saves"));
        }
        inner.state = Some(state.clone());
        inner.saves += 1;
        Ok(())
    }
}
