//! Settings store trait and implementations

use crate::config::{SettingsServiceConfig, StoreKind};
use crate::error::{Result, SettingsServiceError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use valuation_engine::Settings;

/// Which settings row a request reads or writes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsScope {
    /// The shared fallback row
    Default,
    /// A row owned by one franchise
    Franchise(String),
}

impl SettingsScope {
    /// Scope for an optional franchise id; blank ids mean the default row
    pub fn for_franchise(franchise_id: Option<&str>) -> Result<Self> {
        match franchise_id.map(str::trim) {
            None | Some("") => Ok(SettingsScope::Default),
            Some(id) => {
                if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                    return Err(SettingsServiceError::invalid_scope(format!(
                        "franchise id '{}' may only contain letters, digits, '-' and '_'",
                        id
                    )));
                }
                Ok(SettingsScope::Franchise(id.to_string()))
            }
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SettingsScope::Default)
    }

    fn file_name(&self) -> String {
        match self {
            SettingsScope::Default => "default.json".to_string(),
            SettingsScope::Franchise(id) => format!("franchise-{}.json", id),
        }
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".json")?;
        if stem == "default" {
            return Some(SettingsScope::Default);
        }
        stem.strip_prefix("franchise-").map(|id| SettingsScope::Franchise(id.to_string()))
    }
}

impl fmt::Display for SettingsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsScope::Default => f.write_str("default"),
            SettingsScope::Franchise(id) => write!(f, "franchise:{}", id),
        }
    }
}

/// A stored settings row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub scope: SettingsScope,
    pub settings: Settings,
    /// Incremented on every save of this scope, starting at 1
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRecord {
    fn next(scope: &SettingsScope, settings: Settings, previous: Option<&SettingsRecord>) -> Self {
        Self {
            scope: scope.clone(),
            settings,
            revision: previous.map_or(1, |p| p.revision + 1),
            updated_at: Utc::now(),
        }
    }
}

/// Persistence seam for settings rows
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the row for a scope, if one exists
    async fn load(&self, scope: &SettingsScope) -> Result<Option<SettingsRecord>>;

    /// Replace the row for a scope and return the stored record
    async fn save(&self, scope: &SettingsScope, settings: Settings) -> Result<SettingsRecord>;

    /// Every scope with a stored row
    async fn scopes(&self) -> Result<Vec<SettingsScope>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// In-memory settings store
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    rows: DashMap<SettingsScope, SettingsRecord>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self, scope: &SettingsScope) -> Result<Option<SettingsRecord>> {
        Ok(self.rows.get(scope).map(|row| row.value().clone()))
    }

    async fn save(&self, scope: &SettingsScope, settings: Settings) -> Result<SettingsRecord> {
        let mut entry = self.rows.entry(scope.clone()).or_insert_with(|| SettingsRecord {
            scope: scope.clone(),
            settings: settings.clone(),
            revision: 0,
            updated_at: Utc::now(),
        });
        let record = SettingsRecord::next(scope, settings, Some(entry.value()));
        *entry = record.clone();
        Ok(record)
    }

    async fn scopes(&self) -> Result<Vec<SettingsScope>> {
        let mut scopes: Vec<SettingsScope> = self.rows.iter().map(|row| row.key().clone()).collect();
        scopes.sort();
        Ok(scopes)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Local file-based settings store, one JSON file per scope
#[derive(Debug)]
pub struct LocalSettingsStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalSettingsStore {
    /// Create the store, creating `data_dir` if needed
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        tracing::info!("Local settings store initialized at: {:?}", data_dir);
        Ok(Self { data_dir, write_lock: Mutex::new(()) })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, scope: &SettingsScope) -> PathBuf {
        self.data_dir.join(scope.file_name())
    }

    async fn read(&self, path: &Path) -> Result<Option<SettingsRecord>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl SettingsStore for LocalSettingsStore {
    async fn load(&self, scope: &SettingsScope) -> Result<Option<SettingsRecord>> {
        self.read(&self.path_for(scope)).await
    }

    async fn save(&self, scope: &SettingsScope, settings: Settings) -> Result<SettingsRecord> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(scope);
        let previous = self.read(&path).await?;
        let record = SettingsRecord::next(scope, settings, previous.as_ref());

        // write then rename so readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&record)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(scope = %scope, revision = record.revision, "settings row written to {:?}", path);
        Ok(record)
    }

    async fn scopes(&self) -> Result<Vec<SettingsScope>> {
        let mut scopes = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(scope) = entry.file_name().to_str().and_then(SettingsScope::from_file_name) {
                scopes.push(scope);
            }
        }
        scopes.sort();
        Ok(scopes)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Build the store a configuration asks for
pub async fn create_store(config: &SettingsServiceConfig) -> Result<Arc<dyn SettingsStore>> {
    config.validate()?;
    let store: Arc<dyn SettingsStore> = match config.store {
        StoreKind::Memory => Arc::new(InMemorySettingsStore::new()),
        StoreKind::Local => Arc::new(LocalSettingsStore::new(&config.data_dir).await?),
    };
    Ok(store)
}
