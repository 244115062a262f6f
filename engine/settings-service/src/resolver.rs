//! Settings resolution, patching and seeding

use crate::error::{Result, SettingsServiceError};
use crate::store::{SettingsRecord, SettingsScope, SettingsStore};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use valuation_engine::{merge_settings, Settings, SettingsPatch};

/// Resolves the settings snapshot a calculation runs against.
///
/// Writes to one scope are serialized; clones share the same scope locks.
#[derive(Clone)]
pub struct SettingsResolver {
    store: Arc<dyn SettingsStore>,
    write_locks: Arc<DashMap<SettingsScope, Arc<Mutex<()>>>>,
}

impl SettingsResolver {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store, write_locks: Arc::new(DashMap::new()) }
    }

    fn scope_lock(&self, scope: &SettingsScope) -> Arc<Mutex<()>> {
        self.write_locks.entry(scope.clone()).or_default().clone()
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Settings for a franchise, falling back to the default row.
    ///
    /// Fails with `NotFound` when neither row exists.
    pub async fn resolve(&self, franchise_id: Option<&str>) -> Result<Settings> {
        Ok(self.resolve_record(franchise_id).await?.settings)
    }

    /// Like [`resolve`](Self::resolve), keeping the stored revision and timestamp
    pub async fn resolve_record(&self, franchise_id: Option<&str>) -> Result<SettingsRecord> {
        let scope = SettingsScope::for_franchise(franchise_id)?;
        if !scope.is_default() {
            if let Some(record) = self.store.load(&scope).await? {
                return Ok(record);
            }
            warn!(scope = %scope, "no franchise settings, falling back to default row");
        }
        self.store
            .load(&SettingsScope::Default)
            .await?
            .ok_or_else(|| SettingsServiceError::not_found(scope.to_string()))
    }

    /// Merge a patch into a scope's settings and store the result.
    ///
    /// A franchise without its own row starts from the default row. The merged
    /// tree must validate before anything is written. The scope stays locked
    /// from load to save, so concurrent patches to one scope all land.
    pub async fn update(&self, franchise_id: Option<&str>, patch: &SettingsPatch) -> Result<SettingsRecord> {
        let scope = SettingsScope::for_franchise(franchise_id)?;
        let lock = self.scope_lock(&scope);
        let _guard = lock.lock().await;
        debug!(scope = %scope, "settings write lock held");

        let existing = match self.store.load(&scope).await? {
            Some(record) => record.settings,
            None if !scope.is_default() => self
                .store
                .load(&SettingsScope::Default)
                .await?
                .map(|record| record.settings)
                .ok_or_else(|| SettingsServiceError::not_found(scope.to_string()))?,
            None => return Err(SettingsServiceError::not_found(scope.to_string())),
        };

        let merged = merge_settings(&existing, patch);
        merged.validate()?;

        let record = self.store.save(&scope, merged).await?;
        info!(scope = %scope, revision = record.revision, store = self.store.name(), "settings updated");
        Ok(record)
    }

    /// Write the calibrated default row if the store has none.
    ///
    /// Returns `true` when a row was written.
    pub async fn seed_default(&self) -> Result<bool> {
        let lock = self.scope_lock(&SettingsScope::Default);
        let _guard = lock.lock().await;
        if self.store.load(&SettingsScope::Default).await?.is_some() {
            return Ok(false);
        }
        let record = self.store.save(&SettingsScope::Default, Settings::default()).await?;
        info!(revision = record.revision, store = self.store.name(), "default settings seeded");
        Ok(true)
    }

    /// Replace the default row with the calibrated defaults
    pub async fn reset_default(&self) -> Result<SettingsRecord> {
        let lock = self.scope_lock(&SettingsScope::Default);
        let _guard = lock.lock().await;
        let record = self.store.save(&SettingsScope::Default, Settings::default()).await?;
        info!(revision = record.revision, store = self.store.name(), "default settings reset");
        Ok(record)
    }
}
