//! Resolver scenarios against both stores

use crate::{create_store, SettingsResolver, SettingsScope, SettingsServiceConfig};
use std::sync::Arc;
use tempfile::TempDir;
use valuation_engine::{Position, SettingsPatch};

async fn local_resolver(dir: &TempDir) -> SettingsResolver {
    let store = create_store(&SettingsServiceConfig::new(dir.path())).await.unwrap();
    SettingsResolver::new(store)
}

#[tokio::test]
async fn test_local_updates_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    {
        let resolver = local_resolver(&temp_dir).await;
        resolver.seed_default().await.unwrap();
        let patch = SettingsPatch::from_json(r#"{"pos_offsets": {"CB": 0.7}}"#).unwrap();
        resolver.update(Some("ravens"), &patch).await.unwrap();
    }

    let resolver = local_resolver(&temp_dir).await;
    let ravens = resolver.resolve(Some("ravens")).await.unwrap();
    assert_eq!(ravens.pos_offsets.get(&Position::CB), Some(&0.7));
    let scopes = resolver.store().scopes().await.unwrap();
    assert_eq!(scopes, vec![SettingsScope::Default, SettingsScope::Franchise("ravens".to_string())]);
}

#[tokio::test]
async fn test_concurrent_updates_all_land() {
    let resolver = Arc::new(SettingsResolver::new(
        create_store(&SettingsServiceConfig::in_memory()).await.unwrap(),
    ));
    resolver.seed_default().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let resolver = Arc::clone(&resolver);
        handles.push(tokio::spawn(async move {
            let id = format!("team-{}", i);
            let patch = SettingsPatch::from_json(r#"{"version": 2}"#).unwrap();
            resolver.update(Some(id.as_str()), &patch).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().settings.version, 2);
    }
    assert_eq!(resolver.store().scopes().await.unwrap().len(), 9);
}

async fn assert_same_scope_patches_all_land(resolver: SettingsResolver) {
    resolver.seed_default().await.unwrap();

    let mut handles = Vec::new();
    for pos in Position::ALL {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"pos_offsets": {{"{}": 0.99}}}}"#, pos);
            let patch = SettingsPatch::from_json(&body).unwrap();
            resolver.update(Some("bears"), &patch).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = resolver.resolve_record(Some("bears")).await.unwrap();
    assert_eq!(record.revision, Position::ALL.len() as u64);
    for pos in Position::ALL {
        assert_eq!(record.settings.pos_offsets.get(&pos), Some(&0.99), "lost patch for {}", pos);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_scope_patches_all_land_local() {
    let temp_dir = TempDir::new().unwrap();
    assert_same_scope_patches_all_land(local_resolver(&temp_dir).await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_scope_patches_all_land_in_memory() {
    let store = create_store(&SettingsServiceConfig::in_memory()).await.unwrap();
    assert_same_scope_patches_all_land(SettingsResolver::new(store)).await;
}

#[test]
fn test_blocking_resolve() {
    let resolver = SettingsResolver::new(Arc::new(crate::InMemorySettingsStore::new()));
    let seeded = tokio_test::block_on(resolver.seed_default()).unwrap();
    assert!(seeded);
    let settings = tokio_test::block_on(resolver.resolve(None)).unwrap();
    assert_eq!(settings.version, 1);
}
