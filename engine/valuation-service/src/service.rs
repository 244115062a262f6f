//! Valuation service facade
//!
//! Resolves the settings snapshot for a request, then hands it to the pure
//! engine. Request bodies are parsed here, so malformed requests surface as
//! `InvalidInput` before any settings are fetched.

use crate::error::Result;
use settings_service::{create_store, SettingsRecord, SettingsResolver, SettingsServiceConfig};
use tracing::{debug, info};
use valuation_engine::{
    compute_player_value, pick_chart, value_pick, PickChartRow, PickDescriptor, PickValuation, PlayerAttributes,
    SettingsPatch, ValuationError, ValuationResult,
};

/// Entry point for every valuation request
#[derive(Clone)]
pub struct ValuationService {
    resolver: SettingsResolver,
}

impl ValuationService {
    pub fn new(resolver: SettingsResolver) -> Self {
        Self { resolver }
    }

    /// Build the store from configuration and seed the default row if asked to
    pub async fn from_config(config: &SettingsServiceConfig) -> Result<Self> {
        let store = create_store(config).await?;
        let resolver = SettingsResolver::new(store);
        if config.seed_default && resolver.seed_default().await? {
            info!("Seeded default settings into {} store", resolver.store().name());
        }
        Ok(Self::new(resolver))
    }

    pub fn resolver(&self) -> &SettingsResolver {
        &self.resolver
    }

    /// Value a player against the franchise's settings
    pub async fn value_player(&self, franchise_id: Option<&str>, attrs: &PlayerAttributes) -> Result<ValuationResult> {
        let settings = self.resolver.resolve(franchise_id).await?;
        let result = compute_player_value(attrs, &settings);
        debug!(value = result.value, pick = result.nearest_pick.pick, "player valuation complete");
        Ok(result)
    }

    /// Parse a JSON player request and value it
    pub async fn value_player_json(&self, franchise_id: Option<&str>, body: &str) -> Result<ValuationResult> {
        let attrs = PlayerAttributes::from_json(body)?;
        self.value_player(franchise_id, &attrs).await
    }

    /// Value a current or future pick against the franchise's settings
    pub async fn value_pick(&self, franchise_id: Option<&str>, descriptor: &PickDescriptor) -> Result<PickValuation> {
        descriptor.validate()?;
        let settings = self.resolver.resolve(franchise_id).await?;
        Ok(value_pick(descriptor, &settings)?)
    }

    /// Parse a JSON pick request and value it
    pub async fn value_pick_json(&self, franchise_id: Option<&str>, body: &str) -> Result<PickValuation> {
        let descriptor: PickDescriptor = serde_json::from_str(body)
            .map_err(|e| ValuationError::invalid_input(format!("pick request: {}", e)))?;
        self.value_pick(franchise_id, &descriptor).await
    }

    /// The full draft pick chart
    pub fn pick_chart(&self) -> Vec<PickChartRow> {
        pick_chart()
    }

    /// The settings row a franchise resolves to
    pub async fn settings(&self, franchise_id: Option<&str>) -> Result<SettingsRecord> {
        Ok(self.resolver.resolve_record(franchise_id).await?)
    }

    /// Merge a JSON patch into a franchise's settings
    pub async fn patch_settings(&self, franchise_id: Option<&str>, body: &str) -> Result<SettingsRecord> {
        let patch = SettingsPatch::from_json(body)?;
        if patch.is_empty() {
            debug!("empty settings patch");
        }
        Ok(self.resolver.update(franchise_id, &patch).await?)
    }

    /// Seed the default row; `reset` overwrites an existing one
    pub async fn seed_default(&self, reset: bool) -> Result<SettingsRecord> {
        if reset {
            return Ok(self.resolver.reset_default().await?);
        }
        self.resolver.seed_default().await?;
        Ok(self.resolver.resolve_record(None).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_engine::{DevTrait, Position, Settings};

    async fn service() -> ValuationService {
        ValuationService::from_config(&SettingsServiceConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_from_config_seeds_default() {
        let service = service().await;
        let record = service.settings(None).await.unwrap();
        assert_eq!(record.settings, Settings::default());
        assert_eq!(record.revision, 1);
    }

    #[tokio::test]
    async fn test_unseeded_store_not_found() {
        let config = SettingsServiceConfig { seed_default: false, ..SettingsServiceConfig::in_memory() };
        let service = ValuationService::from_config(&config).await.unwrap();
        let attrs = PlayerAttributes::new(90, 25, Position::QB, DevTrait::Star);
        assert!(service.value_player(None, &attrs).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_value_player_json() {
        let service = service().await;
        let result = service
            .value_player_json(Some("chiefs"), r#"{"overall": 93, "age": 26, "position": "QB", "dev_trait": "X-Factor"}"#)
            .await
            .unwrap();
        assert!(result.value > 0.0);

        let err = service.value_player_json(None, r#"{"overall": 93, "age": "old"}"#).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_franchise_patch_changes_only_that_franchise() {
        let service = service().await;
        let body = r#"{"overall": 88, "age": 24, "position": "TE", "dev_trait": "Star"}"#;
        let before = service.value_player_json(Some("chiefs"), body).await.unwrap();

        service.patch_settings(Some("chiefs"), r#"{"pos_offsets": {"TE": 0.9}}"#).await.unwrap();
        let after = service.value_player_json(Some("chiefs"), body).await.unwrap();
        let other = service.value_player_json(Some("bills"), body).await.unwrap();

        assert!(after.value > before.value);
        assert_eq!(other.value, before.value);
    }

    #[tokio::test]
    async fn test_patch_rejects_unknown_keys() {
        let service = service().await;
        let err = service.patch_settings(None, r#"{"pos_offset": {"TE": 0.9}}"#).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_value_pick() {
        let service = service().await;
        let valuation = service.value_pick_json(None, r#"{"round": 1, "years_out": 1}"#).await.unwrap();
        assert!((valuation.value.points - 750.0).abs() < 1e-9);
        assert_eq!(valuation.nearest_pick.pick, 23);

        let err = service.value_pick_json(None, r#"{"round": 9, "years_out": 1}"#).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_value_pick_disabled() {
        let service = service().await;
        service.patch_settings(None, r#"{"future_picks": {"enabled": false}}"#).await.unwrap();
        let descriptor = PickDescriptor::new(2, 0, None).unwrap();
        assert!(service.value_pick(None, &descriptor).await.unwrap_err().is_feature_disabled());
    }

    #[test]
    fn test_blocking_lowercase_codes_match() {
        let service = tokio_test::block_on(service());
        let upper = r#"{"overall": 91, "age": 27, "position": "WR", "dev_trait": "X-Factor"}"#;
        let lower = r#"{"overall": 91, "age": 27, "position": "wr", "dev_trait": "xfactor"}"#;
        let a = tokio_test::block_on(service.value_player_json(None, upper)).unwrap();
        let b = tokio_test::block_on(service.value_player_json(None, lower)).unwrap();
        assert_eq!(a.value, b.value);

        let descriptor = PickDescriptor::new(1, 0, Some(5)).unwrap();
        let valuation = tokio_test::block_on(service.value_pick(None, &descriptor)).unwrap();
        assert_eq!(valuation.descriptor, descriptor);
    }

    #[tokio::test]
    async fn test_seed_reset() {
        let service = service().await;
        service.patch_settings(None, r#"{"pos_spread_scalar": 1.2}"#).await.unwrap();
        let kept = service.seed_default(false).await.unwrap();
        assert_eq!(kept.settings.pos_spread_scalar, 1.2);
        let reset = service.seed_default(true).await.unwrap();
        assert_eq!(reset.settings, Settings::default());
        assert_eq!(service.pick_chart().len(), 224);
    }
}
