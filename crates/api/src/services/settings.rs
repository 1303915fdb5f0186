//! Typed UI settings with a short-lived cache.
//!
//! `system_settings` is read at most once per TTL window and turned into a
//! [`UiSettings`]. Handlers receive it through the [`ResolvedSettings`]
//! extractor; admin writes call [`SettingsCache::invalidate`].

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use moka::future::Cache;
use sqlx::PgPool;

use swiftbite_core::UiSettings;

use crate::db::{RepositoryError, SettingsRepository};
use crate::error::AppError;
use crate::state::AppState;

/// How long resolved settings are served from memory.
pub const SETTINGS_TTL: Duration = Duration::from_secs(30);

const UI_SETTINGS_KEY: &str = "ui";

/// Cache of the resolved settings.
#[derive(Clone)]
pub struct SettingsCache {
    cache: Cache<&'static str, UiSettings>,
}

impl SettingsCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { cache }
    }

    /// Current settings, from cache or from the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the settings can't be loaded.
    pub async fn resolve(&self, pool: &PgPool) -> Result<UiSettings, RepositoryError> {
        if let Some(settings) = self.cache.get(&UI_SETTINGS_KEY).await {
            return Ok(settings);
        }

        let stored = SettingsRepository::new(pool).list().await?;
        let settings = UiSettings::from_pairs(stored.iter().map(|s| (&s.key, &s.value)));

        self.cache.insert(UI_SETTINGS_KEY, settings.clone()).await;
        Ok(settings)
    }

    /// Drop the cached settings so the next request reloads them.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&UI_SETTINGS_KEY).await;
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(SETTINGS_TTL)
    }
}

/// Extractor yielding the settings in effect for this request.
///
/// The first extraction in a request stores the value in the request
/// extensions, so later extractors and middleware see the same snapshot.
#[derive(Debug, Clone)]
pub struct ResolvedSettings(pub UiSettings);

impl FromRequestParts<AppState> for ResolvedSettings {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(settings) = parts.extensions.get::<Self>() {
            return Ok(settings.clone());
        }

        let settings = Self(state.settings().resolve(state.pool()).await?);
        parts.extensions.insert(settings.clone());
        Ok(settings)
    }
}
