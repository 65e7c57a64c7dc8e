use crate::error::HomeSearchError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 200;
const DEFAULT_RESET_DEBOUNCE_MS: u64 = 100;
const DEFAULT_HIDE_DELAY_MS: u64 = 200;
const DEFAULT_REMOVAL_ANIMATION_MS: u64 = 200;
const DEFAULT_EMPTY_SECTION_ID: &str = "predictive-search-empty";

/// Tunables of the home search component. Every field has a default, so an
/// empty TOML document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSearchConfig {
    pub search_debounce_ms: u64,
    pub reset_debounce_ms: u64,
    /// Delay between dropping the `visible` class and setting `hidden`,
    /// matching the overlay's exit transition.
    pub hide_delay_ms: u64,
    /// Length of the recently-viewed block's exit animation.
    pub removal_animation_ms: u64,
    pub empty_section_id: String,
    pub reduced_motion: bool,
    pub routes: StorefrontRoutes,
}

/// Storefront paths, resolved against the page origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontRoutes {
    pub predictive_search_url: String,
    pub search_url: String,
}

impl Default for HomeSearchConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            reset_debounce_ms: DEFAULT_RESET_DEBOUNCE_MS,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            removal_animation_ms: DEFAULT_REMOVAL_ANIMATION_MS,
            empty_section_id: DEFAULT_EMPTY_SECTION_ID.to_string(),
            reduced_motion: false,
            routes: StorefrontRoutes::default(),
        }
    }
}

impl Default for StorefrontRoutes {
    fn default() -> Self {
        Self {
            predictive_search_url: "/search/suggest".to_string(),
            search_url: "/search".to_string(),
        }
    }
}

impl HomeSearchConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|err| HomeSearchError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            HomeSearchError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.empty_section_id.trim().is_empty() {
            return Err(HomeSearchError::Config(
                "empty_section_id must not be blank".to_string(),
            ));
        }
        for (name, route) in [
            ("predictive_search_url", &self.routes.predictive_search_url),
            ("search_url", &self.routes.search_url),
        ] {
            if !route.starts_with('/') && Url::parse(route).is_err() {
                return Err(HomeSearchError::Config(format!(
                    "routes.{name} must be an absolute path or url, got `{route}`"
                )));
            }
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn reset_debounce(&self) -> Duration {
        Duration::from_millis(self.reset_debounce_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn removal_animation(&self) -> Duration {
        Duration::from_millis(self.removal_animation_ms)
    }
}
