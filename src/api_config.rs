use std::env;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use reqwest::Url;

use crate::player::Position;

const ANDROID_EMULATOR_URL: &str = "http://10.0.2.2:8000";
const DEFAULT_HOST_IP: &str = "10.249.17.55";
const LOCALHOST_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    AndroidEmulator,
    AndroidDevice,
    IosSimulator,
    Other,
}

impl Platform {
    fn parse(raw: &str) -> Platform {
        match raw.trim().to_lowercase().as_str() {
            "android-emulator" | "android_emulator" | "emulator" => Platform::AndroidEmulator,
            "android-device" | "android" | "device" => Platform::AndroidDevice,
            "ios-simulator" | "ios_simulator" | "ios" => Platform::IosSimulator,
            _ => Platform::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Players,
    ByPosition,
    Season2025,
    Mysql,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub catalog: CatalogSource,
    pub use_sample: bool,
    pub sample_fallback: bool,
    /// Year used for game logs that only carry `MM.DD`.
    pub season: i32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: LOCALHOST_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            catalog: CatalogSource::Players,
            use_sample: false,
            sample_fallback: true,
            season: Utc::now().year(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through `lookup` so tests can inject variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("LINEUP_ENV").map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "production" || v == "prod" => Environment::Production,
            _ => Environment::Development,
        };
        let platform = get("LINEUP_PLATFORM")
            .map(|v| Platform::parse(&v))
            .unwrap_or(Platform::Other);

        let base_url = match get("LINEUP_API_URL") {
            Some(url) => url,
            None => resolve_base_url(
                environment,
                platform,
                get("LINEUP_PROD_URL").as_deref(),
                get("LINEUP_HOST_IP").as_deref(),
            ),
        };

        let timeout_secs = get("LINEUP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 60);

        let catalog = match get("LINEUP_CATALOG").map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "season2025" || v == "2025" => CatalogSource::Season2025,
            Some(v) if v == "mysql" => CatalogSource::Mysql,
            Some(v) if v == "by_position" || v == "by-position" => CatalogSource::ByPosition,
            _ => CatalogSource::Players,
        };

        let use_sample = get("LINEUP_SOURCE")
            .map(|v| v.trim().eq_ignore_ascii_case("sample"))
            .unwrap_or(false);
        let sample_fallback = get("LINEUP_SAMPLE_FALLBACK")
            .map(|v| v.trim() != "0")
            .unwrap_or(true);
        let season = get("LINEUP_SEASON")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|y| (1982..=2100).contains(y))
            .unwrap_or_else(|| Utc::now().year());

        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout_secs,
            catalog,
            use_sample,
            sample_fallback,
            season,
        }
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints::new(&self.base_url).with_timeout(self.timeout_secs)
    }
}

pub fn resolve_base_url(
    environment: Environment,
    platform: Platform,
    prod_url: Option<&str>,
    host_ip: Option<&str>,
) -> String {
    match environment {
        Environment::Production => prod_url.unwrap_or(LOCALHOST_URL).to_string(),
        Environment::Development => match platform {
            Platform::AndroidEmulator => ANDROID_EMULATOR_URL.to_string(),
            Platform::AndroidDevice => {
                format!("http://{}:8000", host_ip.unwrap_or(DEFAULT_HOST_IP))
            }
            Platform::IosSimulator | Platform::Other => LOCALHOST_URL.to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: String,
    timeout_secs: u64,
}

impl ApiEndpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs.clamp(1, 60);
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn players(&self) -> String {
        format!("{}/api/players/", self.base)
    }

    pub fn players_by_position(&self, position: Position) -> String {
        format!(
            "{}/api/players/by_position/?position={}",
            self.base,
            position.key()
        )
    }

    pub fn all_players_by_position(&self) -> String {
        format!("{}/api/players/all_by_position/", self.base)
    }

    pub fn player_detail(&self, id: u32) -> String {
        format!("{}/api/players/{id}/", self.base)
    }

    pub fn mysql_players(&self) -> String {
        format!("{}/api/mysql-players/", self.base)
    }

    pub fn hitter_recent_games(&self, player_name: &str) -> Result<String> {
        self.with_player_name("/api/hitter-recent-games/", player_name)
    }

    pub fn pitcher_recent_games(&self, player_name: &str) -> Result<String> {
        self.with_player_name("/api/pitcher-recent-games/", player_name)
    }

    pub fn hitters_2025(&self) -> String {
        format!("{}/api/hitters-2025/", self.base)
    }

    pub fn pitchers_2025(&self) -> String {
        format!("{}/api/pitchers-2025/", self.base)
    }

    pub fn simulate_at_bat(&self) -> String {
        format!("{}/api/simulate-at-bat/", self.base)
    }

    fn with_player_name(&self, path: &str, player_name: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}{path}", self.base),
            &[("player_name", player_name)],
        )
        .with_context(|| format!("invalid api url for {path}"))?;
        Ok(url.to_string())
    }
}
