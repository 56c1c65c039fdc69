use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::plugins::weather::gate::GateLimits;
use crate::shared::paths::ensure_dir;

pub const RCON_PASSWORD_ENV: &str = "CRAFTDESK_RCON_PASSWORD";
pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub weather: WeatherSettings,
    pub jobs: JobSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub rcon_port: u16,
    pub rcon_password: String,
    pub map_url: String,
    pub timeout_secs: u64,
    /// Root of the server installation; relative folders below resolve
    /// against it.
    pub server_dir: String,
    pub worlds: Vec<WorldFolder>,
    pub map_tiles_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFolder {
    pub name: String,
    pub path: String,
}

impl WorldFolder {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25565,
            rcon_port: 25575,
            rcon_password: String::new(),
            map_url: String::new(),
            timeout_secs: 5,
            server_dir: String::new(),
            worlds: vec![
                WorldFolder::new("World", "world"),
                WorldFolder::new("Nether", "world_nether"),
                WorldFolder::new("The End", "world_the_end"),
            ],
            map_tiles_dir: "plugins/dynmap".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Address players connect to, omitting the default port.
    pub fn address(&self) -> String {
        if self.port == 25565 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Resolves a configured folder. Absolute paths are taken as is;
    /// relative ones need `server_dir`.
    pub fn resolve(&self, folder: &str) -> Option<PathBuf> {
        let folder = Path::new(folder.trim());
        if folder.is_absolute() {
            return Some(folder.to_path_buf());
        }
        let root = self.server_dir.trim();
        if root.is_empty() {
            return None;
        }
        Some(Path::new(root).join(folder))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherSettings {
    pub api_key: String,
    pub default_city: String,
    pub max_calls_per_minute: usize,
    pub warn_threshold: u64,
    pub hard_limit: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        let limits = GateLimits::default();
        Self {
            api_key: String::new(),
            default_city: "Windsor, Ontario".to_string(),
            max_calls_per_minute: limits.max_calls_per_minute,
            warn_threshold: limits.warn_threshold,
            hard_limit: limits.hard_limit,
        }
    }
}

impl WeatherSettings {
    pub fn limits(&self) -> GateLimits {
        GateLimits {
            max_calls_per_minute: self.max_calls_per_minute,
            warn_threshold: self.warn_threshold,
            hard_limit: self.hard_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSettings {
    pub reminder_interval_secs: u64,
    pub stock_interval_secs: u64,
    pub status_interval_secs: u64,
    pub panel_interval_secs: u64,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            reminder_interval_secs: 60,
            stock_interval_secs: 15 * 60,
            status_interval_secs: 6 * 60 * 60,
            panel_interval_secs: 8 * 60 * 60,
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn get_settings_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join("settings.json")
}

/// Loads `settings.json`, falling back to defaults when it is missing or
/// unreadable, then applies environment overrides for secrets.
pub fn load_settings(storage_dir: &Path) -> AppSettings {
    let path = get_settings_path(storage_dir);

    let mut settings = if path.exists() {
        load_settings_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!(target: "system", "Ignoring settings at {:?}: {}", path, e);
            AppSettings::default()
        })
    } else {
        AppSettings::default()
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

fn apply_env_overrides(settings: &mut AppSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(password) = lookup(RCON_PASSWORD_ENV).filter(|v| !v.is_empty()) {
        settings.server.rcon_password = password;
    }
    if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|v| !v.is_empty()) {
        settings.weather.api_key = key;
    }
}

pub fn save_settings(storage_dir: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    ensure_dir(storage_dir)?;

    let path = get_settings_path(storage_dir);
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = load_settings_from_file(&tmp.path().join("settings.json"))
            .unwrap_or_default();
        apply_env_overrides(&mut settings, |_| None);

        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.weather.limits(), GateLimits::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("settings.json"),
            r#"{"server": {"host": "mc.example.org", "rconPassword": "pw"}}"#,
        )
        .unwrap();

        let settings = load_settings_from_file(&get_settings_path(tmp.path())).unwrap();
        assert_eq!(settings.server.host, "mc.example.org");
        assert_eq!(settings.server.rcon_password, "pw");
        assert_eq!(settings.server.rcon_port, 25575);
        assert_eq!(settings.jobs.reminder_interval_secs, 60);
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = AppSettings::default();
        settings.weather.default_city = "Lisbon".to_string();

        save_settings(tmp.path(), &settings).unwrap();
        let loaded = load_settings_from_file(&get_settings_path(tmp.path())).unwrap();
        assert_eq!(loaded.weather.default_city, "Lisbon");
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut settings = AppSettings::default();
        apply_env_overrides(&mut settings, |key| match key {
            RCON_PASSWORD_ENV => Some("secret".to_string()),
            WEATHER_API_KEY_ENV => Some(String::new()),
            _ => None,
        });

        assert_eq!(settings.server.rcon_password, "secret");
        assert!(settings.weather.api_key.is_empty());
    }

    #[test]
    fn test_folders_resolve_against_server_dir() {
        let mut server = ServerSettings::default();
        assert_eq!(server.resolve("world"), None);
        assert_eq!(server.resolve("/srv/other"), Some(PathBuf::from("/srv/other")));

        server.server_dir = "/srv/minecraft".to_string();
        assert_eq!(
            server.resolve(&server.map_tiles_dir),
            Some(PathBuf::from("/srv/minecraft/plugins/dynmap"))
        );
        assert_eq!(server.worlds[1].path, "world_nether");
    }

    #[test]
    fn test_address_omits_default_port() {
        let mut server = ServerSettings::default();
        server.host = "mc.example.org".to_string();
        assert_eq!(server.address(), "mc.example.org");

        server.port = 25570;
        assert_eq!(server.address(), "mc.example.org:25570");
    }
}
