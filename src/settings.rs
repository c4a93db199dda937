//! Snip settings: where to upload and how to size the crop.
//!
//! Layered, later layers win:
//!   1. built-in defaults
//!   2. `~/.config/cmatch/settings.json` (camelCase keys, all optional)
//!   3. environment: CMATCH_API_URL, CMATCH_MAX_DIMENSION,
//!      CMATCH_JPEG_QUALITY, CMATCH_TIMEOUT_SECS
//!
//! `.env.local` / `.env` files are folded into the environment by
//! `crate::init()` before settings are read.

use crate::capture::CropOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnipSettings {
    pub api_base_url: String,
    /// Longer side of the uploaded crop, in pixels.
    pub max_dimension: u32,
    /// JPEG quality in `(0, 1]`.
    pub jpeg_quality: f32,
    pub request_timeout_secs: u64,
}

impl Default for SnipSettings {
    fn default() -> Self {
        let crop = CropOptions::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_dimension: crop.max_dimension,
            jpeg_quality: crop.quality,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Directory where settings are stored.
fn settings_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cmatch")
}

/// Full path to the settings file.
pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

impl SnipSettings {
    /// Defaults, then the settings file, then the process environment.
    pub fn load() -> Self {
        Self::load_from(&settings_path(), |key| std::env::var(key).ok())
    }

    /// `load` against an explicit file and environment.
    pub fn load_from<F>(path: &std::path::Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::from_file(path);
        settings.apply_env(lookup);
        settings.validated()
    }

    /// Read a settings file. Missing or unreadable files yield defaults.
    pub fn from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[SETTINGS] Ignoring invalid {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Override fields from environment variables, looked up via `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CMATCH_API_URL").filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("CMATCH_MAX_DIMENSION") {
            match raw.trim().parse() {
                Ok(v) => self.max_dimension = v,
                Err(_) => log::warn!("[SETTINGS] CMATCH_MAX_DIMENSION is not a number: {}", raw),
            }
        }
        if let Some(raw) = lookup("CMATCH_JPEG_QUALITY") {
            match raw.trim().parse() {
                Ok(v) => self.jpeg_quality = v,
                Err(_) => log::warn!("[SETTINGS] CMATCH_JPEG_QUALITY is not a number: {}", raw),
            }
        }
        if let Some(raw) = lookup("CMATCH_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(v) => self.request_timeout_secs = v,
                Err(_) => log::warn!("[SETTINGS] CMATCH_TIMEOUT_SECS is not a number: {}", raw),
            }
        }
    }

    /// Replace out-of-range values with defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.max_dimension == 0 {
            log::warn!("[SETTINGS] maxDimension must be positive, using {}", defaults.max_dimension);
            self.max_dimension = defaults.max_dimension;
        }
        if !(self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0) {
            log::warn!(
                "[SETTINGS] jpegQuality {} outside (0, 1], using {}",
                self.jpeg_quality,
                defaults.jpeg_quality
            );
            self.jpeg_quality = defaults.jpeg_quality;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = defaults.api_base_url;
        }
        self
    }

    pub fn crop_options(&self) -> CropOptions {
        CropOptions {
            max_dimension: self.max_dimension,
            quality: self.jpeg_quality,
        }
    }

    /// Persist to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create settings dir: {}", e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;
        log::info!("[SETTINGS] Saved settings to {}", path.display());
        Ok(())
    }

    /// Persist to the default settings location.
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&settings_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_crop_policy() {
        let settings = SnipSettings::default();
        assert_eq!(settings.max_dimension, 800);
        assert_eq!(settings.jpeg_quality, 0.8);
        assert_eq!(settings.crop_options(), CropOptions::default());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_keys() {
        let settings: SnipSettings =
            serde_json::from_str(r#"{"apiBaseUrl": "https://api.example.com", "maxDimension": 1024}"#).unwrap();
        assert_eq!(settings.api_base_url, "https://api.example.com");
        assert_eq!(settings.max_dimension, 1024);
        assert_eq!(settings.jpeg_quality, 0.8);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = SnipSettings::default();
        settings.apply_env(env(&[
            ("CMATCH_API_URL", " http://10.0.0.2:9000 "),
            ("CMATCH_MAX_DIMENSION", "640"),
            ("CMATCH_JPEG_QUALITY", "0.95"),
        ]));
        assert_eq!(settings.api_base_url, "http://10.0.0.2:9000");
        assert_eq!(settings.max_dimension, 640);
        assert_eq!(settings.jpeg_quality, 0.95);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn unparsable_environment_values_are_ignored() {
        let mut settings = SnipSettings::default();
        settings.apply_env(env(&[("CMATCH_MAX_DIMENSION", "big"), ("CMATCH_TIMEOUT_SECS", "-1")]));
        assert_eq!(settings, SnipSettings::default());
    }

    #[test]
    fn out_of_range_values_fall_back_to_defaults() {
        let settings = SnipSettings {
            api_base_url: "  ".into(),
            max_dimension: 0,
            jpeg_quality: 1.5,
            request_timeout_secs: 0,
        }
        .validated();
        assert_eq!(settings, SnipSettings::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("cmatch-settings-test-missing/settings.json");
        assert_eq!(SnipSettings::from_file(&path), SnipSettings::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("cmatch-settings-test-{}", std::process::id()))
            .join("settings.json");
        let settings = SnipSettings {
            api_base_url: "https://api.example.com".into(),
            max_dimension: 512,
            jpeg_quality: 0.9,
            request_timeout_secs: 10,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(SnipSettings::from_file(&path), settings);

        // Cleanup
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_layers_env_over_file_and_repairs_bad_values() {
        let path = std::env::temp_dir()
            .join(format!("cmatch-settings-load-{}", std::process::id()))
            .join("settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"apiBaseUrl": "https://file.example.com", "maxDimension": 0, "jpegQuality": 0.7}"#,
        )
        .unwrap();

        let settings = SnipSettings::load_from(&path, env(&[("CMATCH_TIMEOUT_SECS", "5")]));
        assert_eq!(settings.api_base_url, "https://file.example.com");
        assert_eq!(settings.max_dimension, 800);
        assert_eq!(settings.jpeg_quality, 0.7);
        assert_eq!(settings.request_timeout_secs, 5);

        let overridden = SnipSettings::load_from(
            &path,
            env(&[("CMATCH_API_URL", "http://localhost:9000")]),
        );
        assert_eq!(overridden.api_base_url, "http://localhost:9000");

        // Cleanup
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
