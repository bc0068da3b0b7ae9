//! User preferences persisted alongside customers.

use serde::{Deserialize, Serialize};

use crate::types::Theme;

/// Application settings.
///
/// Only `idle_detection` and `idle_timeout_minutes` change core behaviour;
/// the rest is stored for the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub always_on_top: bool,
    pub compact_mode: bool,
    pub auto_stop_hours: u32,
    /// Stop a running timer automatically once it has run this long.
    pub idle_detection: bool,
    pub idle_timeout_minutes: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            always_on_top: false,
            compact_mode: false,
            auto_stop_hours: 8,
            idle_detection: false,
            idle_timeout_minutes: 240,
        }
    }
}

/// A partial settings update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub always_on_top: Option<bool>,
    pub compact_mode: Option<bool>,
    pub auto_stop_hours: Option<u32>,
    pub idle_detection: Option<bool>,
    pub idle_timeout_minutes: Option<u32>,
}

impl SettingsPatch {
    pub const fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.always_on_top.is_none()
            && self.compact_mode.is_none()
            && self.auto_stop_hours.is_none()
            && self.idle_detection.is_none()
            && self.idle_timeout_minutes.is_none()
    }
}

impl AppSettings {
    /// Returns a copy with the patch applied.
    #[must_use]
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            always_on_top: patch.always_on_top.unwrap_or(self.always_on_top),
            compact_mode: patch.compact_mode.unwrap_or(self.compact_mode),
            auto_stop_hours: patch.auto_stop_hours.unwrap_or(self.auto_stop_hours),
            idle_detection: patch.idle_detection.unwrap_or(self.idle_detection),
            idle_timeout_minutes: patch
                .idle_timeout_minutes
                .unwrap_or(self.idle_timeout_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.idle_detection);
        assert_eq!(settings.idle_timeout_minutes, 240);
        assert_eq!(settings.auto_stop_hours, 8);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"idleDetection": true, "theme": "light"}"#).unwrap();
        assert!(settings.idle_detection);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.idle_timeout_minutes, 240);
    }

    #[test]
    fn merged_only_touches_patched_fields() {
        let patch = SettingsPatch {
            idle_detection: Some(true),
            idle_timeout_minutes: Some(30),
            ..SettingsPatch::default()
        };
        assert!(!patch.is_empty());

        let merged = AppSettings::default().merged(&patch);
        assert!(merged.idle_detection);
        assert_eq!(merged.idle_timeout_minutes, 30);
        assert_eq!(merged.theme, Theme::Dark);
        assert!(SettingsPatch::default().is_empty());
    }
}
