//! `ltt settings` subcommands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use ltt_core::{AppSettings, Clock, SettingsPatch, TimeStore, Tracker};

fn write_settings<W: Write>(writer: &mut W, settings: &AppSettings) -> Result<()> {
    writeln!(writer, "idle-detection        {}", settings.idle_detection)?;
    writeln!(writer, "idle-timeout-minutes  {}", settings.idle_timeout_minutes)?;
    writeln!(writer, "theme                 {}", settings.theme)?;
    writeln!(writer, "always-on-top         {}", settings.always_on_top)?;
    writeln!(writer, "compact-mode          {}", settings.compact_mode)?;
    writeln!(writer, "auto-stop-hours       {}", settings.auto_stop_hours)?;
    Ok(())
}

/// Runs `ltt settings show`.
pub fn show<S: TimeStore, W: Write>(writer: &mut W, store: &S, json: bool) -> Result<()> {
    let settings = store.get_settings().context("failed to load settings")?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&settings)?)?;
    } else {
        write_settings(writer, &settings)?;
    }
    Ok(())
}

/// Runs `ltt settings set`, printing the resulting settings.
pub fn set<S: TimeStore, C: Clock, W: Write>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    patch: &SettingsPatch,
) -> Result<()> {
    if patch.is_empty() {
        bail!("no settings given; see 'ltt settings set --help'");
    }
    let updated = tracker
        .update_settings(patch)
        .context("failed to save settings")?;
    write_settings(writer, &updated)
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use ltt_core::{SystemClock, Theme};
    use ltt_db::Database;

    use super::*;
    use crate::commands::util::open_tracker;

    #[test]
    fn show_defaults() {
        let db = Database::open_in_memory().unwrap();
        let mut buffer = Vec::new();
        show(&mut buffer, &db, false).unwrap();
        assert_snapshot!(String::from_utf8(buffer).unwrap(), @r"
        idle-detection        false
        idle-timeout-minutes  240
        theme                 dark
        always-on-top         false
        compact-mode          false
        auto-stop-hours       8
        ");
    }

    #[test]
    fn set_persists_only_given_fields() {
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), SystemClock).unwrap();
        let patch = SettingsPatch {
            idle_detection: Some(true),
            theme: Some(Theme::System),
            ..SettingsPatch::default()
        };
        set(&mut Vec::new(), &mut tracker, &patch).unwrap();

        let mut buffer = Vec::new();
        show(&mut buffer, tracker.store(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["idleDetection"], true);
        assert_eq!(value["theme"], "system");
        assert_eq!(value["idleTimeoutMinutes"], 240);
        assert_eq!(value["autoStopHours"], 8);
    }

    #[test]
    fn set_without_values_fails() {
        let mut tracker = open_tracker(Database::open_in_memory().unwrap(), SystemClock).unwrap();
        let err = set(&mut Vec::new(), &mut tracker, &SettingsPatch::default()).unwrap_err();
        assert!(err.to_string().starts_with("no settings given"));
    }
}
