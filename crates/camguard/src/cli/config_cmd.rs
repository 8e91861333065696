//! `config` subcommand — show and change persisted settings.

use super::{CamguardError, ConfigAction, ConfigOutput, Result, Settings, kv, kv_width};

pub(super) fn cmd_config(action: Option<ConfigAction>, json: bool) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show) => show(json),
        Some(ConfigAction::Set { key, value }) => set(&key, &value),
    }
}

fn show(json: bool) -> Result<()> {
    let settings = Settings::load();
    let path = Settings::path();
    let exists = path.as_deref().is_some_and(|p| p.exists());

    if json {
        let output = ConfigOutput {
            settings_file: path.map(|p| p.display().to_string()),
            settings_file_exists: exists,
            settings,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    let w = kv_width(&[
        "Settings file",
        "auto-refresh",
        "refresh-interval",
        "show-all-devices",
        "notifications",
    ]);
    match &path {
        Some(p) => kv(
            "Settings file",
            format!("{}{}", p.display(), if exists { "" } else { " (not saved yet)" }),
            w,
        ),
        None => kv("Settings file", "unavailable", w),
    }
    kv("auto-refresh", settings.auto_refresh, w);
    kv(
        "refresh-interval",
        format!("{}s", settings.refresh_interval_secs),
        w,
    );
    kv("show-all-devices", settings.show_all_devices, w);
    kv("notifications", settings.notifications_enabled, w);
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        other => Err(CamguardError::Config(format!(
            "expected true/false, got \"{other}\""
        ))),
    }
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load();
    match key {
        "auto-refresh" => settings.auto_refresh = parse_bool(value)?,
        "show-all-devices" => settings.show_all_devices = parse_bool(value)?,
        "notifications" => settings.notifications_enabled = parse_bool(value)?,
        "refresh-interval" => {
            settings.refresh_interval_secs = value.trim().parse().map_err(|_| {
                CamguardError::Config(format!("expected seconds, got \"{value}\""))
            })?;
        }
        other => {
            return Err(CamguardError::Config(format!(
                "unknown setting \"{other}\" (expected auto-refresh, refresh-interval, \
                 show-all-devices, or notifications)"
            )));
        }
    }
    settings.save()?;
    println!("Set {key} = {}.", value.trim());
    Ok(())
}
