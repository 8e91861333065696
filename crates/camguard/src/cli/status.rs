//! `status` subcommand — one-screen summary of devices and microphone.

use super::{
    MicrophoneJson, PowerShellSurface, Result, Settings, StatusOutput, bind_mic, elevation, kv,
    kv_width, query,
};

pub(super) fn cmd_status(json: bool) -> Result<()> {
    let surface = PowerShellSurface::default();
    let settings = Settings::load();
    let devices = query::list_devices(&surface, settings.show_all_devices);
    let enabled_count = devices.iter().filter(|d| d.is_enabled()).count();

    // Microphone state is best-effort; a host without audio support just
    // reports no microphone.
    let microphone = match bind_mic(None) {
        Ok(Some(mic)) => Some(MicrophoneJson {
            volume_percent: mic.volume_percent(),
            muted: mic.muted(),
        }),
        Ok(None) => None,
        Err(e) => {
            log::warn!("microphone state unavailable: {e}");
            None
        }
    };

    if json {
        let output = StatusOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            elevated: elevation::is_elevated(),
            device_count: devices.len(),
            enabled_count,
            microphone,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    let w = kv_width(&["Version", "Elevated", "Cameras", "Microphone"]);
    kv("Version", env!("CARGO_PKG_VERSION"), w);
    kv(
        "Elevated",
        if elevation::is_elevated() {
            "yes"
        } else {
            "no (disable actions unavailable)"
        },
        w,
    );
    kv(
        "Cameras",
        format!("{} found, {} enabled", devices.len(), enabled_count),
        w,
    );
    match microphone {
        Some(mic) => kv(
            "Microphone",
            format!(
                "{}%{}",
                mic.volume_percent,
                if mic.muted { " (muted)" } else { "" }
            ),
            w,
        ),
        None => kv("Microphone", "not available", w),
    }

    Ok(())
}
