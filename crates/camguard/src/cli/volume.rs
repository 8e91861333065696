//! `endpoints` / `volume` / `mute` subcommands — capture endpoint control.

use camguard_lib::device::DeviceSurface;

use super::{
    CamguardError, EndpointRow, EndpointsOutput, MicController, PowerShellSurface, Result, audio,
    bind_mic,
};

/// Secondary endpoint names from the device listing, used when the
/// property store has no usable label.
fn pnp_endpoint_names(surface: &PowerShellSurface) -> Vec<String> {
    match surface.query_audio_endpoint_names() {
        Ok(raw) => raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            log::debug!("audio endpoint name listing failed: {e}");
            Vec::new()
        }
    }
}

pub(super) fn cmd_endpoints(all: bool, json: bool) -> Result<()> {
    audio::com_init()?;
    let mic = MicController::new(audio::platform_endpoints()?);
    let endpoints = mic.endpoints(all);
    let pnp_names = pnp_endpoint_names(&PowerShellSurface::default());

    let rows: Vec<EndpointRow> = endpoints
        .iter()
        .enumerate()
        .map(|(i, d)| EndpointRow {
            name: audio::display_name(d, i, &pnp_names),
            id: d.id.clone(),
            state: d.state,
        })
        .collect();

    if json {
        let output = EndpointsOutput {
            count: rows.len(),
            endpoints: rows,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    if rows.is_empty() {
        println!("No capture endpoints found.");
        return Ok(());
    }

    println!(
        "Found {} capture endpoint{}:",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    );
    println!();
    for (i, row) in rows.iter().enumerate() {
        println!("  [{}] {} ({})", i + 1, row.name, row.state);
        println!("      {}", row.id);
    }
    Ok(())
}

pub(super) fn cmd_volume(level: Option<u8>, device: Option<&str>) -> Result<()> {
    if let Some(percent) = level
        && percent > 100
    {
        return Err(CamguardError::Config(
            "volume must be between 0 and 100".into(),
        ));
    }

    let Some(mic) = bind_mic(device)? else {
        println!("No capture endpoint available.");
        return Ok(());
    };

    match level {
        None => {
            let muted = if mic.muted() { " (muted)" } else { "" };
            println!("Volume: {}%{}", mic.volume_percent(), muted);
            Ok(())
        }
        Some(percent) => {
            if mic.set_volume_percent(percent) {
                println!("Volume set to {percent}%.");
                Ok(())
            } else {
                println!("Could not set the volume; the endpoint rejected the change.");
                std::process::exit(1);
            }
        }
    }
}

pub(super) fn cmd_mute(muted: bool, device: Option<&str>) -> Result<()> {
    let Some(mic) = bind_mic(device)? else {
        println!("No capture endpoint available.");
        return Ok(());
    };

    if mic.set_muted(muted) {
        println!(
            "Microphone {}.",
            if muted { "muted" } else { "unmuted" }
        );
        Ok(())
    } else {
        println!("Could not change the mute state.");
        std::process::exit(1);
    }
}
