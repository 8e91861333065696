//! `devices` subcommand — list camera devices.

use super::{DevicesOutput, PowerShellSurface, Result, Settings, query, status_label};

pub(super) fn cmd_devices(all: bool, json: bool) -> Result<()> {
    let surface = PowerShellSurface::default();
    let settings = Settings::load();
    let include_all = all || settings.show_all_devices;

    let (devices, query_failed) = match query::scan(&surface, include_all) {
        Ok(devices) => (devices, false),
        Err(e) => {
            log::warn!("device query failed: {e}");
            (Vec::new(), true)
        }
    };

    if json {
        let output = DevicesOutput {
            count: devices.len(),
            query_failed,
            devices,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    if devices.is_empty() {
        if query_failed {
            println!("No camera devices found. (The device query itself failed; see logs.)");
        } else {
            println!("No camera devices found.");
        }
        return Ok(());
    }

    println!(
        "Found {} camera device{}:",
        devices.len(),
        if devices.len() == 1 { "" } else { "s" }
    );
    println!();

    for (i, device) in devices.iter().enumerate() {
        let presence = if device.present { "" } else { " (not present)" };
        println!(
            "  [{}] {} — {}{} [{}]",
            i + 1,
            device.name,
            status_label(device),
            presence,
            device.class
        );
        println!("      {}", device.instance_id);
    }

    Ok(())
}
