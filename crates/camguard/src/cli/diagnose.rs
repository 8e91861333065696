//! `diagnose` subcommand — informational probes for a stubborn device.

use camguard_lib::device::{DeviceStatus, DeviceSurface};

use super::{PowerShellSurface, Result, elevation, resolve_target};

pub(super) fn cmd_diagnose(device: &str) -> Result<()> {
    let surface = PowerShellSurface::default();
    // Fall back to treating the selector as a raw instance id so a device
    // that no longer shows up in the listing can still be probed.
    let instance_id = match resolve_target(&surface, device) {
        Ok(target) => target.instance_id,
        Err(_) => device.to_string(),
    };

    println!("Diagnosis for {instance_id}");
    println!();

    // Probe 1 — device record
    println!("1. Device record");
    let mut status = None;
    match surface.query_instance(&instance_id) {
        Ok(raw) => {
            let line = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            let fields: Vec<&str> = line.trim().split('|').collect();
            if fields.len() >= 5 {
                println!("   Name:         {}", fields[0]);
                println!("   Status:       {}", fields[2]);
                println!("   Class:        {}", fields[3]);
                println!("   Present:      {}", fields[4]);
                if let Some(problem) = fields.get(5).filter(|p| !p.trim().is_empty()) {
                    println!("   Problem code: {}", problem.trim());
                }
                status = Some(DeviceStatus::from_raw(fields[2]));
            } else {
                println!("   Unexpected record shape: {line}");
            }
        }
        Err(e) => println!("   Device not found or query failed: {e}"),
    }
    println!();

    // Probe 2 — privileges
    println!("2. Privileges");
    if elevation::is_elevated() {
        println!("   Running elevated; enable and disable actions are available.");
    } else {
        println!("   Not elevated; disable actions will be rejected.");
    }
    println!();

    // Probe 3 — assessment
    println!("3. Assessment");
    match status {
        Some(DeviceStatus::Ok) => {
            println!("   Device is enabled; a disable action should apply.");
        }
        Some(DeviceStatus::Error) => {
            println!("   Device is already disabled; an enable action should apply.");
        }
        Some(DeviceStatus::Unknown(raw)) => {
            println!("   Unusual status \"{raw}\"; the driver or a policy may be interfering.");
        }
        None => println!("   Cannot assess without a device record."),
    }
    println!();
    println!("If state changes still fail, the device may be in use by another");
    println!("application, protected by security policy, or managed by your");
    println!("organization.");

    Ok(())
}
