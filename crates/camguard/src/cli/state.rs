//! `enable` / `disable` subcommands — single and bulk state changes.

use super::{
    CamguardError, PowerShellSurface, Result, Settings, StateChanger, elevation, query,
    resolve_target,
};

pub(super) fn cmd_enable(device: &str) -> Result<()> {
    let surface = PowerShellSurface::default();
    let target = resolve_target(&surface, device)?;
    let changer = StateChanger::default();

    println!("Enabling {}...", target.name);
    if changer.set_state(&surface, &target.instance_id, true) {
        println!("Enabled {}.", target.name);
        Ok(())
    } else {
        println!(
            "Failed to enable {} — all control methods failed. Try `camguard diagnose \"{}\"`.",
            target.name, target.instance_id
        );
        std::process::exit(1);
    }
}

pub(super) fn cmd_disable(device: &str, elevate: bool) -> Result<()> {
    let surface = PowerShellSurface::default();
    let changer = StateChanger::default();
    if !changer.can_disable() {
        return reject_unelevated(elevate);
    }
    let target = resolve_target(&surface, device)?;

    println!("Disabling {}...", target.name);
    if changer.set_state(&surface, &target.instance_id, false) {
        println!("Disabled {}. It is now unavailable to all applications.", target.name);
        Ok(())
    } else {
        println!(
            "Failed to disable {} — all control methods failed. Try `camguard diagnose \"{}\"`.",
            target.name, target.instance_id
        );
        std::process::exit(1);
    }
}

pub(super) fn cmd_enable_all(all: bool) -> Result<()> {
    let surface = PowerShellSurface::default();
    let settings = Settings::load();
    let devices = query::list_devices(&surface, all || settings.show_all_devices);
    if devices.is_empty() {
        println!("No camera devices found.");
        return Ok(());
    }

    let changer = StateChanger::default();
    let outcome = changer.enable_all(&surface, &devices);
    if outcome.attempted == 0 {
        println!("All camera devices are already enabled.");
    } else {
        println!(
            "Enabled {}/{} device{}.",
            outcome.succeeded,
            outcome.attempted,
            if outcome.attempted == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

pub(super) fn cmd_disable_all(all: bool, elevate: bool) -> Result<()> {
    let changer = StateChanger::default();
    if !changer.can_disable() {
        return reject_unelevated(elevate);
    }
    let surface = PowerShellSurface::default();
    let settings = Settings::load();
    let devices = query::list_devices(&surface, all || settings.show_all_devices);
    if devices.is_empty() {
        println!("No camera devices found.");
        return Ok(());
    }

    let outcome = changer.disable_all(&surface, &devices);
    if outcome.attempted == 0 {
        println!("All camera devices are already disabled.");
    } else {
        println!(
            "Disabled {}/{} device{}.",
            outcome.succeeded,
            outcome.attempted,
            if outcome.attempted == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

/// Privilege errors are rejected before any control method runs.
fn reject_unelevated(elevate: bool) -> Result<()> {
    if elevate {
        elevation::relaunch_elevated()?;
        println!("Requested elevation; approve the prompt to continue in the new window.");
        Ok(())
    } else {
        Err(CamguardError::Config(
            "disabling devices requires an elevated process (re-run with --elevate or from an \
             elevated shell)"
                .into(),
        ))
    }
}
