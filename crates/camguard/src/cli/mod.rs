//! CLI subcommands — device listing, state changes, audio control.

mod config_cmd;
mod devices;
mod diagnose;
mod lock_cmd;
mod open;
mod state;
mod status;
mod volume;
mod watch;

use clap::Subcommand;
use serde::Serialize;

pub use open::OpenTarget;

pub(super) use crate::RUNNING;
pub(super) use camguard_lib::audio::{self, EndpointState, MicController};
pub(super) use camguard_lib::config::Settings;
pub(super) use camguard_lib::device::{DeviceSurface, PnpDevice, PowerShellSurface};
pub(super) use camguard_lib::elevation;
pub(super) use camguard_lib::error::{CamguardError, Result};
pub(super) use camguard_lib::lock::{LockConfig, VolumeLock};
pub(super) use camguard_lib::query;
pub(super) use camguard_lib::strategy::StateChanger;

#[derive(Subcommand)]
pub enum Command {
    /// List camera devices and their state
    Devices {
        /// Include all imaging device classes, not just cameras
        #[arg(long)]
        all: bool,
    },
    /// Enable a device (instance id or 1-based index from `devices`)
    Enable {
        device: String,
    },
    /// Disable a device (requires an elevated process)
    Disable {
        device: String,
        /// Relaunch elevated if this process lacks the privilege
        #[arg(long)]
        elevate: bool,
    },
    /// Enable every disabled camera device
    EnableAll {
        /// Include all imaging device classes
        #[arg(long)]
        all: bool,
    },
    /// Disable every enabled camera device (requires elevation)
    DisableAll {
        /// Include all imaging device classes
        #[arg(long)]
        all: bool,
        /// Relaunch elevated if this process lacks the privilege
        #[arg(long)]
        elevate: bool,
    },
    /// List capture endpoints
    Endpoints {
        /// Include disabled and unplugged endpoints
        #[arg(long)]
        all: bool,
    },
    /// Read or set the microphone volume (percent)
    Volume {
        level: Option<u8>,
        /// Endpoint id to control instead of the default microphone
        #[arg(long)]
        device: Option<String>,
    },
    /// Mute the microphone
    Mute {
        /// Endpoint id to control instead of the default microphone
        #[arg(long)]
        device: Option<String>,
    },
    /// Unmute the microphone
    Unmute {
        /// Endpoint id to control instead of the default microphone
        #[arg(long)]
        device: Option<String>,
    },
    /// Hold the microphone volume at a target level until interrupted
    Lock {
        target: u8,
        /// Endpoint id to control instead of the default microphone
        #[arg(long)]
        device: Option<String>,
    },
    /// Watch the device list, re-scanning on an interval
    Watch {
        /// Seconds between scans (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
        /// Include all imaging device classes
        #[arg(long)]
        all: bool,
    },
    /// Run diagnostic probes against one device
    Diagnose {
        device: String,
    },
    /// Show overall device and microphone state
    Status,
    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Open a related Windows control surface
    Open {
        #[arg(value_enum)]
        target: OpenTarget,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the settings file location and current values
    Show,
    /// Change one setting: auto-refresh, refresh-interval,
    /// show-all-devices, notifications
    Set { key: String, value: String },
}

pub fn run(command: Command, json: bool) -> Result<()> {
    match command {
        Command::Devices { all } => devices::cmd_devices(all, json),
        Command::Enable { device } => state::cmd_enable(&device),
        Command::Disable { device, elevate } => state::cmd_disable(&device, elevate),
        Command::EnableAll { all } => state::cmd_enable_all(all),
        Command::DisableAll { all, elevate } => state::cmd_disable_all(all, elevate),
        Command::Endpoints { all } => volume::cmd_endpoints(all, json),
        Command::Volume { level, device } => volume::cmd_volume(level, device.as_deref()),
        Command::Mute { device } => volume::cmd_mute(true, device.as_deref()),
        Command::Unmute { device } => volume::cmd_mute(false, device.as_deref()),
        Command::Lock { target, device } => lock_cmd::cmd_lock(target, device.as_deref()),
        Command::Watch { interval, all } => watch::cmd_watch(interval, all),
        Command::Diagnose { device } => diagnose::cmd_diagnose(&device),
        Command::Status => status::cmd_status(json),
        Command::Config { action } => config_cmd::cmd_config(action, json),
        Command::Open { target } => open::cmd_open(target),
    }
}

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
pub(super) fn kv_width(keys: &[&str]) -> usize {
    keys.iter().map(|k| k.len()).max().unwrap_or(0) + PADDING
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

/// Status text the way a user reads it, not the raw report.
pub(super) fn status_label(device: &PnpDevice) -> String {
    use camguard_lib::device::DeviceStatus;
    match &device.status {
        DeviceStatus::Ok => "Enabled".to_string(),
        DeviceStatus::Error => "Disabled".to_string(),
        DeviceStatus::Unknown(raw) => raw.clone(),
    }
}

/// Resolve a device selector: a 1-based index into the current scan or an
/// exact instance id.
pub(super) fn resolve_target(surface: &dyn DeviceSurface, selector: &str) -> Result<PnpDevice> {
    let devices = query::list_devices(surface, true);
    if devices.is_empty() {
        return Err(CamguardError::Config(
            "no camera devices found (or the device query failed)".into(),
        ));
    }
    if let Ok(index) = selector.parse::<usize>() {
        if (1..=devices.len()).contains(&index) {
            return Ok(devices[index - 1].clone());
        }
        return Err(CamguardError::Config(format!(
            "device index {index} is out of range (1-{})",
            devices.len()
        )));
    }
    devices
        .iter()
        .find(|d| d.instance_id.eq_ignore_ascii_case(selector))
        .cloned()
        .ok_or_else(|| {
            CamguardError::Config(format!("no device with instance id \"{selector}\""))
        })
}

/// Bind a microphone controller to the default capture endpoint or a
/// specific endpoint id. `Ok(None)` means the host has no usable default.
pub(super) fn bind_mic(
    device: Option<&str>,
) -> Result<Option<MicController<audio::PlatformEndpoints>>> {
    audio::com_init()?;
    let platform = audio::platform_endpoints()?;
    let mut mic = MicController::new(platform);
    match device {
        Some(id) => {
            if !mic.switch_to(id) {
                return Err(CamguardError::Config(format!(
                    "could not bind endpoint \"{id}\" (see `camguard endpoints`)"
                )));
            }
            Ok(Some(mic))
        }
        None => {
            if mic.bind_default() {
                Ok(Some(mic))
            } else {
                Ok(None)
            }
        }
    }
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct DevicesOutput {
    pub count: usize,
    pub query_failed: bool,
    pub devices: Vec<PnpDevice>,
}

#[derive(Serialize)]
pub(super) struct EndpointRow {
    pub name: String,
    pub id: String,
    pub state: EndpointState,
}

#[derive(Serialize)]
pub(super) struct EndpointsOutput {
    pub count: usize,
    pub endpoints: Vec<EndpointRow>,
}

#[derive(Serialize)]
pub(super) struct MicrophoneJson {
    pub volume_percent: u8,
    pub muted: bool,
}

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub elevated: bool,
    pub device_count: usize,
    pub enabled_count: usize,
    pub microphone: Option<MicrophoneJson>,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub settings_file: Option<String>,
    pub settings_file_exists: bool,
    pub settings: Settings,
}
