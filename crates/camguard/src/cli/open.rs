//! `open` subcommand — launch related Windows control surfaces.

use clap::ValueEnum;

use super::Result;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OpenTarget {
    /// Windows Device Manager
    DeviceManager,
    /// Camera privacy settings
    PrivacySettings,
    /// The built-in Camera app, for a quick functional test
    CameraApp,
}

impl OpenTarget {
    #[cfg(windows)]
    fn launch_arg(self) -> &'static str {
        match self {
            OpenTarget::DeviceManager => "devmgmt.msc",
            OpenTarget::PrivacySettings => "ms-settings:privacy-webcam",
            OpenTarget::CameraApp => "microsoft.windows.camera:",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OpenTarget::DeviceManager => "Device Manager",
            OpenTarget::PrivacySettings => "Camera privacy settings",
            OpenTarget::CameraApp => "the Camera app",
        }
    }
}

#[cfg(windows)]
pub(super) fn cmd_open(target: OpenTarget) -> Result<()> {
    std::process::Command::new("cmd")
        .args(["/C", "start", "", target.launch_arg()])
        .spawn()?;
    println!("Opened {}.", target.label());
    Ok(())
}

#[cfg(not(windows))]
pub(super) fn cmd_open(target: OpenTarget) -> Result<()> {
    Err(super::CamguardError::Config(format!(
        "opening {} is only available on Windows",
        target.label()
    )))
}
