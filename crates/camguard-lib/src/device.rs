//! Device control surface — trait + PowerShell backend.
//!
//! Camera and imaging hardware is queried and toggled through Windows
//! Plug-and-Play tooling invoked out of process. Every call returns
//! delimited text; a non-zero exit, a timeout, or unparsable output is a
//! [`SurfaceError`] contained at this boundary, never a panic.

use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::Serialize;

// ── Error type ──

/// Device control surface errors.
///
/// String payloads follow the convention **"context: details"** where
/// *context* identifies the failing step (e.g. `"spawn"`, `"wait"`).
#[derive(Debug)]
pub enum SurfaceError {
    /// The external process could not be started.
    Spawn(String),
    /// The call exceeded its time budget and was killed.
    Timeout(Duration),
    /// The process exited with a non-zero status.
    Exit { code: Option<i32>, detail: String },
    /// The output did not have the expected shape.
    Parse(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Spawn(e) => write!(f, "Failed to run device tooling: {e}"),
            SurfaceError::Timeout(d) => write!(f, "Device call timed out after {d:?}"),
            SurfaceError::Exit { code: Some(c), detail } => {
                write!(f, "Device call exited with code {c}: {detail}")
            }
            SurfaceError::Exit { code: None, detail } => {
                write!(f, "Device call was terminated: {detail}")
            }
            SurfaceError::Parse(e) => write!(f, "Unexpected device output: {e}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

pub type Result<T> = std::result::Result<T, SurfaceError>;

// ── Device model ──

/// Plug-and-Play device class a device was discovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceClass {
    Camera,
    Image,
    Usb,
}

impl DeviceClass {
    /// Class name as understood by the device tooling.
    pub fn query_name(&self) -> &'static str {
        match self {
            DeviceClass::Camera => "Camera",
            DeviceClass::Image => "Image",
            DeviceClass::Usb => "USB",
        }
    }

    /// Parse a class tag from listing output. Unknown tags fall back to
    /// [`DeviceClass::Usb`], the bucket used for name-pattern matches.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Camera" => DeviceClass::Camera,
            "Image" => DeviceClass::Image,
            _ => DeviceClass::Usb,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_name())
    }
}

/// Reported device status. `OK` means enabled and functioning, `Error`
/// means disabled or faulted; anything else is carried through raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeviceStatus {
    Ok,
    Error,
    Unknown(String),
}

impl DeviceStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "OK" => DeviceStatus::Ok,
            "Error" => DeviceStatus::Error,
            other => DeviceStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, DeviceStatus::Ok)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Ok => f.write_str("OK"),
            DeviceStatus::Error => f.write_str("Error"),
            DeviceStatus::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// One camera/imaging device as reported by the control surface.
///
/// Immutable once constructed; a new snapshot replaces the whole
/// collection. `instance_id` is the only stable identity key.
#[derive(Debug, Clone, Serialize)]
pub struct PnpDevice {
    pub name: String,
    pub instance_id: String,
    pub status: DeviceStatus,
    pub class: DeviceClass,
    pub present: bool,
}

impl PnpDevice {
    pub fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }
}

// ── Trait ──

/// Out-of-process device control surface.
///
/// Listing methods return one `Name|InstanceId|Status|Class|Present` line
/// per device (see the `query` module for parsing). Action methods carry
/// their own result shape. Implementations must contain all failures as
/// [`SurfaceError`] values.
pub trait DeviceSurface {
    /// List devices of one device class.
    fn query_class(&self, class: DeviceClass) -> Result<String>;

    /// List devices whose friendly name looks like a camera
    /// (camera/webcam/video) while excluding audio devices.
    fn query_name_matches(&self) -> Result<String>;

    /// Detail line for one exact instance:
    /// `Name|InstanceId|Status|Class|Present|ProblemCode`.
    fn query_instance(&self, instance_id: &str) -> Result<String>;

    /// Friendly names of healthy audio endpoint devices, one per line,
    /// in enumeration order.
    fn query_audio_endpoint_names(&self) -> Result<String>;

    /// Enable or disable one exact instance. Fails if the instance does
    /// not exist. Returns the post-settle status, which is informational
    /// only — the action itself succeeding is the success signal.
    fn set_instance_state(&self, instance_id: &str, enable: bool) -> Result<String>;

    /// Enable or disable every device whose instance id contains
    /// `pattern`. Returns the number of matching devices; per-device
    /// action failures are reported in-band and logged, not surfaced.
    fn set_pattern_state(&self, pattern: &str, enable: bool) -> Result<usize>;

    /// Enable or disable via the management-object API. Returns the raw
    /// numeric result code (0 = success).
    fn set_object_state(&self, instance_id: &str, enable: bool) -> Result<i32>;
}

// ── Process runner ──

/// Poll interval while waiting for an external call to finish.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Run an external command with a deadline, capturing stdout.
///
/// Kills the process if it exceeds the deadline. Device listings stay well
/// below the pipe buffer, so output is drained after exit without a reader
/// thread.
pub(crate) fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<String> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SurfaceError::Spawn(format!("spawn: {e}")))?;

    let max_polls = (timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1) as u64;
    let mut exit = None;
    for _ in 0..max_polls {
        match child.try_wait() {
            Ok(Some(status)) => {
                exit = Some(status);
                break;
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(SurfaceError::Spawn(format!("wait: {e}"))),
        }
    }
    let Some(status) = exit else {
        log::warn!("external device call timed out after {timeout:?}, killing");
        let _ = child.kill();
        let _ = child.wait(); // reap zombie
        return Err(SurfaceError::Timeout(timeout));
    };

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout);
    }
    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut err) = child.stderr.take() {
            let _ = err.read_to_string(&mut stderr);
        }
        let detail = first_line(&stderr)
            .or_else(|| first_line(&stdout))
            .unwrap_or_default();
        return Err(SurfaceError::Exit {
            code: status.code(),
            detail,
        });
    }
    Ok(stdout)
}

// ── PowerShell backend ──

/// Escape a value for embedding in a single-quoted PowerShell literal.
pub fn ps_quote(value: &str) -> String {
    value.trim().replace('\'', "''")
}

/// Last non-empty output line parsed as a number.
fn trailing_number(stdout: &str) -> Option<i64> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .and_then(|l| l.parse::<i64>().ok())
}

fn action_verb(enable: bool) -> &'static str {
    if enable { "Enable-PnpDevice" } else { "Disable-PnpDevice" }
}

/// Device control surface backed by out-of-process PowerShell calls.
#[derive(Debug, Clone)]
pub struct PowerShellSurface {
    query_timeout: Duration,
    action_timeout: Duration,
}

impl Default for PowerShellSurface {
    fn default() -> Self {
        PowerShellSurface {
            query_timeout: Duration::from_secs(15),
            action_timeout: Duration::from_secs(30),
        }
    }
}

impl PowerShellSurface {
    pub fn new(query_timeout: Duration, action_timeout: Duration) -> Self {
        PowerShellSurface {
            query_timeout,
            action_timeout,
        }
    }

    fn command() -> Command {
        let mut cmd = Command::new("powershell");
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        cmd.args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"]);
        cmd
    }

    fn run(&self, script: &str, timeout: Duration) -> Result<String> {
        let mut cmd = Self::command();
        cmd.arg(script);
        run_with_timeout(&mut cmd, timeout)
    }
}

/// Seconds to wait for a device status to settle after a state change.
const SETTLE_SECS: u32 = 1;

impl DeviceSurface for PowerShellSurface {
    fn query_class(&self, class: DeviceClass) -> Result<String> {
        let script = format!(
            "Get-PnpDevice -Class {} | ForEach-Object {{ \
             \"$($_.FriendlyName)|$($_.InstanceId)|$($_.Status)|{}|$($_.Present)\" }}",
            class.query_name(),
            class.query_name(),
        );
        self.run(&script, self.query_timeout)
    }

    fn query_name_matches(&self) -> Result<String> {
        let script = "Get-PnpDevice | Where-Object { \
             ($_.FriendlyName -like '*camera*' -or \
              $_.FriendlyName -like '*webcam*' -or \
              $_.FriendlyName -like '*video*') -and \
             $_.FriendlyName -notlike '*audio*' } | ForEach-Object { \
             \"$($_.FriendlyName)|$($_.InstanceId)|$($_.Status)|USB|$($_.Present)\" }";
        self.run(script, self.query_timeout)
    }

    fn query_instance(&self, instance_id: &str) -> Result<String> {
        let script = format!(
            "$d = Get-PnpDevice -InstanceId '{}' -ErrorAction Stop\n\
             \"$($d.FriendlyName)|$($d.InstanceId)|$($d.Status)|$($d.Class)|$($d.Present)|$($d.ProblemCode)\"",
            ps_quote(instance_id),
        );
        self.run(&script, self.query_timeout)
    }

    fn query_audio_endpoint_names(&self) -> Result<String> {
        let script = "Get-PnpDevice -Class AudioEndpoint | \
             Where-Object { $_.Status -eq 'OK' } | \
             ForEach-Object { \"$($_.FriendlyName)\" }";
        self.run(script, self.query_timeout)
    }

    fn set_instance_state(&self, instance_id: &str, enable: bool) -> Result<String> {
        let script = format!(
            "$ErrorActionPreference = 'Stop'\n\
             $id = '{id}'\n\
             $d = Get-PnpDevice -InstanceId $id -ErrorAction SilentlyContinue\n\
             if (-not $d) {{ Write-Error \"device not found: $id\"; exit 1 }}\n\
             {verb} -InstanceId $id -Confirm:$false\n\
             Start-Sleep -Seconds {settle}\n\
             (Get-PnpDevice -InstanceId $id).Status",
            id = ps_quote(instance_id),
            verb = action_verb(enable),
            settle = SETTLE_SECS,
        );
        let stdout = self.run(&script, self.action_timeout)?;
        Ok(first_line(&stdout).unwrap_or_default())
    }

    fn set_pattern_state(&self, pattern: &str, enable: bool) -> Result<usize> {
        let script = format!(
            "$ErrorActionPreference = 'Stop'\n\
             $pattern = '{pattern}'\n\
             $found = @(Get-PnpDevice | Where-Object {{ $_.InstanceId.Contains($pattern) }})\n\
             foreach ($d in $found) {{\n\
               try {{ {verb} -InstanceId $d.InstanceId -Confirm:$false }}\n\
               catch {{ Write-Host \"SKIP $($d.InstanceId): $($_.Exception.Message)\" }}\n\
             }}\n\
             $found.Count",
            pattern = ps_quote(pattern),
            verb = action_verb(enable),
        );
        let stdout = self.run(&script, self.action_timeout)?;
        for line in stdout.lines().filter(|l| l.trim_start().starts_with("SKIP")) {
            log::debug!("pattern action partial failure: {}", line.trim());
        }
        trailing_number(&stdout)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| SurfaceError::Parse("missing match count".into()))
    }

    fn set_object_state(&self, instance_id: &str, enable: bool) -> Result<i32> {
        let method = if enable { "Enable" } else { "Disable" };
        let script = format!(
            "$ErrorActionPreference = 'Stop'\n\
             $id = '{id}'\n\
             $d = Get-WmiObject -Class Win32_PnPEntity | Where-Object {{ $_.DeviceID -eq $id }}\n\
             if (-not $d) {{ Write-Error \"device not found: $id\"; exit 1 }}\n\
             $r = $d.{method}()\n\
             $r.ReturnValue",
            id = ps_quote(instance_id),
            method = method,
        );
        let stdout = self.run(&script, self.action_timeout)?;
        trailing_number(&stdout)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| SurfaceError::Parse("missing result code".into()))
    }
}

// ── Mock surface for testing ──

/// Scriptable [`DeviceSurface`] for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory surface. Listing output is canned per query; action
    /// calls pop scripted responses and record their arguments.
    #[derive(Default)]
    pub struct MockSurface {
        /// Canned listing output per device class.
        pub class_output: RefCell<HashMap<DeviceClass, String>>,
        /// Canned name-pattern listing output.
        pub name_match_output: RefCell<String>,
        /// Canned detail line per instance id.
        pub instance_details: RefCell<HashMap<String, String>>,
        /// Canned audio endpoint name listing.
        pub audio_names: RefCell<String>,
        /// If true, every query method fails.
        pub fail_queries: Cell<bool>,

        /// Scripted responses, consumed front to back. An exhausted queue
        /// yields an error, mirroring an unreachable surface.
        pub instance_queue: RefCell<Vec<std::result::Result<String, String>>>,
        pub pattern_queue: RefCell<Vec<std::result::Result<usize, String>>>,
        pub object_queue: RefCell<Vec<std::result::Result<i32, String>>>,

        /// Recorded action calls: (instance id or pattern, enable).
        pub instance_calls: RefCell<Vec<(String, bool)>>,
        pub pattern_calls: RefCell<Vec<(String, bool)>>,
        pub object_calls: RefCell<Vec<(String, bool)>>,
    }

    impl MockSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_class_output(&self, class: DeviceClass, output: &str) {
            self.class_output
                .borrow_mut()
                .insert(class, output.to_string());
        }

        pub fn push_instance_response(&self, response: std::result::Result<String, String>) {
            self.instance_queue.borrow_mut().push(response);
        }

        pub fn push_pattern_response(&self, response: std::result::Result<usize, String>) {
            self.pattern_queue.borrow_mut().push(response);
        }

        pub fn push_object_response(&self, response: std::result::Result<i32, String>) {
            self.object_queue.borrow_mut().push(response);
        }

        fn pop<T>(queue: &RefCell<Vec<std::result::Result<T, String>>>) -> Result<T> {
            let mut queue = queue.borrow_mut();
            if queue.is_empty() {
                return Err(SurfaceError::Spawn("mock: no scripted response".into()));
            }
            queue.remove(0).map_err(SurfaceError::Spawn)
        }

        fn check_queries(&self) -> Result<()> {
            if self.fail_queries.get() {
                Err(SurfaceError::Spawn("mock: query failure injected".into()))
            } else {
                Ok(())
            }
        }
    }

    impl DeviceSurface for MockSurface {
        fn query_class(&self, class: DeviceClass) -> Result<String> {
            self.check_queries()?;
            Ok(self
                .class_output
                .borrow()
                .get(&class)
                .cloned()
                .unwrap_or_default())
        }

        fn query_name_matches(&self) -> Result<String> {
            self.check_queries()?;
            Ok(self.name_match_output.borrow().clone())
        }

        fn query_instance(&self, instance_id: &str) -> Result<String> {
            self.check_queries()?;
            self.instance_details
                .borrow()
                .get(instance_id)
                .cloned()
                .ok_or_else(|| SurfaceError::Exit {
                    code: Some(1),
                    detail: format!("device not found: {instance_id}"),
                })
        }

        fn query_audio_endpoint_names(&self) -> Result<String> {
            self.check_queries()?;
            Ok(self.audio_names.borrow().clone())
        }

        fn set_instance_state(&self, instance_id: &str, enable: bool) -> Result<String> {
            self.instance_calls
                .borrow_mut()
                .push((instance_id.to_string(), enable));
            Self::pop(&self.instance_queue)
        }

        fn set_pattern_state(&self, pattern: &str, enable: bool) -> Result<usize> {
            self.pattern_calls
                .borrow_mut()
                .push((pattern.to_string(), enable));
            Self::pop(&self.pattern_queue)
        }

        fn set_object_state(&self, instance_id: &str, enable: bool) -> Result<i32> {
            self.object_calls
                .borrow_mut()
                .push((instance_id.to_string(), enable));
            Self::pop(&self.object_queue)
        }
    }
}
