//! Device state changes — ordered strategy cascade over the control surface.
//!
//! No single device-control entry point is reliable across hardware
//! vendors and driver models, so a state change tries several independent
//! methods in order and stops at the first that reports success. The
//! strategies are separate attempts at the same goal, not stages of a
//! pipeline.

use std::time::Duration;

use crate::device::{DeviceSurface, PnpDevice};
use crate::elevation;

/// Derive the coarse hardware-id pattern for a device instance:
/// the first two `\`-separated segments (vendor/product identity,
/// dropping the serial/instance suffix).
pub fn hardware_pattern(instance_id: &str) -> String {
    let mut segments = instance_id.splitn(3, '\\');
    match (segments.next(), segments.next()) {
        (Some(bus), Some(ids)) => format!("{bus}\\{ids}"),
        _ => instance_id.to_string(),
    }
}

/// One independent method of applying an enable/disable action.
///
/// An attempt must contain every failure — surface errors, timeouts,
/// unexpected output — and report it as `false`; the cascade never sees a
/// panic or an error value from a strategy.
pub trait StateStrategy {
    fn name(&self) -> &'static str;
    fn attempt(&self, surface: &dyn DeviceSurface, instance_id: &str, enable: bool) -> bool;
}

/// Act on the exact device instance. Fails when the instance does not
/// exist; otherwise the action call itself succeeding is the success
/// signal — the post-settle status is logged for the record only.
pub struct DirectInstance;

impl StateStrategy for DirectInstance {
    fn name(&self) -> &'static str {
        "direct instance"
    }

    fn attempt(&self, surface: &dyn DeviceSurface, instance_id: &str, enable: bool) -> bool {
        match surface.set_instance_state(instance_id, enable) {
            Ok(status) => {
                log::debug!("{instance_id}: settled status after action: {status}");
                true
            }
            Err(e) => {
                log::debug!("direct instance method failed for {instance_id}: {e}");
                false
            }
        }
    }
}

/// Act on every device matching the coarse hardware-id pattern. Succeeds
/// when at least one device matched, regardless of per-device outcomes.
pub struct HardwareIdPattern;

impl StateStrategy for HardwareIdPattern {
    fn name(&self) -> &'static str {
        "hardware-id pattern"
    }

    fn attempt(&self, surface: &dyn DeviceSurface, instance_id: &str, enable: bool) -> bool {
        let pattern = hardware_pattern(instance_id);
        match surface.set_pattern_state(&pattern, enable) {
            Ok(0) => {
                log::debug!("no devices matched pattern {pattern}");
                false
            }
            Ok(matched) => {
                log::debug!("pattern {pattern} matched {matched} device(s)");
                true
            }
            Err(e) => {
                log::debug!("pattern method failed for {pattern}: {e}");
                false
            }
        }
    }
}

/// Act through the management-object API and trust its numeric result
/// code: only an exact 0 counts as success.
pub struct ManagementObject;

impl StateStrategy for ManagementObject {
    fn name(&self) -> &'static str {
        "management object"
    }

    fn attempt(&self, surface: &dyn DeviceSurface, instance_id: &str, enable: bool) -> bool {
        match surface.set_object_state(instance_id, enable) {
            Ok(0) => true,
            Ok(code) => {
                log::debug!("management object method returned code {code} for {instance_id}");
                false
            }
            Err(e) => {
                log::debug!("management object method failed for {instance_id}: {e}");
                false
            }
        }
    }
}

/// Outcome of a bulk enable/disable run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub attempted: usize,
}

/// Knobs for bulk operations.
#[derive(Debug, Clone)]
pub struct ChangerConfig {
    /// Pause between consecutive device operations, giving the device
    /// stack room to settle.
    pub bulk_delay: Duration,
}

impl Default for ChangerConfig {
    fn default() -> Self {
        ChangerConfig {
            bulk_delay: Duration::from_secs(1),
        }
    }
}

/// Applies enable/disable actions through the strategy cascade.
pub struct StateChanger {
    strategies: Vec<Box<dyn StateStrategy>>,
    config: ChangerConfig,
}

impl Default for StateChanger {
    fn default() -> Self {
        Self::with_config(ChangerConfig::default())
    }
}

impl StateChanger {
    /// Standard cascade: direct instance → hardware-id pattern →
    /// management object.
    pub fn with_config(config: ChangerConfig) -> Self {
        StateChanger {
            strategies: vec![
                Box::new(DirectInstance),
                Box::new(HardwareIdPattern),
                Box::new(ManagementObject),
            ],
            config,
        }
    }

    /// Custom strategy list, in attempt order.
    pub fn new(strategies: Vec<Box<dyn StateStrategy>>, config: ChangerConfig) -> Self {
        StateChanger { strategies, config }
    }

    /// Whether this process may disable devices. Disabling requires an
    /// elevated process; enabling never does.
    pub fn can_disable(&self) -> bool {
        elevation::is_elevated()
    }

    /// Apply one state change. Returns `true` as soon as any strategy
    /// succeeds; `false` once the cascade is exhausted.
    pub fn set_state(&self, surface: &dyn DeviceSurface, instance_id: &str, enable: bool) -> bool {
        let action = if enable { "enable" } else { "disable" };
        for strategy in &self.strategies {
            log::debug!("trying {} method to {action} {instance_id}", strategy.name());
            if strategy.attempt(surface, instance_id, enable) {
                log::info!("{action} via {} method: {instance_id}", strategy.name());
                return true;
            }
        }
        log::warn!("all methods failed to {action} {instance_id}");
        false
    }

    /// Enable every device in the snapshot that is not already enabled.
    pub fn enable_all(&self, surface: &dyn DeviceSurface, devices: &[PnpDevice]) -> BulkOutcome {
        self.set_all(surface, devices, true)
    }

    /// Disable every device in the snapshot that is not already disabled.
    pub fn disable_all(&self, surface: &dyn DeviceSurface, devices: &[PnpDevice]) -> BulkOutcome {
        self.set_all(surface, devices, false)
    }

    fn set_all(
        &self,
        surface: &dyn DeviceSurface,
        devices: &[PnpDevice],
        enable: bool,
    ) -> BulkOutcome {
        let targets: Vec<&PnpDevice> = devices
            .iter()
            .filter(|d| d.is_enabled() != enable)
            .collect();
        let mut succeeded = 0;
        for (i, device) in targets.iter().enumerate() {
            if self.set_state(surface, &device.instance_id, enable) {
                succeeded += 1;
            }
            if i + 1 < targets.len() {
                std::thread::sleep(self.config.bulk_delay);
            }
        }
        BulkOutcome {
            succeeded,
            attempted: targets.len(),
        }
    }
}
