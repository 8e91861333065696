//! Volume lock — corrective polling loop that resists external drift.
//!
//! While locked, a background task periodically compares the live volume
//! to the target and re-asserts the target when the difference exceeds a
//! tolerance. The tolerance absorbs rounding noise from the scalar↔percent
//! conversion so the loop does not oscillate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::audio::CaptureControl;

/// Knobs for the lock loop.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Interval between drift checks while locked.
    pub poll_interval: Duration,
    /// Longer interval used after a read/write error.
    pub error_backoff: Duration,
    /// Maximum tolerated drift in percentage points.
    pub tolerance: u8,
}

impl Default for LockConfig {
    fn default() -> Self {
        LockConfig {
            poll_interval: Duration::from_secs(2),
            error_backoff: Duration::from_secs(5),
            tolerance: 5,
        }
    }
}

/// Decision after one drift check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    /// Re-assert the target volume.
    Correct,
    /// Within tolerance — leave the volume alone.
    Hold,
}

/// Pure drift decision core, decoupled from I/O and timing.
#[derive(Debug, Clone, Copy)]
pub struct DriftGuard {
    target: u8,
    tolerance: u8,
}

impl DriftGuard {
    pub fn new(target: u8, tolerance: u8) -> Self {
        DriftGuard {
            target: target.min(100),
            tolerance,
        }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    /// Evaluate one volume reading (percent).
    pub fn evaluate(&self, current: u8) -> LockAction {
        let drift = current.abs_diff(self.target);
        if drift > self.tolerance {
            LockAction::Correct
        } else {
            LockAction::Hold
        }
    }
}

/// Background corrective loop holding a volume at a target level.
///
/// `stop` is cooperative: the polling task observes it on its next wake,
/// so a correction may still fire up to one poll interval after the call.
pub struct VolumeLock {
    locked: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    target: Option<u8>,
}

impl Default for VolumeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeLock {
    pub fn new() -> Self {
        VolumeLock {
            locked: Arc::new(AtomicBool::new(false)),
            handle: None,
            target: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    pub fn target(&self) -> Option<u8> {
        self.target
    }

    /// Start holding `target` (percent) on the given control. Returns
    /// `false` if a lock is already running.
    pub fn start(
        &mut self,
        target: u8,
        control: Arc<dyn CaptureControl>,
        config: LockConfig,
    ) -> bool {
        if self.is_locked() {
            return false;
        }
        let guard = DriftGuard::new(target, config.tolerance);
        self.target = Some(guard.target());
        self.locked.store(true, Ordering::SeqCst);

        let locked = Arc::clone(&self.locked);
        self.handle = Some(std::thread::spawn(move || {
            run_lock_loop(&guard, control.as_ref(), &locked, &config);
        }));
        true
    }

    /// Release the lock. The loop exits on its next wake.
    pub fn stop(&mut self) {
        self.locked.store(false, Ordering::SeqCst);
        self.target = None;
    }

    /// Release the lock and wait for the loop to exit (bounded by one
    /// poll interval).
    pub fn stop_and_join(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for VolumeLock {
    fn drop(&mut self) {
        self.locked.store(false, Ordering::SeqCst);
    }
}

fn run_lock_loop(
    guard: &DriftGuard,
    control: &dyn CaptureControl,
    locked: &AtomicBool,
    config: &LockConfig,
) {
    while locked.load(Ordering::SeqCst) {
        let pause = match control.volume() {
            Ok(scalar) => {
                let current = (scalar * 100.0).round() as u8;
                match guard.evaluate(current) {
                    LockAction::Correct => {
                        log::info!("volume drifted to {current}%, correcting to {}%", guard.target());
                        let target_scalar = f32::from(guard.target()) / 100.0;
                        match control.set_volume(target_scalar) {
                            Ok(()) => config.poll_interval,
                            Err(e) => {
                                log::warn!("volume correction failed: {e}");
                                config.error_backoff
                            }
                        }
                    }
                    LockAction::Hold => config.poll_interval,
                }
            }
            Err(e) => {
                log::warn!("volume read failed while locked: {e}");
                config.error_backoff
            }
        };
        std::thread::sleep(pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::stub::StubControl;

    fn fast_config() -> LockConfig {
        LockConfig {
            poll_interval: Duration::from_millis(5),
            error_backoff: Duration::from_millis(5),
            tolerance: 5,
        }
    }

    // ── DriftGuard ──

    #[test]
    fn drift_beyond_tolerance_corrects() {
        let guard = DriftGuard::new(50, 5);
        assert_eq!(guard.evaluate(40), LockAction::Correct);
        assert_eq!(guard.evaluate(60), LockAction::Correct);
    }

    #[test]
    fn drift_within_tolerance_holds() {
        let guard = DriftGuard::new(50, 5);
        assert_eq!(guard.evaluate(47), LockAction::Hold);
        assert_eq!(guard.evaluate(53), LockAction::Hold);
        assert_eq!(guard.evaluate(50), LockAction::Hold);
    }

    #[test]
    fn drift_exactly_tolerance_holds() {
        let guard = DriftGuard::new(50, 5);
        assert_eq!(guard.evaluate(45), LockAction::Hold);
        assert_eq!(guard.evaluate(55), LockAction::Hold);
        assert_eq!(guard.evaluate(44), LockAction::Correct);
        assert_eq!(guard.evaluate(56), LockAction::Correct);
    }

    #[test]
    fn target_clamped_to_100() {
        let guard = DriftGuard::new(150, 5);
        assert_eq!(guard.target(), 100);
    }

    #[test]
    fn extremes() {
        let zero = DriftGuard::new(0, 5);
        assert_eq!(zero.evaluate(0), LockAction::Hold);
        assert_eq!(zero.evaluate(10), LockAction::Correct);
        let full = DriftGuard::new(100, 5);
        assert_eq!(full.evaluate(100), LockAction::Hold);
        assert_eq!(full.evaluate(90), LockAction::Correct);
    }

    // ── VolumeLock runtime ──

    #[test]
    fn corrects_drift_beyond_tolerance() {
        let control = Arc::new(StubControl::new(0.40));
        let mut lock = VolumeLock::new();
        assert!(lock.start(50, control.clone(), fast_config()));

        std::thread::sleep(Duration::from_millis(40));
        lock.stop_and_join();

        let sets = control.recorded_sets();
        assert!(!sets.is_empty(), "expected at least one correction");
        assert!((sets[0] - 0.5).abs() < 1e-6, "corrected to target, got {sets:?}");
    }

    #[test]
    fn holds_within_tolerance() {
        let control = Arc::new(StubControl::new(0.47));
        let mut lock = VolumeLock::new();
        lock.start(50, control.clone(), fast_config());

        std::thread::sleep(Duration::from_millis(40));
        lock.stop_and_join();

        assert!(control.recorded_sets().is_empty());
    }

    #[test]
    fn stop_ends_corrections() {
        let control = Arc::new(StubControl::new(0.40));
        // Scripted reads keep reporting drift even after corrections
        control.push_reads(&[0.40; 64]);
        let mut lock = VolumeLock::new();
        lock.start(50, control.clone(), fast_config());

        std::thread::sleep(Duration::from_millis(30));
        lock.stop_and_join();
        assert!(!lock.is_locked());

        let after_stop = control.recorded_sets().len();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(control.recorded_sets().len(), after_stop);
    }

    #[test]
    fn second_start_while_locked_is_rejected() {
        let control = Arc::new(StubControl::new(0.5));
        let mut lock = VolumeLock::new();
        assert!(lock.start(50, control.clone(), fast_config()));
        assert!(!lock.start(80, control.clone(), fast_config()));
        assert_eq!(lock.target(), Some(50));
        lock.stop_and_join();
    }

    #[test]
    fn read_errors_back_off_without_correcting() {
        let control = Arc::new(StubControl::new(0.40));
        control
            .fail_reads
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let mut lock = VolumeLock::new();
        lock.start(50, control.clone(), fast_config());

        std::thread::sleep(Duration::from_millis(40));
        lock.stop_and_join();

        assert!(control.recorded_sets().is_empty());
    }

    #[test]
    fn lock_is_restartable_after_stop() {
        let control = Arc::new(StubControl::new(0.5));
        let mut lock = VolumeLock::new();
        assert!(lock.start(50, control.clone(), fast_config()));
        lock.stop_and_join();
        assert!(lock.start(60, control, fast_config()));
        assert!(lock.is_locked());
        assert_eq!(lock.target(), Some(60));
        lock.stop_and_join();
    }
}
