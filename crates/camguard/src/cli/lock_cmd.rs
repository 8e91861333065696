//! `lock` subcommand — hold the microphone volume at a target level.

use std::sync::atomic::Ordering;
use std::time::Duration;

use super::{CamguardError, LockConfig, RUNNING, Result, VolumeLock, bind_mic};

pub(super) fn cmd_lock(target: u8, device: Option<&str>) -> Result<()> {
    if target > 100 {
        return Err(CamguardError::Config(
            "lock target must be between 0 and 100".into(),
        ));
    }

    let Some(mic) = bind_mic(device)? else {
        println!("No capture endpoint available.");
        return Ok(());
    };
    let Some(control) = mic.control() else {
        return Err(CamguardError::Config("no capture endpoint bound".into()));
    };

    let mut lock = VolumeLock::new();
    lock.start(target, control, LockConfig::default());
    println!("Volume locked at {target}%. Press Ctrl+C to stop.");

    while RUNNING.load(Ordering::SeqCst) && lock.is_locked() {
        std::thread::sleep(Duration::from_millis(200));
    }

    lock.stop_and_join();
    println!("Volume unlocked.");
    Ok(())
}
