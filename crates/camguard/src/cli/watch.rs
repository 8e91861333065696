//! `watch` subcommand — periodic device re-scans with change reporting.
//!
//! Scans run on a worker thread and hand the snapshot back over a
//! channel; the foreground loop owns the current snapshot. While a scan
//! is in flight, further refresh ticks are dropped, not queued.

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::{PnpDevice, PowerShellSurface, RUNNING, Result, Settings, query, status_label};

/// Cap on a single channel wait so Ctrl+C stays responsive.
const WAIT_SLICE: Duration = Duration::from_millis(250);

pub(super) fn cmd_watch(interval: Option<u64>, all: bool) -> Result<()> {
    let settings = Settings::load();
    let include_all = all || settings.show_all_devices;
    let interval = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| settings.refresh_interval());
    let surface = PowerShellSurface::default();

    println!(
        "Watching camera devices every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );

    let (tx, rx) = mpsc::channel();
    let mut refresh_in_progress = false;
    let mut snapshot: Option<Vec<PnpDevice>> = None;

    while RUNNING.load(Ordering::SeqCst) {
        let tick_started = Instant::now();

        if refresh_in_progress {
            log::debug!("scan still in flight; dropping this refresh");
        } else {
            refresh_in_progress = true;
            let tx = tx.clone();
            let surface = surface.clone();
            std::thread::spawn(move || {
                let _ = tx.send(query::list_devices(&surface, include_all));
            });
        }

        // Wait out the tick, draining any finished scan along the way.
        while RUNNING.load(Ordering::SeqCst) {
            let remaining = interval.saturating_sub(tick_started.elapsed());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining.min(WAIT_SLICE)) {
                Ok(devices) => {
                    refresh_in_progress = false;
                    report(snapshot.as_deref(), &devices);
                    snapshot = Some(devices);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    Ok(())
}

/// Print the initial listing, then only what changed.
fn report(previous: Option<&[PnpDevice]>, current: &[PnpDevice]) {
    let Some(previous) = previous else {
        if current.is_empty() {
            println!("No camera devices found.");
        } else {
            for device in current {
                println!("  {} — {}", device.name, status_label(device));
            }
        }
        return;
    };

    for device in current {
        match previous
            .iter()
            .find(|p| p.instance_id == device.instance_id)
        {
            None => println!("  + {} — {}", device.name, status_label(device)),
            Some(old) if old.status != device.status => {
                println!(
                    "  ~ {} — {} (was {})",
                    device.name,
                    status_label(device),
                    status_label(old)
                );
            }
            Some(_) => {}
        }
    }
    for old in previous {
        if !current.iter().any(|d| d.instance_id == old.instance_id) {
            println!("  - {} — removed", old.name);
        }
    }
}
