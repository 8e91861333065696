//! Device snapshots — delimited-output parsing and de-duplication.

use std::collections::HashSet;

use crate::device::{DeviceClass, DeviceStatus, DeviceSurface, PnpDevice, SurfaceError};

/// Parse one `Name|InstanceId|Status|Class|Present` listing line.
///
/// Lines with fewer than four fields or an empty trimmed name are
/// discarded. A missing `Present` field defaults to present.
pub fn parse_device_line(line: &str) -> Option<PnpDevice> {
    let line = line.trim();
    if line.is_empty() || !line.contains('|') {
        return None;
    }
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 4 {
        return None;
    }
    let name = parts[0].trim();
    let instance_id = parts[1].trim();
    if name.is_empty() || instance_id.is_empty() {
        return None;
    }
    let present = parts
        .get(4)
        .map(|p| p.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(true);
    Some(PnpDevice {
        name: name.to_string(),
        instance_id: instance_id.to_string(),
        status: DeviceStatus::from_raw(parts[2]),
        class: DeviceClass::from_raw(parts[3]),
        present,
    })
}

/// Parse a whole listing, de-duplicating by instance id (first seen wins).
pub fn parse_device_lines(raw: &str) -> Vec<PnpDevice> {
    let mut seen = HashSet::new();
    let mut devices = Vec::new();
    for line in raw.lines() {
        if let Some(device) = parse_device_line(line)
            && seen.insert(device.instance_id.clone())
        {
            devices.push(device);
        }
    }
    devices
}

/// Snapshot the camera devices the surface currently reports.
///
/// With `include_all` set, unions the Camera and Image classes with the
/// camera-name pattern query; otherwise only the Camera class. Surface
/// failures propagate — this is the explicit error channel that
/// [`list_devices`] flattens away.
pub fn scan(surface: &dyn DeviceSurface, include_all: bool) -> Result<Vec<PnpDevice>, SurfaceError> {
    let mut raw = surface.query_class(DeviceClass::Camera)?;
    if include_all {
        raw.push('\n');
        raw.push_str(&surface.query_class(DeviceClass::Image)?);
        raw.push('\n');
        raw.push_str(&surface.query_name_matches()?);
    }
    Ok(parse_device_lines(&raw))
}

/// Snapshot devices, treating any surface failure as an empty result.
///
/// Callers that need to tell "no devices" from "query failed" should use
/// [`scan`]; this keeps the lenient contract and logs the cause.
pub fn list_devices(surface: &dyn DeviceSurface, include_all: bool) -> Vec<PnpDevice> {
    match scan(surface, include_all) {
        Ok(devices) => devices,
        Err(e) => {
            log::warn!("device query failed, treating as empty: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockSurface;

    const CAMERAS: &str = "\
Integrated Camera|USB\\VID_04F2&PID_B6DD\\0001|OK|Camera|True
USB Web Camera|USB\\VID_046D&PID_085B\\5&2A|Error|Camera|True
";

    #[test]
    fn parse_line_full() {
        let d = parse_device_line("Integrated Camera|USB\\VID_04F2&PID_B6DD\\0001|OK|Camera|True")
            .unwrap();
        assert_eq!(d.name, "Integrated Camera");
        assert_eq!(d.instance_id, "USB\\VID_04F2&PID_B6DD\\0001");
        assert_eq!(d.status, DeviceStatus::Ok);
        assert_eq!(d.class, DeviceClass::Camera);
        assert!(d.present);
    }

    #[test]
    fn parse_line_not_present() {
        let d = parse_device_line("Old Cam|USB\\X\\1|Error|Camera|False").unwrap();
        assert!(!d.present);
    }

    #[test]
    fn parse_line_missing_present_defaults_true() {
        let d = parse_device_line("Cam|USB\\X\\1|OK|Camera").unwrap();
        assert!(d.present);
    }

    #[test]
    fn parse_line_empty_name_discarded() {
        assert!(parse_device_line("|USB\\X\\1|OK|Camera|True").is_none());
        assert!(parse_device_line("   |USB\\X\\1|OK|Camera|True").is_none());
    }

    #[test]
    fn parse_line_garbage_discarded() {
        assert!(parse_device_line("").is_none());
        assert!(parse_device_line("no delimiters here").is_none());
        assert!(parse_device_line("a|b").is_none());
    }

    #[test]
    fn parse_line_unknown_status_carried_through() {
        let d = parse_device_line("Cam|USB\\X\\1|Degraded|Camera|True").unwrap();
        assert_eq!(d.status, DeviceStatus::Unknown("Degraded".into()));
    }

    #[test]
    fn parse_lines_deduplicates_first_seen() {
        let raw = "\
Cam A|USB\\X\\1|OK|Camera|True
Cam A (again)|USB\\X\\1|Error|Image|True
Cam B|USB\\X\\2|OK|Camera|True
";
        let devices = parse_device_lines(raw);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "Cam A");
        assert_eq!(devices[0].status, DeviceStatus::Ok);
        assert_eq!(devices[1].instance_id, "USB\\X\\2");
    }

    #[test]
    fn parse_lines_unique_instance_ids() {
        let devices = parse_device_lines(CAMERAS);
        let mut ids: Vec<_> = devices.iter().map(|d| d.instance_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), devices.len());
        assert!(devices.iter().all(|d| !d.name.trim().is_empty()));
    }

    #[test]
    fn scan_camera_class_only() {
        let m = MockSurface::new();
        m.set_class_output(DeviceClass::Camera, CAMERAS);
        m.set_class_output(DeviceClass::Image, "Scanner|ROOT\\IMAGE\\0000|OK|Image|True");

        let devices = scan(&m, false).unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.iter().all(|d| d.class == DeviceClass::Camera));
    }

    #[test]
    fn scan_all_unions_and_dedupes() {
        let m = MockSurface::new();
        m.set_class_output(DeviceClass::Camera, CAMERAS);
        m.set_class_output(DeviceClass::Image, "Scanner|ROOT\\IMAGE\\0000|OK|Image|True");
        // Name match overlaps with an already-seen camera
        *m.name_match_output.borrow_mut() =
            "USB Web Camera|USB\\VID_046D&PID_085B\\5&2A|Error|USB|True\n\
             Capture Card|USB\\VID_1D6C&PID_0103\\7&1B|OK|USB|True"
                .to_string();

        let devices = scan(&m, true).unwrap();
        assert_eq!(devices.len(), 4);
        // First occurrence (Camera class) won over the USB-tagged duplicate
        let dup = devices
            .iter()
            .find(|d| d.instance_id == "USB\\VID_046D&PID_085B\\5&2A")
            .unwrap();
        assert_eq!(dup.class, DeviceClass::Camera);
    }

    #[test]
    fn scan_propagates_surface_failure() {
        let m = MockSurface::new();
        m.fail_queries.set(true);
        assert!(scan(&m, false).is_err());
    }

    #[test]
    fn list_devices_flattens_failure_to_empty() {
        let m = MockSurface::new();
        m.fail_queries.set(true);
        assert!(list_devices(&m, true).is_empty());
    }

    #[test]
    fn list_devices_empty_surface_is_empty() {
        let m = MockSurface::new();
        assert!(list_devices(&m, false).is_empty());
    }
}
