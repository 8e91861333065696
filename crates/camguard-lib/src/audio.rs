//! Capture endpoint control — traits + Windows WASAPI backend.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

#[derive(Debug)]
pub enum AudioError {
    InitFailed(String),
    OperationFailed(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::InitFailed(e) => write!(f, "Audio init failed: {e}"),
            AudioError::OperationFailed(e) => write!(f, "Audio operation failed: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

pub type Result<T> = std::result::Result<T, AudioError>;

/// Default volume assumed before any successful read (mid-scale).
const DEFAULT_VOLUME: f32 = 0.5;

// ── Endpoint model ──

/// Platform endpoint state code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndpointState {
    Active,
    Disabled,
    NotPresent,
    Unplugged,
    Unknown(u32),
}

impl EndpointState {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => EndpointState::Active,
            2 => EndpointState::Disabled,
            4 => EndpointState::NotPresent,
            8 => EndpointState::Unplugged,
            other => EndpointState::Unknown(other),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EndpointState::Active)
    }
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointState::Active => f.write_str("Active"),
            EndpointState::Disabled => f.write_str("Disabled"),
            EndpointState::NotPresent => f.write_str("Not Present"),
            EndpointState::Unplugged => f.write_str("Unplugged"),
            EndpointState::Unknown(code) => write!(f, "State {code}"),
        }
    }
}

/// One capture endpoint as reported by the platform.
///
/// `name` holds whatever the property lookups produced; use
/// [`display_name`] to resolve the final label.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDescriptor {
    pub id: String,
    pub name: Option<String>,
    pub state: EndpointState,
}

/// Resolve a display label for an endpoint.
///
/// No single name source is reliable across drivers, so this cascades:
/// the property-store name, then a secondary device listing correlated by
/// position, then a synthetic label.
pub fn display_name(descriptor: &EndpointDescriptor, index: usize, pnp_names: &[String]) -> String {
    if let Some(name) = descriptor.name.as_deref() {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    if let Some(name) = pnp_names.get(index) {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    format!("Audio Device {}", index + 1)
}

// ── Traits ──

/// Volume/mute control interface for one bound capture endpoint.
pub trait CaptureControl: Send + Sync {
    /// Current volume scalar in `[0.0, 1.0]`.
    fn volume(&self) -> Result<f32>;
    fn set_volume(&self, scalar: f32) -> Result<()>;
    fn muted(&self) -> Result<bool>;
    fn set_muted(&self, muted: bool) -> Result<()>;
}

/// Platform audio surface: endpoint discovery and activation.
pub trait AudioEndpoints {
    /// Bind the system default capture endpoint, or `None` if the host
    /// has no capture device.
    fn default_capture(&self) -> Result<Option<Arc<dyn CaptureControl>>>;
    fn enumerate(&self, include_inactive: bool) -> Result<Vec<EndpointDescriptor>>;
    fn open(&self, id: &str) -> Result<Arc<dyn CaptureControl>>;
}

// ── Controller ──

/// Owns the currently controlled capture endpoint.
///
/// All platform failures are contained here: reads fall back to the
/// last-known value, writes degrade to logged no-ops. Switching endpoints
/// replaces the owned control without touching the OS-wide default.
pub struct MicController<P: AudioEndpoints> {
    platform: P,
    control: Option<Arc<dyn CaptureControl>>,
    last_volume: Cell<f32>,
}

impl<P: AudioEndpoints> MicController<P> {
    pub fn new(platform: P) -> Self {
        MicController {
            platform,
            control: None,
            last_volume: Cell::new(DEFAULT_VOLUME),
        }
    }

    fn adopt(&mut self, control: Arc<dyn CaptureControl>) {
        if let Ok(v) = control.volume() {
            self.last_volume.set(v);
        }
        self.control = Some(control);
    }

    /// Bind the system default microphone.
    pub fn bind_default(&mut self) -> bool {
        match self.platform.default_capture() {
            Ok(Some(control)) => {
                self.adopt(control);
                true
            }
            Ok(None) => {
                log::warn!("no capture endpoint available");
                false
            }
            Err(e) => {
                log::warn!("failed to bind default capture endpoint: {e}");
                false
            }
        }
    }

    /// Switch subsequent volume operations to another endpoint. On failure
    /// the previously bound endpoint stays in control.
    pub fn switch_to(&mut self, id: &str) -> bool {
        match self.platform.open(id) {
            Ok(control) => {
                self.adopt(control);
                true
            }
            Err(e) => {
                log::warn!("failed to switch to endpoint {id}: {e}");
                false
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        self.control.is_some()
    }

    /// Handle to the bound control, shareable with the volume lock.
    pub fn control(&self) -> Option<Arc<dyn CaptureControl>> {
        self.control.clone()
    }

    /// Capture endpoints the platform reports; empty on failure (logged).
    pub fn endpoints(&self, include_inactive: bool) -> Vec<EndpointDescriptor> {
        match self.platform.enumerate(include_inactive) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                log::warn!("endpoint enumeration failed: {e}");
                Vec::new()
            }
        }
    }

    /// Current volume scalar; returns the last-known value when the read
    /// fails or no endpoint is bound.
    pub fn volume(&self) -> f32 {
        if let Some(control) = &self.control {
            match control.volume() {
                Ok(v) => {
                    self.last_volume.set(v);
                    return v;
                }
                Err(e) => log::warn!("volume read failed, using last known: {e}"),
            }
        }
        self.last_volume.get()
    }

    pub fn volume_percent(&self) -> u8 {
        (self.volume() * 100.0).round() as u8
    }

    /// Set the volume scalar. Out-of-range values are clamped to
    /// `[0.0, 1.0]`; platform failure degrades to a logged no-op.
    pub fn set_volume(&self, scalar: f32) -> bool {
        let clamped = scalar.clamp(0.0, 1.0);
        let Some(control) = &self.control else {
            log::warn!("set_volume ignored: no capture endpoint bound");
            return false;
        };
        match control.set_volume(clamped) {
            Ok(()) => {
                self.last_volume.set(clamped);
                true
            }
            Err(e) => {
                log::warn!("set_volume failed: {e}");
                false
            }
        }
    }

    pub fn set_volume_percent(&self, percent: u8) -> bool {
        self.set_volume(f32::from(percent.min(100)) / 100.0)
    }

    pub fn muted(&self) -> bool {
        let Some(control) = &self.control else {
            return false;
        };
        control.muted().unwrap_or_else(|e| {
            log::warn!("mute read failed: {e}");
            false
        })
    }

    pub fn set_muted(&self, muted: bool) -> bool {
        let Some(control) = &self.control else {
            log::warn!("set_muted ignored: no capture endpoint bound");
            return false;
        };
        match control.set_muted(muted) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("set_muted failed: {e}");
                false
            }
        }
    }
}

// ── Windows WASAPI implementation ──

#[cfg(windows)]
mod wasapi {
    use super::*;
    use windows::Win32::Devices::FunctionDiscovery::{
        PKEY_Device_DeviceDesc, PKEY_Device_FriendlyName,
    };
    use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
    use windows::Win32::Media::Audio::{
        DEVICE_STATE_ACTIVE, DEVICE_STATEMASK_ALL, IMMDevice, IMMDeviceEnumerator,
        MMDeviceEnumerator, eCapture, eConsole,
    };
    use windows::Win32::System::Com::{
        CLSCTX_ALL, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx, STGM_READ,
    };
    use windows::Win32::System::Variant::VT_LPWSTR;
    use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};
    use windows::core::PCWSTR;

    /// Initialize COM for the current thread (apartment-threaded).
    pub fn com_init() -> Result<()> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(|e| AudioError::InitFailed(format!("CoInitializeEx: {e}")))
        }
    }

    fn read_string_prop(store: &IPropertyStore, key: &PROPERTYKEY) -> Option<String> {
        unsafe {
            match store.GetValue(key) {
                Ok(prop) => {
                    if prop.Anonymous.Anonymous.vt == VT_LPWSTR {
                        prop.Anonymous.Anonymous.Anonymous.pwszVal.to_string().ok()
                    } else {
                        None
                    }
                }
                Err(_) => None,
            }
        }
    }

    /// Property-store name lookup: friendly name, then device description.
    fn device_name(device: &IMMDevice) -> Option<String> {
        let store = unsafe { device.OpenPropertyStore(STGM_READ) }.ok()?;
        read_string_prop(&store, &PKEY_Device_FriendlyName)
            .or_else(|| read_string_prop(&store, &PKEY_Device_DeviceDesc))
            .filter(|n| !n.trim().is_empty())
    }

    pub struct WasapiControl {
        volume: IAudioEndpointVolume,
    }

    // SAFETY: the endpoint volume interface is free-threaded; the volume
    // lock reads and writes it from a background thread while the owner
    // only replaces the whole control from the foreground thread.
    unsafe impl Send for WasapiControl {}
    unsafe impl Sync for WasapiControl {}

    impl WasapiControl {
        fn bind(device: &IMMDevice) -> Result<Self> {
            let volume: IAudioEndpointVolume = unsafe { device.Activate(CLSCTX_ALL, None) }
                .map_err(|e| AudioError::InitFailed(format!("IAudioEndpointVolume: {e}")))?;
            Ok(WasapiControl { volume })
        }
    }

    impl CaptureControl for WasapiControl {
        fn volume(&self) -> Result<f32> {
            unsafe {
                self.volume
                    .GetMasterVolumeLevelScalar()
                    .map_err(|e| AudioError::OperationFailed(format!("GetVolume: {e}")))
            }
        }

        fn set_volume(&self, scalar: f32) -> Result<()> {
            unsafe {
                self.volume
                    .SetMasterVolumeLevelScalar(scalar, std::ptr::null())
                    .map_err(|e| AudioError::OperationFailed(format!("SetVolume: {e}")))
            }
        }

        fn muted(&self) -> Result<bool> {
            unsafe {
                self.volume
                    .GetMute()
                    .map(|b| b.as_bool())
                    .map_err(|e| AudioError::OperationFailed(format!("GetMute: {e}")))
            }
        }

        fn set_muted(&self, muted: bool) -> Result<()> {
            unsafe {
                self.volume
                    .SetMute(muted, std::ptr::null())
                    .map_err(|e| AudioError::OperationFailed(format!("SetMute: {e}")))
            }
        }
    }

    pub struct WasapiEndpoints {
        enumerator: IMMDeviceEnumerator,
    }

    impl WasapiEndpoints {
        /// COM must be initialized on this thread first ([`com_init`]).
        pub fn new() -> Result<Self> {
            let enumerator: IMMDeviceEnumerator =
                unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) }
                    .map_err(|e| AudioError::InitFailed(format!("MMDeviceEnumerator: {e}")))?;
            Ok(WasapiEndpoints { enumerator })
        }
    }

    impl AudioEndpoints for WasapiEndpoints {
        fn default_capture(&self) -> Result<Option<Arc<dyn CaptureControl>>> {
            let device = match unsafe { self.enumerator.GetDefaultAudioEndpoint(eCapture, eConsole) }
            {
                Ok(d) => d,
                Err(_) => return Ok(None),
            };
            Ok(Some(Arc::new(WasapiControl::bind(&device)?)))
        }

        fn enumerate(&self, include_inactive: bool) -> Result<Vec<EndpointDescriptor>> {
            let mask = if include_inactive {
                DEVICE_STATEMASK_ALL
            } else {
                DEVICE_STATE_ACTIVE
            };
            unsafe {
                let collection = self
                    .enumerator
                    .EnumAudioEndpoints(eCapture, mask)
                    .map_err(|e| AudioError::OperationFailed(format!("EnumAudioEndpoints: {e}")))?;
                let count = collection
                    .GetCount()
                    .map_err(|e| AudioError::OperationFailed(format!("GetCount: {e}")))?;

                let mut endpoints = Vec::with_capacity(count as usize);
                for i in 0..count {
                    let Ok(device) = collection.Item(i) else {
                        continue;
                    };
                    let id = match device.GetId().map(|p| p.to_string()) {
                        Ok(Ok(id)) => id,
                        _ => continue,
                    };
                    let state = device
                        .GetState()
                        .map(|s| EndpointState::from_raw(s.0))
                        .unwrap_or(EndpointState::Unknown(0));
                    endpoints.push(EndpointDescriptor {
                        id,
                        name: device_name(&device),
                        state,
                    });
                }
                Ok(endpoints)
            }
        }

        fn open(&self, id: &str) -> Result<Arc<dyn CaptureControl>> {
            let wide: Vec<u16> = id.encode_utf16().chain(std::iter::once(0)).collect();
            let device = unsafe { self.enumerator.GetDevice(PCWSTR::from_raw(wide.as_ptr())) }
                .map_err(|e| AudioError::InitFailed(format!("GetDevice {id}: {e}")))?;
            Ok(Arc::new(WasapiControl::bind(&device)?))
        }
    }
}

#[cfg(windows)]
pub use wasapi::{WasapiEndpoints, com_init};

// ── Unsupported-platform implementation ──

/// Inert audio surface for hosts without the platform audio subsystem.
/// Enables compilation and `cargo test` everywhere.
#[cfg(not(windows))]
pub struct UnsupportedEndpoints;

#[cfg(not(windows))]
impl AudioEndpoints for UnsupportedEndpoints {
    fn default_capture(&self) -> Result<Option<Arc<dyn CaptureControl>>> {
        Ok(None)
    }

    fn enumerate(&self, _include_inactive: bool) -> Result<Vec<EndpointDescriptor>> {
        Ok(Vec::new())
    }

    fn open(&self, _id: &str) -> Result<Arc<dyn CaptureControl>> {
        Err(AudioError::InitFailed(
            "audio endpoint control requires Windows".into(),
        ))
    }
}

#[cfg(not(windows))]
pub fn com_init() -> Result<()> {
    Ok(())
}

/// Concrete platform surface for the current host.
#[cfg(windows)]
pub type PlatformEndpoints = WasapiEndpoints;
#[cfg(not(windows))]
pub type PlatformEndpoints = UnsupportedEndpoints;

/// Open the platform audio surface.
pub fn platform_endpoints() -> Result<PlatformEndpoints> {
    #[cfg(windows)]
    {
        WasapiEndpoints::new()
    }
    #[cfg(not(windows))]
    {
        Ok(UnsupportedEndpoints)
    }
}

// ── Test stub ──

/// Scriptable audio surface for unit and integration tests.
pub mod stub {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory [`CaptureControl`]. Reads pop a scripted sequence first,
    /// then fall back to the stored value; writes are recorded.
    pub struct StubControl {
        volume: Mutex<f32>,
        scripted_reads: Mutex<Vec<f32>>,
        muted: AtomicBool,
        pub set_volume_calls: Mutex<Vec<f32>>,
        pub fail_reads: AtomicBool,
        pub fail_writes: AtomicBool,
    }

    impl StubControl {
        pub fn new(initial: f32) -> Self {
            StubControl {
                volume: Mutex::new(initial),
                scripted_reads: Mutex::new(Vec::new()),
                muted: AtomicBool::new(false),
                set_volume_calls: Mutex::new(Vec::new()),
                fail_reads: AtomicBool::new(false),
                fail_writes: AtomicBool::new(false),
            }
        }

        /// Queue volume values returned by subsequent reads.
        pub fn push_reads(&self, values: &[f32]) {
            self.scripted_reads.lock().unwrap().extend_from_slice(values);
        }

        pub fn recorded_sets(&self) -> Vec<f32> {
            self.set_volume_calls.lock().unwrap().clone()
        }
    }

    impl CaptureControl for StubControl {
        fn volume(&self) -> Result<f32> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(AudioError::OperationFailed("stub: read failure".into()));
            }
            let mut scripted = self.scripted_reads.lock().unwrap();
            if scripted.is_empty() {
                Ok(*self.volume.lock().unwrap())
            } else {
                Ok(scripted.remove(0))
            }
        }

        fn set_volume(&self, scalar: f32) -> Result<()> {
            self.set_volume_calls.lock().unwrap().push(scalar);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AudioError::OperationFailed("stub: write failure".into()));
            }
            *self.volume.lock().unwrap() = scalar;
            Ok(())
        }

        fn muted(&self) -> Result<bool> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(AudioError::OperationFailed("stub: read failure".into()));
            }
            Ok(self.muted.load(Ordering::SeqCst))
        }

        fn set_muted(&self, muted: bool) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AudioError::OperationFailed("stub: write failure".into()));
            }
            self.muted.store(muted, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Scriptable [`AudioEndpoints`] surface.
    #[derive(Default)]
    pub struct StubEndpoints {
        pub default: Option<Arc<StubControl>>,
        pub descriptors: Vec<EndpointDescriptor>,
        pub by_id: Mutex<HashMap<String, Arc<StubControl>>>,
    }

    impl StubEndpoints {
        pub fn with_default(control: Arc<StubControl>) -> Self {
            StubEndpoints {
                default: Some(control),
                ..Default::default()
            }
        }
    }

    impl AudioEndpoints for StubEndpoints {
        fn default_capture(&self) -> Result<Option<Arc<dyn CaptureControl>>> {
            Ok(self
                .default
                .clone()
                .map(|c| c as Arc<dyn CaptureControl>))
        }

        fn enumerate(&self, include_inactive: bool) -> Result<Vec<EndpointDescriptor>> {
            let endpoints = self
                .descriptors
                .iter()
                .filter(|d| include_inactive || d.state.is_active())
                .cloned()
                .collect();
            Ok(endpoints)
        }

        fn open(&self, id: &str) -> Result<Arc<dyn CaptureControl>> {
            self.by_id
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .map(|c| c as Arc<dyn CaptureControl>)
                .ok_or_else(|| AudioError::InitFailed(format!("stub: no endpoint {id}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::{StubControl, StubEndpoints};
    use super::*;

    fn descriptor(id: &str, name: Option<&str>, state: EndpointState) -> EndpointDescriptor {
        EndpointDescriptor {
            id: id.to_string(),
            name: name.map(str::to_string),
            state,
        }
    }

    // ── EndpointState ──

    #[test]
    fn state_from_raw_codes() {
        assert_eq!(EndpointState::from_raw(1), EndpointState::Active);
        assert_eq!(EndpointState::from_raw(2), EndpointState::Disabled);
        assert_eq!(EndpointState::from_raw(4), EndpointState::NotPresent);
        assert_eq!(EndpointState::from_raw(8), EndpointState::Unplugged);
        assert_eq!(EndpointState::from_raw(16), EndpointState::Unknown(16));
    }

    // ── display_name cascade ──

    #[test]
    fn display_name_prefers_property_name() {
        let d = descriptor("id", Some("Headset Microphone"), EndpointState::Active);
        assert_eq!(
            display_name(&d, 0, &["PnP Name".into()]),
            "Headset Microphone"
        );
    }

    #[test]
    fn display_name_falls_back_to_secondary_listing() {
        let d = descriptor("id", None, EndpointState::Active);
        assert_eq!(
            display_name(&d, 1, &["First".into(), "Second".into()]),
            "Second"
        );
    }

    #[test]
    fn display_name_synthesizes_label() {
        let d = descriptor("id", Some("   "), EndpointState::Active);
        assert_eq!(display_name(&d, 2, &[]), "Audio Device 3");
    }

    // ── MicController ──

    #[test]
    fn bind_default_without_capture_device() {
        let mut mic = MicController::new(StubEndpoints::default());
        assert!(!mic.bind_default());
        assert!(!mic.is_bound());
    }

    #[test]
    fn bind_default_adopts_current_volume() {
        let control = Arc::new(StubControl::new(0.75));
        let mut mic = MicController::new(StubEndpoints::with_default(control));
        assert!(mic.bind_default());
        assert_eq!(mic.volume_percent(), 75);
    }

    #[test]
    fn volume_returns_last_known_on_read_failure() {
        let control = Arc::new(StubControl::new(0.75));
        let mut mic = MicController::new(StubEndpoints::with_default(control.clone()));
        mic.bind_default();
        assert_eq!(mic.volume_percent(), 75);

        control.fail_reads.store(true, std::sync::atomic::Ordering::SeqCst);
        // Read fails — last-known value, not a misleading default
        assert_eq!(mic.volume_percent(), 75);
    }

    #[test]
    fn set_volume_clamps_out_of_range() {
        let control = Arc::new(StubControl::new(0.5));
        let mut mic = MicController::new(StubEndpoints::with_default(control.clone()));
        mic.bind_default();

        assert!(mic.set_volume(1.2));
        assert!(mic.set_volume(-0.1));
        assert_eq!(control.recorded_sets(), vec![1.0, 0.0]);
    }

    #[test]
    fn set_volume_unbound_is_noop() {
        let mic = MicController::new(StubEndpoints::default());
        assert!(!mic.set_volume(0.5));
    }

    #[test]
    fn set_volume_write_failure_degrades() {
        let control = Arc::new(StubControl::new(0.5));
        let mut mic = MicController::new(StubEndpoints::with_default(control.clone()));
        mic.bind_default();
        control.fail_writes.store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(!mic.set_volume(0.9));
        // Cache keeps the last value that actually applied
        assert_eq!(mic.volume_percent(), 50);
    }

    #[test]
    fn set_volume_percent_converts() {
        let control = Arc::new(StubControl::new(0.5));
        let mut mic = MicController::new(StubEndpoints::with_default(control.clone()));
        mic.bind_default();

        assert!(mic.set_volume_percent(25));
        assert_eq!(control.recorded_sets(), vec![0.25]);
        assert_eq!(mic.volume_percent(), 25);
    }

    #[test]
    fn mute_round_trip() {
        let control = Arc::new(StubControl::new(0.5));
        let mut mic = MicController::new(StubEndpoints::with_default(control));
        mic.bind_default();

        assert!(!mic.muted());
        assert!(mic.set_muted(true));
        assert!(mic.muted());
        assert!(mic.set_muted(false));
        assert!(!mic.muted());
    }

    #[test]
    fn switch_to_unknown_endpoint_keeps_current() {
        let control = Arc::new(StubControl::new(0.6));
        let mut mic = MicController::new(StubEndpoints::with_default(control));
        mic.bind_default();

        assert!(!mic.switch_to("missing"));
        assert!(mic.is_bound());
        assert_eq!(mic.volume_percent(), 60);
    }

    #[test]
    fn switch_to_known_endpoint() {
        let other = Arc::new(StubControl::new(0.3));
        let platform = StubEndpoints::default();
        platform.by_id.lock().unwrap().insert("ep2".into(), other);
        let mut mic = MicController::new(platform);

        assert!(mic.switch_to("ep2"));
        assert_eq!(mic.volume_percent(), 30);
    }

    #[test]
    fn enumerate_filters_inactive() {
        let platform = StubEndpoints {
            descriptors: vec![
                descriptor("a", Some("Mic"), EndpointState::Active),
                descriptor("b", None, EndpointState::Unplugged),
            ],
            ..Default::default()
        };
        let mic = MicController::new(platform);
        assert_eq!(mic.endpoints(false).len(), 1);
        assert_eq!(mic.endpoints(true).len(), 2);
    }
}
