//! Unified error type for the camguard-lib crate.
//!
//! [`CamguardError`] wraps module-specific errors (`SurfaceError`,
//! `AudioError`) and domain-specific kinds (`Config`). `From` impls allow
//! `?` to propagate across module boundaries seamlessly.

use std::fmt;

use crate::audio::AudioError;
use crate::device::SurfaceError;

/// Unified error type for camguard-lib operations.
#[derive(Debug)]
pub enum CamguardError {
    /// Device control surface error (query, state change).
    Surface(SurfaceError),
    /// Audio subsystem error (COM init, endpoint control).
    Audio(AudioError),
    /// Standard I/O error (config persistence, relaunch).
    Io(std::io::Error),
    /// Configuration or input validation error.
    Config(String),
}

impl fmt::Display for CamguardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CamguardError::Surface(e) => write!(f, "{e}"),
            CamguardError::Audio(e) => write!(f, "{e}"),
            CamguardError::Io(e) => write!(f, "I/O error: {e}"),
            CamguardError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for CamguardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CamguardError::Surface(e) => Some(e),
            CamguardError::Audio(e) => Some(e),
            CamguardError::Io(e) => Some(e),
            CamguardError::Config(_) => None,
        }
    }
}

impl From<SurfaceError> for CamguardError {
    fn from(e: SurfaceError) -> Self {
        CamguardError::Surface(e)
    }
}

impl From<AudioError> for CamguardError {
    fn from(e: AudioError) -> Self {
        CamguardError::Audio(e)
    }
}

impl From<std::io::Error> for CamguardError {
    fn from(e: std::io::Error) -> Self {
        CamguardError::Io(e)
    }
}

/// Crate-level Result alias using [`CamguardError`].
pub type Result<T> = std::result::Result<T, CamguardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn from_surface_error() {
        let e: CamguardError = SurfaceError::Timeout(Duration::from_secs(15)).into();
        assert!(matches!(e, CamguardError::Surface(SurfaceError::Timeout(_))));
    }

    #[test]
    fn from_audio_error() {
        let e: CamguardError = AudioError::InitFailed("test".into()).into();
        assert!(matches!(e, CamguardError::Audio(AudioError::InitFailed(_))));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: CamguardError = io_err.into();
        assert!(matches!(e, CamguardError::Io(_)));
    }

    #[test]
    fn display_config_error() {
        let e = CamguardError::Config("no device selected".into());
        assert_eq!(e.to_string(), "Config error: no device selected");
    }

    #[test]
    fn source_chains_surface_error() {
        let e = CamguardError::Surface(SurfaceError::Spawn("spawn: missing".into()));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("missing"));
    }

    #[test]
    fn source_none_for_config() {
        let e = CamguardError::Config("bad".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_surface_to_camguard() {
        fn inner() -> crate::device::Result<()> {
            Err(SurfaceError::Parse("missing match count".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, CamguardError::Surface(SurfaceError::Parse(_))));
    }

    #[test]
    fn question_mark_propagation_audio_to_camguard() {
        fn inner() -> crate::audio::Result<()> {
            Err(AudioError::OperationFailed("nope".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, CamguardError::Audio(_)));
    }
}
