//! Process privilege state — elevation check and relaunch.
//!
//! Disabling a device requires an elevated process; enabling does not.
//! Callers check [`is_elevated`] before attempting a disable and may offer
//! [`relaunch_elevated`] as the recovery path.

#[cfg(windows)]
mod imp {
    use std::io;
    use std::os::windows::ffi::OsStrExt;

    use windows::Win32::UI::Shell::{IsUserAnAdmin, ShellExecuteW};
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
    use windows::core::PCWSTR;

    pub fn is_elevated() -> bool {
        unsafe { IsUserAnAdmin().as_bool() }
    }

    fn to_wide(s: &std::ffi::OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    /// Relaunch the current executable with the elevation prompt,
    /// forwarding the original arguments. The caller exits afterwards;
    /// the elevated instance takes over.
    pub fn relaunch_elevated() -> io::Result<()> {
        let exe = std::env::current_exe()?;
        let exe_w = to_wide(exe.as_os_str());
        let verb_w: Vec<u16> = "runas".encode_utf16().chain(std::iter::once(0)).collect();
        let params = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
        let params_w: Vec<u16> = params.encode_utf16().chain(std::iter::once(0)).collect();

        let result = unsafe {
            ShellExecuteW(
                None,
                PCWSTR(verb_w.as_ptr()),
                PCWSTR(exe_w.as_ptr()),
                PCWSTR(params_w.as_ptr()),
                PCWSTR::null(),
                SW_SHOWNORMAL,
            )
        };
        // Per the shell API contract, values above 32 indicate success.
        if result.0 as isize > 32 {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "elevation request rejected (code {})",
                result.0 as isize
            )))
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use std::io;

    pub fn is_elevated() -> bool {
        false
    }

    pub fn relaunch_elevated() -> io::Result<()> {
        Err(io::Error::other(
            "elevated relaunch is only available on Windows",
        ))
    }
}

pub use imp::{is_elevated, relaunch_elevated};
