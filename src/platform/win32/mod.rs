// ── Win32 platform implementation ─────────────────────────────────────────────
//
// Argument retrieval for the windowed entry and the fatal-error dialog.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.

#![allow(unsafe_code)]
// Console builds compile this module for its tests and re-exports only.
#![cfg_attr(not(launch_entry = "windowed"), allow(dead_code))]

use std::ffi::c_int;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, LocalFree, HLOCAL, HWND},
        System::Environment::GetCommandLineW,
        UI::{
            Shell::CommandLineToArgvW,
            WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK},
        },
    },
};

use crate::error::{LaunchError, Result};

// Types named by the `wWinMain` signature that `entry_point!` expands to.
#[doc(hidden)]
pub use windows::{core::PWSTR, Win32::Foundation::HINSTANCE};

// ── Process argument vector ───────────────────────────────────────────────────

// Accessors for the C runtime's argument globals. Exported by both the
// Universal CRT and msvcrt.dll, so MSVC and MinGW builds link them alike.
extern "C" {
    fn __p___argc() -> *mut c_int;
    fn __p___wargv() -> *mut *mut *mut u16;
}

/// The process's wide argument vector, program name included.
///
/// The CRT startup code splits the command line before `wWinMain` runs, the
/// same way it does for `wmain`, and that vector is used as-is. Only when the
/// CRT never built one is the command line split again by the shell.
pub(crate) enum ProcessArgs {
    /// `__argc` / `__wargv`, owned by the CRT for the life of the process.
    Crt {
        argc: c_int,
        argv: *const *const u16,
    },
    /// Fallback split by `CommandLineToArgvW`.
    Shell(ShellArgs),
}

impl ProcessArgs {
    pub(crate) fn retrieve() -> Result<Self> {
        // SAFETY: both accessors have no preconditions and return either null
        // or pointers to the CRT's process-lifetime globals.
        let crt = unsafe { crt_vector(__p___argc(), __p___wargv()) };
        match crt {
            Some((argc, argv)) => {
                log::trace!("using the CRT's wide argv ({argc} argument(s))");
                Ok(Self::Crt { argc, argv })
            }
            None => {
                log::debug!("CRT wide argv not populated; splitting the command line");
                ShellArgs::retrieve().map(Self::Shell)
            }
        }
    }

    /// Borrow the arguments as UTF-16 slices.
    pub(crate) fn iter(&self) -> impl ExactSizeIterator<Item = &[u16]> + '_ {
        let (argc, argv) = match self {
            Self::Crt { argc, argv } => (*argc, *argv),
            Self::Shell(shell) => (shell.argc, shell.argv.cast::<*const u16>().cast_const()),
        };
        // SAFETY: both sources hold `argc` NUL-terminated strings that stay
        // allocated at least as long as `self`; PWSTR is a transparent
        // wrapper over `*mut u16`.
        unsafe { super::argv::wide_args(argc, argv) }
    }
}

/// Read the CRT's vector through the accessor results, if it was built.
///
/// # Safety
///
/// Each pointer must be null or valid for reads.
unsafe fn crt_vector(
    argc: *const c_int,
    wargv: *const *mut *mut u16,
) -> Option<(c_int, *const *const u16)> {
    if argc.is_null() || wargv.is_null() {
        return None;
    }
    // SAFETY: both checked non-null above; validity is the caller's contract.
    let (argc, argv) = unsafe { (*argc, *wargv) };
    if argv.is_null() {
        return None;
    }
    Some((argc, argv.cast::<*const u16>().cast_const()))
}

/// Wide argument vector split by `CommandLineToArgvW`.
///
/// Owns the single `LocalAlloc` block the shell hands back and frees it on
/// drop, so it must not outlive normalization.
pub(crate) struct ShellArgs {
    argv: *mut PWSTR,
    argc: c_int,
}

impl ShellArgs {
    /// Split the full process command line, program name included.
    ///
    /// The shell's rules differ from the CRT's in corner cases (runs of
    /// backslashes before quotes, doubled quotes inside a quoted argument),
    /// which is why this is only the fallback.
    pub(crate) fn retrieve() -> Result<Self> {
        // SAFETY: GetCommandLineW has no preconditions; the returned string
        // lives for the whole process.
        let cmd_line = unsafe { GetCommandLineW() };

        let mut argc: i32 = 0;
        // SAFETY: cmd_line is a valid NUL-terminated wide string and argc is
        // a valid out-pointer for the duration of the call.
        let argv = unsafe { CommandLineToArgvW(PCWSTR(cmd_line.0 as *const u16), &mut argc) };
        if argv.is_null() {
            return Err(last_error("CommandLineToArgvW"));
        }

        log::trace!("CommandLineToArgvW produced {argc} argument(s)");
        Ok(Self { argv, argc })
    }
}

impl Drop for ShellArgs {
    fn drop(&mut self) {
        // SAFETY: argv is the block CommandLineToArgvW allocated with
        // LocalAlloc; it is freed exactly once, here. The returned handle is
        // only non-null on failure, which leaves nothing for us to do.
        unsafe {
            let _ = LocalFree(HLOCAL(self.argv.cast()));
        }
    }
}

// ── Fatal diagnostic ──────────────────────────────────────────────────────────

/// Show a modal error dialog with the given message.
///
/// The windowed entry has no console, so this is the only place a fatal
/// startup error can be seen.
pub(crate) fn show_error_dialog(message: &str) {
    let msg_wide: Vec<u16> = message.encode_utf16().chain(std::iter::once(0)).collect();

    // SAFETY: msg_wide is a valid null-terminated UTF-16 string that remains
    // allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            w!("Fatal error"),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `LaunchError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> LaunchError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    LaunchError::ArgumentRetrieval {
        function,
        code: code.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn std_args() -> Vec<String> {
        std::env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn process_args_match_std_args() {
        let args = ProcessArgs::retrieve().expect("process argv");
        let ours: Vec<String> = args.iter().map(String::from_utf16_lossy).collect();
        assert_eq!(ours, std_args());
    }

    #[test]
    fn shell_split_matches_std_args() {
        let shell = ProcessArgs::Shell(ShellArgs::retrieve().expect("CommandLineToArgvW"));
        let ours: Vec<String> = shell.iter().map(String::from_utf16_lossy).collect();
        assert_eq!(ours, std_args());
    }

    #[test]
    fn crt_vector_is_used_when_populated() {
        let mut prog: Vec<u16> = "prog\0".encode_utf16().collect();
        let mut arg: Vec<u16> = "a b\0".encode_utf16().collect();
        let mut table = [prog.as_mut_ptr(), arg.as_mut_ptr(), std::ptr::null_mut()];
        let mut wargv = table.as_mut_ptr();
        let argc: c_int = 2;

        // SAFETY: all pointers refer to locals that outlive the call.
        let (n, argv) = unsafe { crt_vector(&argc, &mut wargv) }.expect("populated vector");
        assert_eq!(n, 2);

        let crt = ProcessArgs::Crt { argc: n, argv };
        let ours: Vec<String> = crt.iter().map(String::from_utf16_lossy).collect();
        assert_eq!(ours, ["prog", "a b"]);
    }

    #[test]
    fn missing_crt_vector_falls_back() {
        let argc: c_int = 1;
        let unset: *mut *mut u16 = std::ptr::null_mut();

        // SAFETY: every pointer is null or refers to a live local.
        unsafe {
            assert!(crt_vector(std::ptr::null(), std::ptr::null()).is_none());
            assert!(crt_vector(&argc, std::ptr::null()).is_none());
            assert!(crt_vector(&argc, &unset).is_none());
        }
    }
}
