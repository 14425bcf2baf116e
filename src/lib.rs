//! Process bootstrap for native launchers.
//!
//! Everything that has to happen between the OS calling into the executable
//! and the application's own `run` function:
//!
//! 1. **Entry selection** – [`entry_point!`] defines the one OS entry symbol
//!    chosen for this build (`wWinMain`, `wmain`, or C `main`).
//! 2. **Normalization** – [`CanonicalArgs`] brings whatever argument vector
//!    that entry receives into NUL-terminated byte strings, keeping count and
//!    order: wide arguments become UTF-8, byte arguments pass through as-is.
//! 3. **Dispatch** – [`launch`] prepares the process, calls the
//!    [`Downstream`] exactly once and returns its status as the exit code.
//!
//! The entry variant is a build-time decision made in `build.rs` from the
//! target and the `windowed` feature; see the table there.

// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform` (raw argv, Win32 FFI,
// FP control registers) and the items `entry_point!` expands to.
// Each unsafe block in those places MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

pub mod args;
pub mod error;
pub mod launch;

#[doc(hidden)]
pub mod platform;

pub use args::CanonicalArgs;
pub use error::{LaunchError, Result};
pub use launch::{launch, Downstream};

// ── Entry point ───────────────────────────────────────────────────────────────
//
// One definition of `entry_point!` exists per build. Invoke it once, at the
// root of a `#![no_main]` binary:
//
//     #![no_main]
//     fn run(args: &launchpad::CanonicalArgs<'_>) -> i32 { 0 }
//     launchpad::entry_point!(run);

/// Define the GUI-subsystem entry `wWinMain`.
///
/// The instance handles, command line and show state are ignored; arguments
/// come from the vector the C runtime already split for this process.
#[cfg(launch_entry = "windowed")]
#[macro_export]
macro_rules! entry_point {
    ($run:expr) => {
        $crate::process_hints!();

        #[no_mangle]
        #[allow(non_snake_case, unsafe_code)]
        pub extern "system" fn wWinMain(
            _instance: $crate::platform::win32::HINSTANCE,
            _prev_instance: $crate::platform::win32::HINSTANCE,
            _cmd_line: $crate::platform::win32::PWSTR,
            _show_cmd: ::core::ffi::c_int,
        ) -> ::core::ffi::c_int {
            $crate::platform::windowed_main($run)
        }
    };
}

/// Define the console entry `wmain`.
#[cfg(launch_entry = "console")]
#[macro_export]
macro_rules! entry_point {
    ($run:expr) => {
        $crate::process_hints!();

        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn wmain(
            argc: ::core::ffi::c_int,
            argv: *const *const u16,
        ) -> ::core::ffi::c_int {
            // SAFETY: the CRT calls wmain with argc NUL-terminated wide
            // strings that live until wmain returns.
            unsafe { $crate::platform::console_main(argc, argv, $run) }
        }
    };
}

/// Define the C entry `main`.
#[cfg(launch_entry = "generic")]
#[macro_export]
macro_rules! entry_point {
    ($run:expr) => {
        $crate::process_hints!();

        #[no_mangle]
        #[allow(unsafe_code)]
        pub extern "C" fn main(
            argc: ::core::ffi::c_int,
            argv: *const *const ::core::ffi::c_char,
        ) -> ::core::ffi::c_int {
            // SAFETY: the C runtime calls main with argc NUL-terminated
            // strings that live until main returns.
            unsafe { $crate::platform::generic_main(argc, argv, $run) }
        }
    };
}

// ── Link-time process hints ───────────────────────────────────────────────────

/// Symbols the C runtime or the graphics drivers look up in the executable.
///
/// `_CRT_glob = 0` stops the MinGW runtime from expanding wildcards in the
/// arguments before `wmain` sees them.
#[cfg(not(feature = "discrete-gpu"))]
#[doc(hidden)]
#[macro_export]
macro_rules! process_hints {
    () => {
        #[cfg(all(windows, target_env = "gnu"))]
        #[no_mangle]
        #[used]
        #[allow(non_upper_case_globals, unsafe_code)]
        pub static _CRT_glob: ::core::ffi::c_int = 0;
    };
}

/// As above, plus the hybrid-graphics hints that ask NVIDIA Optimus and AMD
/// PowerXpress to run the process on the dedicated GPU.
#[cfg(feature = "discrete-gpu")]
#[doc(hidden)]
#[macro_export]
macro_rules! process_hints {
    () => {
        #[cfg(all(windows, target_env = "gnu"))]
        #[no_mangle]
        #[used]
        #[allow(non_upper_case_globals, unsafe_code)]
        pub static _CRT_glob: ::core::ffi::c_int = 0;

        #[cfg(windows)]
        #[no_mangle]
        #[used]
        #[allow(non_upper_case_globals, unsafe_code)]
        pub static NvOptimusEnablement: u32 = 0x0000_0001;

        #[cfg(windows)]
        #[no_mangle]
        #[used]
        #[allow(non_upper_case_globals, unsafe_code)]
        pub static AmdPowerXpressRequestHighPerformance: i32 = 1;
    };
}
