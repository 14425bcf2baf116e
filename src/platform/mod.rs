// ── Platform layer ────────────────────────────────────────────────────────────
//
// The only module tree (together with the expansion of `entry_point!`) where
// `unsafe` code is permitted. Every `unsafe` block MUST carry a `// SAFETY:`
// comment.
//
// Exactly one of the variant drivers below is compiled, matching the
// `launch_entry` cfg that build.rs emits. The `entry_point!` expansion calls
// it from the OS entry symbol; nothing else in the crate does.

#![allow(unsafe_code)]

pub mod argv;
pub(crate) mod fenv;

#[cfg(windows)]
pub mod win32;

#[cfg(any(launch_entry = "console", launch_entry = "generic"))]
use std::ffi::c_int;

#[cfg(any(
    launch_entry = "windowed",
    launch_entry = "console",
    launch_entry = "generic"
))]
use crate::{args::CanonicalArgs, launch::Downstream};

// ── Variant drivers ───────────────────────────────────────────────────────────

/// `wWinMain` body: the entry parameters carry nothing we use, so the wide
/// argv is taken from the CRT (or, failing that, split from the command line)
/// and any temporary copy is released right after conversion.
#[cfg(launch_entry = "windowed")]
pub fn windowed_main<D: Downstream>(downstream: D) -> std::ffi::c_int {
    let normalized = win32::ProcessArgs::retrieve()
        .and_then(|native| CanonicalArgs::from_wide(native.iter()));
    crate::launch::launch(normalized, downstream)
}

/// `wmain` body.
///
/// # Safety
///
/// `argv` must point to `argc` NUL-terminated wide strings, as the CRT
/// passes them to `wmain`.
#[cfg(launch_entry = "console")]
pub unsafe fn console_main<D: Downstream>(
    argc: c_int,
    argv: *const *const u16,
    downstream: D,
) -> c_int {
    // SAFETY: forwarded from the caller's contract.
    let native = unsafe { argv::wide_args(argc, argv) };
    crate::launch::launch(CanonicalArgs::from_wide(native), downstream)
}

/// C `main` body. The byte strings are borrowed for the whole call; the C
/// runtime keeps them alive until `main` returns.
///
/// # Safety
///
/// `argv` must point to `argc` NUL-terminated byte strings, as the C runtime
/// passes them to `main`.
#[cfg(launch_entry = "generic")]
pub unsafe fn generic_main<D: Downstream>(
    argc: c_int,
    argv: *const *const std::ffi::c_char,
    downstream: D,
) -> c_int {
    // SAFETY: forwarded from the caller's contract.
    let native = unsafe { argv::byte_args(argc, argv) };
    crate::launch::launch(CanonicalArgs::from_bytes(native), downstream)
}
