// ── Raw argument vectors ──────────────────────────────────────────────────────
//
// Borrow the `argc`/`argv` pair an entry point receives as slices, without
// copying. The returned borrows are only as good as the caller's promise about
// the pointers; see the `# Safety` sections.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_int, CStr};

/// View `argc` wide strings as UTF-16 slices (terminator excluded).
///
/// A null `argv` or non-positive `argc` yields nothing. A null entry reads
/// as an empty argument so that the count is preserved.
///
/// # Safety
///
/// When `argv` is non-null it must point to at least `argc` pointers, each
/// null or pointing to a NUL-terminated UTF-16 string, and all of it must
/// stay valid and unmodified for `'a`.
pub unsafe fn wide_args<'a>(
    argc: c_int,
    argv: *const *const u16,
) -> impl ExactSizeIterator<Item = &'a [u16]> + 'a {
    let count = if argv.is_null() {
        0
    } else {
        usize::try_from(argc).unwrap_or(0)
    };
    (0..count).map(move |i| {
        // SAFETY: i < argc and argv holds argc entries (caller contract).
        let arg = unsafe { *argv.add(i) };
        // SAFETY: each entry is null or NUL-terminated (caller contract).
        unsafe { wide_str(arg) }
    })
}

/// View `argc` byte strings as `CStr`s.
///
/// Null handling matches [`wide_args`].
///
/// # Safety
///
/// Same as [`wide_args`], with NUL-terminated byte strings.
pub unsafe fn byte_args<'a>(
    argc: c_int,
    argv: *const *const c_char,
) -> impl ExactSizeIterator<Item = &'a CStr> + 'a {
    let count = if argv.is_null() {
        0
    } else {
        usize::try_from(argc).unwrap_or(0)
    };
    (0..count).map(move |i| {
        // SAFETY: i < argc and argv holds argc entries (caller contract).
        let arg = unsafe { *argv.add(i) };
        if arg.is_null() {
            c""
        } else {
            // SAFETY: non-null entries are NUL-terminated (caller contract).
            unsafe { CStr::from_ptr(arg) }
        }
    })
}

/// Length-scan a NUL-terminated wide string.
///
/// # Safety
///
/// `ptr` is null or points to a NUL-terminated UTF-16 string valid for `'a`.
unsafe fn wide_str<'a>(ptr: *const u16) -> &'a [u16] {
    if ptr.is_null() {
        return &[];
    }
    let mut len = 0usize;
    // SAFETY: every unit up to and including the terminator is readable.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: the `len` units before the terminator were just read.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
