// ── Argument encoding normalizer ──────────────────────────────────────────────
//
// Turns the native argument vector into the canonical one: N NUL-terminated
// byte strings, same count, same order. Wide (UTF-16) input is converted into
// exact-fit UTF-8 heap strings. Byte input is already in the OS's canonical
// form and is borrowed verbatim; its content is not inspected.
//
// All memory is reserved fallibly so that exhaustion surfaces as
// `LaunchError::OutOfMemory` instead of the allocator's own abort.

use std::borrow::Cow;
use std::ffi::{c_char, c_int, CStr, CString};

use log::trace;

use crate::error::{LaunchError, Result};

// ── Memory seam ───────────────────────────────────────────────────────────────

/// Source of capacity for the canonical vector.
pub(crate) trait Reserve {
    /// Grow `buf` so that `additional` more elements fit without reallocating.
    fn reserve<T>(&mut self, buf: &mut Vec<T>, additional: usize) -> Result<()>;
}

/// The global allocator, reserved fallibly.
pub(crate) struct Heap;

impl Reserve for Heap {
    fn reserve<T>(&mut self, buf: &mut Vec<T>, additional: usize) -> Result<()> {
        buf.try_reserve_exact(additional)
            .map_err(|_| LaunchError::OutOfMemory {
                bytes: additional.saturating_mul(std::mem::size_of::<T>()),
            })
    }
}

// ── CanonicalArgs ─────────────────────────────────────────────────────────────

/// The canonical argument vector handed to the downstream.
///
/// Every element is NUL-terminated. Arguments converted from UTF-16 are
/// UTF-8; arguments adopted from a byte vector are the OS bytes, untouched.
/// Alongside the strings we keep a C-style pointer array (`argv[len] == NULL`),
/// so a downstream with a `main(argc, argv)` signature can take
/// [`argc`](Self::argc) and [`argv`](Self::argv) directly.
///
/// Owned strings are released when the value is dropped.
pub struct CanonicalArgs<'a> {
    args: Vec<Cow<'a, CStr>>,
    /// `argv[i]` points into `args[i]`; one extra trailing NULL.
    argv: Vec<*const c_char>,
}

impl<'a> CanonicalArgs<'a> {
    /// Convert a wide (UTF-16) native vector.
    ///
    /// Surrogate pairs become one four-byte UTF-8 sequence. A code unit with
    /// no place in a UTF-8 C string (an unpaired surrogate, or NUL) is
    /// rejected rather than replaced.
    pub fn from_wide<'w, I>(native: I) -> Result<CanonicalArgs<'static>>
    where
        I: ExactSizeIterator<Item = &'w [u16]>,
    {
        CanonicalArgs::from_wide_in(native, &mut Heap)
    }

    /// Adopt a native byte-string vector.
    ///
    /// Arguments are borrowed, not copied or validated: the result is the
    /// identity on the OS's own vector. Only the pointer array is allocated.
    pub fn from_bytes<I>(native: I) -> Result<CanonicalArgs<'a>>
    where
        I: ExactSizeIterator<Item = &'a CStr>,
    {
        CanonicalArgs::from_bytes_in(native, &mut Heap)
    }

    pub(crate) fn from_wide_in<'w, I, R>(native: I, mem: &mut R) -> Result<CanonicalArgs<'static>>
    where
        I: ExactSizeIterator<Item = &'w [u16]>,
        R: Reserve,
    {
        let mut canonical = CanonicalArgs::with_capacity(native.len(), mem)?;
        for (index, wide) in native.enumerate() {
            let arg = wide_to_utf8(index, wide, mem)?;
            canonical.push(Cow::Owned(arg));
        }
        trace!("normalized {} wide argument(s)", canonical.len());
        Ok(canonical)
    }

    pub(crate) fn from_bytes_in<I, R>(native: I, mem: &mut R) -> Result<CanonicalArgs<'a>>
    where
        I: ExactSizeIterator<Item = &'a CStr>,
        R: Reserve,
    {
        let mut canonical = CanonicalArgs::with_capacity(native.len(), mem)?;
        for arg in native {
            canonical.push(Cow::Borrowed(arg));
        }
        trace!("adopted {} byte argument(s)", canonical.len());
        Ok(canonical)
    }

    fn with_capacity<R: Reserve>(count: usize, mem: &mut R) -> Result<Self> {
        let mut args = Vec::new();
        let mut argv = Vec::new();
        mem.reserve(&mut args, count)?;
        mem.reserve(&mut argv, count.saturating_add(1))?;
        argv.push(std::ptr::null());
        Ok(Self { args, argv })
    }

    /// Append one argument. Capacity was reserved up front, so neither push
    /// reallocates.
    fn push(&mut self, arg: Cow<'a, CStr>) {
        self.argv.pop();
        self.argv.push(arg.as_ptr());
        self.argv.push(std::ptr::null());
        self.args.push(arg);
    }

    /// Number of arguments, including the program name if the OS passed one.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The argument at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&CStr> {
        self.args.get(index).map(|a| &**a)
    }

    /// Arguments in native order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CStr> + '_ {
        self.args.iter().map(|a| &**a)
    }

    /// Argument count as a C `int`.
    pub fn argc(&self) -> c_int {
        c_int::try_from(self.args.len()).unwrap_or(c_int::MAX)
    }

    /// C-style argument array: `argc()` string pointers followed by NULL.
    ///
    /// Valid for as long as `self` is alive and unmodified.
    pub fn argv(&self) -> *const *const c_char {
        self.argv.as_ptr()
    }
}

impl std::fmt::Debug for CanonicalArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ── UTF-16 → UTF-8 ────────────────────────────────────────────────────────────

/// Convert one wide argument into an exact-fit, NUL-terminated UTF-8 string.
///
/// Two passes: the first validates and sizes, the second encodes into a
/// buffer reserved for exactly `len + 1` bytes.
fn wide_to_utf8<R: Reserve>(index: usize, wide: &[u16], mem: &mut R) -> Result<CString> {
    let unrepresentable = |unit: u16, offset: usize| LaunchError::EncodingConversion {
        index,
        unit,
        offset,
    };

    let mut len = 0usize;
    let mut offset = 0usize;
    for decoded in char::decode_utf16(wide.iter().copied()) {
        match decoded {
            Ok(c) => {
                len += c.len_utf8();
                offset += c.len_utf16();
            }
            Err(e) => return Err(unrepresentable(e.unpaired_surrogate(), offset)),
        }
    }

    let mut buf = Vec::new();
    mem.reserve(&mut buf, len + 1)?;
    let mut scratch = [0u8; 4];
    for c in char::decode_utf16(wide.iter().copied()).flatten() {
        buf.extend_from_slice(c.encode_utf8(&mut scratch).as_bytes());
    }
    buf.push(0);

    // A NUL code unit encodes to a NUL byte, which would end the C string early.
    CString::from_vec_with_nul(buf).map_err(|_| {
        unrepresentable(0, wide.iter().position(|&u| u == 0).unwrap_or(wide.len()))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
