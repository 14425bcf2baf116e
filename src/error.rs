// ── Central error type ────────────────────────────────────────────────────────
//
// Every failure this layer can raise is fatal: `launch::fatal` turns a
// `LaunchError` into a diagnostic and aborts before the downstream runs.
// The downstream's own status is never an error here; it is an `i32`.

/// Every error that the bootstrap layer can produce.
#[derive(Debug)]
pub enum LaunchError {
    /// Reserving memory for the canonical vector or one of its strings failed.
    OutOfMemory {
        /// Number of bytes that could not be reserved.
        bytes: usize,
    },

    /// A wide argument holds a code unit with no UTF-8 C-string form: an
    /// unpaired surrogate, or NUL.
    EncodingConversion {
        /// Position of the argument in the native vector.
        index: usize,
        /// The offending UTF-16 code unit.
        unit: u16,
        /// Offset of the unit within the argument, in code units.
        offset: usize,
    },

    /// The OS refused to hand over the native argument vector.
    #[cfg(windows)]
    ArgumentRetrieval {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfMemory { bytes } => {
                write!(f, "out of memory reserving {bytes} bytes for the argument vector")
            }
            Self::EncodingConversion {
                index,
                unit,
                offset,
            } => write!(
                f,
                "argument {index} cannot be converted to UTF-8: code unit {unit:#06x} at offset {offset}"
            ),
            #[cfg(windows)]
            Self::ArgumentRetrieval { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LaunchError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
