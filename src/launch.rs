// ── Launch dispatcher ─────────────────────────────────────────────────────────
//
// Last stop before the application proper: adjust the process environment,
// hand the canonical vector to the downstream exactly once, and return its
// status untouched. A failed normalization never gets this far; it ends in
// `fatal`, which does not return.

use std::io::Write as _;

use log::debug;

use crate::{
    args::CanonicalArgs,
    error::{LaunchError, Result},
};

/// The application logic behind the bootstrap layer.
///
/// `run` takes `self` by value, so a downstream is invoked at most once.
/// Whatever it returns becomes the process exit status.
pub trait Downstream {
    fn run(self, args: &CanonicalArgs<'_>) -> i32;
}

impl<F> Downstream for F
where
    F: FnOnce(&CanonicalArgs<'_>) -> i32,
{
    fn run(self, args: &CanonicalArgs<'_>) -> i32 {
        self(args)
    }
}

/// Dispatch a normalized vector, or die trying.
///
/// On `Ok`, returns the downstream's status unchanged. On `Err`, reports the
/// error and aborts the process; the downstream is not invoked.
pub fn launch<D: Downstream>(normalized: Result<CanonicalArgs<'_>>, downstream: D) -> i32 {
    match try_launch(normalized, downstream) {
        Ok(status) => status,
        Err(e) => fatal(&e),
    }
}

/// [`launch`] without the abort: the error comes back to the caller.
pub(crate) fn try_launch<D: Downstream>(
    normalized: Result<CanonicalArgs<'_>>,
    downstream: D,
) -> Result<i32> {
    let args = normalized?;
    Ok(dispatch(args, downstream))
}

/// Prepare the process and run the downstream on `args`.
///
/// `args` is dropped, and its memory released, once the downstream returns.
pub fn dispatch<D: Downstream>(args: CanonicalArgs<'_>, downstream: D) -> i32 {
    prepare_process();
    debug!("dispatching {} argument(s)", args.len());
    let status = downstream.run(&args);
    debug!("downstream returned {status}");
    status
}

/// Process-wide adjustments the downstream expects to find in place.
///
/// Wildcard expansion is not handled here: it is switched off at link time
/// by the `_CRT_glob` symbol that `entry_point!` emits on MinGW.
pub fn prepare_process() {
    crate::platform::fenv::clear_overflow_trap();
}

/// Report `error` and abort the process. The downstream is never reached.
pub fn fatal(error: &LaunchError) -> ! {
    log::error!("{error}");
    // stderr may be detached (windowed builds); nothing to do if so.
    let _ = writeln!(std::io::stderr(), "launchpad: fatal: {error}");
    #[cfg(launch_entry = "windowed")]
    crate::platform::win32::show_error_dialog(&format!("launchpad: fatal: {error}"));
    std::process::abort()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn canonical(args: &[&str]) -> CanonicalArgs<'static> {
        let native: Vec<Vec<u16>> = args.iter().map(|a| a.encode_utf16().collect()).collect();
        CanonicalArgs::from_wide(native.iter().map(Vec::as_slice)).expect("normalize")
    }

    #[test]
    fn status_zero_is_forwarded() {
        assert_eq!(launch(Ok(canonical(&["prog"])), |_: &CanonicalArgs<'_>| 0), 0);
    }

    #[test]
    fn status_forty_two_is_forwarded() {
        assert_eq!(launch(Ok(canonical(&["prog"])), |_: &CanonicalArgs<'_>| 42), 42);
    }

    #[test]
    fn negative_status_is_not_reinterpreted() {
        assert_eq!(dispatch(canonical(&[]), |_: &CanonicalArgs<'_>| -1), -1);
    }

    #[test]
    fn empty_vector_still_dispatches() {
        let calls = Cell::new(0);
        let status = dispatch(canonical(&[]), |args: &CanonicalArgs<'_>| {
            calls.set(calls.get() + 1);
            assert_eq!(args.argc(), 0);
            assert!(args.is_empty());
            7
        });
        assert_eq!(status, 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn downstream_sees_arguments_in_order() {
        let input = ["prog", "h\u{e9}llo", "\u{1F980}"];
        dispatch(canonical(&input), |args: &CanonicalArgs<'_>| {
            let seen: Vec<&str> = args.iter().filter_map(|a| a.to_str().ok()).collect();
            assert_eq!(seen, input);
            0
        });
    }

    #[test]
    fn failed_normalization_never_reaches_downstream() {
        let calls = Cell::new(0);
        let result = try_launch(Err(LaunchError::OutOfMemory { bytes: 64 }), |_: &CanonicalArgs<'_>| {
            calls.set(calls.get() + 1);
            0
        });
        assert!(matches!(result, Err(LaunchError::OutOfMemory { bytes: 64 })));
        assert_eq!(calls.get(), 0);
    }

    struct Recorder<'c> {
        seen: &'c Cell<Option<usize>>,
    }

    impl Downstream for Recorder<'_> {
        fn run(self, args: &CanonicalArgs<'_>) -> i32 {
            self.seen.set(Some(args.len()));
            3
        }
    }

    #[test]
    fn trait_downstream_runs_once_with_count() {
        let seen = Cell::new(None);
        let status = launch(Ok(canonical(&["a", "b"])), Recorder { seen: &seen });
        assert_eq!(status, 3);
        assert_eq!(seen.get(), Some(2));
    }
}
