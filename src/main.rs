// ── launchpad echo ───────────────────────────────────────────────────────────
//
// Reference downstream for the bootstrap layer: prints the canonical argument
// vector it was handed as one JSON line and exits with status 0, or with N
// when given `--status=N`. Each argument appears twice: as text (lossy for
// non-UTF-8 bytes) and as its exact bytes.
//
// The OS entry symbol comes from `entry_point!`, so there is no Rust `main`.
#![no_main]
#![deny(unsafe_code)]

use std::{borrow::Cow, io::Write};

use launchpad::CanonicalArgs;
use serde::Serialize;

/// One line of output.
#[derive(Serialize)]
struct Echo<'a> {
    argc: usize,
    argv: Vec<Cow<'a, str>>,
    raw: Vec<&'a [u8]>,
}

/// The last `--status=N` wins; anything unparsable is ignored.
fn requested_status(args: &CanonicalArgs<'_>) -> i32 {
    args.iter()
        .skip(1)
        .filter_map(|a| a.to_str().ok()?.strip_prefix("--status="))
        .filter_map(|n| n.parse().ok())
        .last()
        .unwrap_or(0)
}

fn echo(args: &CanonicalArgs<'_>) -> i32 {
    let report = Echo {
        argc: args.len(),
        argv: args.iter().map(|a| a.to_string_lossy()).collect(),
        raw: args.iter().map(|a| a.to_bytes()).collect(),
    };

    // No Rust runtime to flush stdout at exit; do it before returning.
    let mut out = std::io::stdout().lock();
    let written = serde_json::to_writer(&mut out, &report)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(out))
        .and_then(|()| out.flush());
    if let Err(e) = written {
        let _ = writeln!(std::io::stderr(), "launchpad: cannot write output: {e}");
        return 1;
    }

    requested_status(args)
}

launchpad::entry_point!(echo);
