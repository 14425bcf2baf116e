//! A failed normalization handed to `launch` ends the process abnormally.
//!
//! `launch` cannot return on that path, so the test re-runs this test binary
//! with `LAUNCHPAD_FATAL_CHILD` set; the child makes the call and the parent
//! inspects how it died.

// A windowed build would block on the error dialog.
#![cfg(not(feature = "windowed"))]

use std::process::{Command, Output};

use launchpad::{CanonicalArgs, LaunchError};

const CHILD_ENV: &str = "LAUNCHPAD_FATAL_CHILD";
const REACHED: &str = "downstream reached";

fn run_in_child(test_name: &str) -> Output {
    Command::new(std::env::current_exe().expect("test binary path"))
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("spawn child test process")
}

#[test]
fn out_of_memory_aborts_without_running_downstream() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let status = launchpad::launch(
            Err(LaunchError::OutOfMemory { bytes: 64 }),
            |_: &CanonicalArgs<'_>| {
                println!("{REACHED}");
                0
            },
        );
        // Only reachable if `launch` returned; make that visible to the parent.
        println!("{REACHED}: launch returned {status}");
        std::process::exit(status);
    }

    let out = run_in_child("out_of_memory_aborts_without_running_downstream");
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert!(!stdout.contains(REACHED), "downstream ran:\n{stdout}");
    assert!(
        stderr.contains("launchpad: fatal: out of memory"),
        "missing diagnostic:\n{stderr}"
    );
    assert!(!out.status.success());

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(out.status.code(), None, "exited normally: {:?}", out.status);
        assert_eq!(out.status.signal(), Some(6), "not SIGABRT: {:?}", out.status);
    }
    #[cfg(windows)]
    {
        let code = out.status.code().expect("exit code");
        assert!(code != 0 && code != 64, "unexpected exit code {code:#x}");
    }
}
