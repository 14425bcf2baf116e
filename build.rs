/// Launchpad build script.
///
/// Picks the one process entry variant compiled into this build and passes
/// the matching subsystem / entry symbol to the linker for our binaries.
///
/// | Target            | Feature `windowed` | `launch_entry` | Entry symbol |
/// |-------------------|--------------------|----------------|--------------|
/// | Windows           | on                 | `windowed`     | `wWinMain`   |
/// | Windows           | off                | `console`      | `wmain`      |
/// | anything else     | ignored            | `generic`      | `main`       |
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_env = std::env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
    let windowed = std::env::var_os("CARGO_FEATURE_WINDOWED").is_some();
    let discrete_gpu = std::env::var_os("CARGO_FEATURE_DISCRETE_GPU").is_some();

    println!("cargo::rerun-if-changed=build.rs");
    println!(
        "cargo::rustc-check-cfg=cfg(launch_entry, values(\"windowed\", \"console\", \"generic\"))"
    );

    let entry = match (target_os.as_str(), windowed) {
        ("windows", true) => "windowed",
        ("windows", false) => "console",
        _ => "generic",
    };
    println!("cargo::rustc-cfg=launch_entry=\"{entry}\"");

    if target_os != "windows" {
        return;
    }

    // ── Linker: subsystem and CRT entry ───────────────────────────────────────
    // The binary is `#![no_main]`; the CRT startup routine named here calls
    // the wide entry symbol that `entry_point!` defines.
    match (target_env.as_str(), entry) {
        ("msvc", "windowed") => {
            println!("cargo::rustc-link-arg-bins=/SUBSYSTEM:WINDOWS");
            println!("cargo::rustc-link-arg-bins=/ENTRY:wWinMainCRTStartup");
        }
        ("msvc", _) => {
            println!("cargo::rustc-link-arg-bins=/SUBSYSTEM:CONSOLE");
            println!("cargo::rustc-link-arg-bins=/ENTRY:wmainCRTStartup");
        }
        ("gnu", "windowed") => {
            println!("cargo::rustc-link-arg-bins=-municode");
            println!("cargo::rustc-link-arg-bins=-mwindows");
        }
        ("gnu", _) => {
            println!("cargo::rustc-link-arg-bins=-municode");
        }
        _ => {}
    }

    // Executables do not export `#[no_mangle]` statics on their own; the GPU
    // drivers look the hints up in the export table.
    if discrete_gpu && target_env == "msvc" {
        println!("cargo::rustc-link-arg-bins=/EXPORT:NvOptimusEnablement,DATA");
        println!("cargo::rustc-link-arg-bins=/EXPORT:AmdPowerXpressRequestHighPerformance,DATA");
    } else if discrete_gpu && target_env == "gnu" {
        println!("cargo::rustc-link-arg-bins=-Wl,--export-all-symbols");
    }
}
