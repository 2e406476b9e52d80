// src/platform.rs

//! Host platform naming.
//!
//! Tool command tables are keyed by these names, so they are part of the
//! config file contract: `linux`, `macosx`, `windows`.

/// Name of the platform this process is running on.
pub fn host_platform() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macosx"
    } else {
        "linux"
    }
}
