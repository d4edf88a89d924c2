//! Build metadata and storage format version.
//! Includes the version.rs generated by the build script.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Storage format version from `[package.metadata]`.
/// Falls back to 1 if the generated value cannot be parsed.
pub fn state_format_version() -> u32 {
    STATE_FORMAT_VERSION.parse().unwrap_or(1)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}
