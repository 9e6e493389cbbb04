//! Host identity used by the diagnostic method calls.

/// Static facts about the host application and OS.
pub trait PlatformInfo: Send + Sync {
    /// Human-readable OS version, e.g. `"Android 14"`.
    fn platform_version(&self) -> String;

    /// Application identifier, e.g. `"com.example.alerts"`.
    fn package_name(&self) -> String;
}
