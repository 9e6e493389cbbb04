//! Desktop host identity

use bridge_traits::PlatformInfo;

/// Platform info derived from the compile target.
#[derive(Debug, Clone)]
pub struct DesktopPlatformInfo {
    package_name: String,
}

impl DesktopPlatformInfo {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }
}

impl PlatformInfo for DesktopPlatformInfo {
    fn platform_version(&self) -> String {
        format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
    }

    fn package_name(&self) -> String {
        self.package_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_version_names_os_and_arch() {
        let info = DesktopPlatformInfo::new("com.example.alerts");
        let version = info.platform_version();

        assert!(version.starts_with(std::env::consts::OS));
        assert!(version.ends_with(std::env::consts::ARCH));
        assert_eq!(info.package_name(), "com.example.alerts");
    }
}
