//! Build identity reporting.

use tracing::info;

/// Version injected by the build system through `VECCAP_VERSION`.
pub const BUILD_VERSION: Option<&str> = option_env!("VECCAP_VERSION");

/// Human-readable build identity.
///
/// `veccap version: <version>[-gpu][ (DEBUG)]`, with `unknown` when the
/// build did not provide a version.
pub fn version_string() -> String {
    let mut msg = String::from("veccap version: ");

    match BUILD_VERSION {
        Some(version) => {
            msg.push_str(version);
            if cfg!(feature = "accelerator-clustering") {
                msg.push_str("-gpu");
            }
        }
        None => msg.push_str("unknown"),
    }

    if cfg!(debug_assertions) {
        msg.push_str(" (DEBUG)");
    }

    msg
}

/// Log the build identity.
pub fn report_version() {
    info!("{}", version_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string() {
        let version = version_string();
        assert!(version.starts_with("veccap version: "));

        match BUILD_VERSION {
            Some(v) => assert!(version.contains(v)),
            None => assert!(version.contains("unknown")),
        }

        assert_eq!(version.ends_with(" (DEBUG)"), cfg!(debug_assertions));
    }
}
