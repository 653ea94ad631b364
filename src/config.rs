use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityPolicy, Version};

/// Knobs for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Availability platform name as libclang spells it (`macos`, `ios`, ...).
    pub platform: String,
    pub deployment_target: Option<Version>,
    /// Keep only interfaces declared under `<Name>.framework/`.
    pub framework: Option<String>,
    pub include_deprecated: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            platform: "macos".to_string(),
            deployment_target: None,
            framework: None,
            include_deprecated: false,
        }
    }
}

impl ExtractOptions {
    pub fn policy(&self) -> AvailabilityPolicy {
        AvailabilityPolicy {
            platform: self.platform.clone(),
            deployment_target: self.deployment_target,
            include_deprecated: self.include_deprecated,
        }
    }

    /// Path fragment every header of the selected framework contains.
    pub fn framework_marker(&self) -> Option<String> {
        self.framework.as_ref().map(|name| format!("/{name}.framework/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: ExtractOptions =
            serde_json::from_str(r#"{ "deploymentTarget": "12.3", "framework": "AppKit" }"#).unwrap();
        assert_eq!(options.platform, "macos");
        assert_eq!(options.deployment_target, Some(Version::new(12, 3)));
        assert_eq!(options.framework_marker().as_deref(), Some("/AppKit.framework/"));
        assert!(!options.include_deprecated);
    }

    #[test]
    fn policy_mirrors_options() {
        let options = ExtractOptions { platform: "ios".into(), include_deprecated: true, ..Default::default() };
        let policy = options.policy();
        assert_eq!(policy.platform, "ios");
        assert!(policy.include_deprecated);
        assert_eq!(policy.deployment_target, None);
    }
}
