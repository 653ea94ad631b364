//! Platform availability: raw annotations and the gate applied to them.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VersionParseError;

// ------------------------------- Version --------------------------------- //

/// `CXVersion`: `major[.minor[.subminor]]`. Missing components compare as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: Option<u32>,
    pub subminor: Option<u32>,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor: Some(minor), subminor: None }
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor.unwrap_or(0), self.subminor.unwrap_or(0))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool { self.key() == other.key() }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering { self.key().cmp(&other.key()) }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
            if let Some(subminor) = self.subminor {
                write!(f, ".{subminor}")?;
            }
        }
        Ok(())
    }
}

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?$").expect("static version pattern")
});

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_RE
            .captures(s.trim())
            .ok_or_else(|| VersionParseError(s.to_string()))?;
        let part = |i: usize| -> Result<Option<u32>, VersionParseError> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| VersionParseError(s.to_string())))
                .transpose()
        };
        Ok(Version {
            major: part(1)?.unwrap_or(0),
            minor: part(2)?,
            subminor: part(3)?,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Version> for String {
    fn from(value: Version) -> Self { value.to_string() }
}

// --------------------------- Raw annotations ----------------------------- //

/// One `CXPlatformAvailability` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoleted: Option<Version>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Everything `clang_getCursorPlatformAvailability` reports for a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAvailability {
    #[serde(default)]
    pub always_deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_message: Option<String>,
    #[serde(default)]
    pub always_unavailable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable_message: Option<String>,
    #[serde(default)]
    pub platforms: Vec<AvailabilityEntry>,
}

// --------------------------------- Gate ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    AlwaysUnavailable(Option<String>),
    MarkedUnavailable { platform: String },
    Obsoleted { platform: String, version: Version },
    NotYetIntroduced { platform: String, version: Version },
    AlwaysDeprecated(Option<String>),
    Deprecated { platform: String, version: Version },
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysUnavailable(Some(msg)) => write!(f, "unavailable: {msg}"),
            Self::AlwaysUnavailable(None) => f.write_str("unavailable"),
            Self::MarkedUnavailable { platform } => write!(f, "unavailable on {platform}"),
            Self::Obsoleted { platform, version } => write!(f, "obsoleted in {platform} {version}"),
            Self::NotYetIntroduced { platform, version } => {
                write!(f, "introduced in {platform} {version}")
            }
            Self::AlwaysDeprecated(Some(msg)) => write!(f, "deprecated: {msg}"),
            Self::AlwaysDeprecated(None) => f.write_str("deprecated"),
            Self::Deprecated { platform, version } => write!(f, "deprecated in {platform} {version}"),
        }
    }
}

/// Outcome of the gate. `Available` carries the entries copied onto the declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available(Vec<AvailabilityEntry>),
    Unavailable(UnavailableReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPolicy {
    pub platform: String,
    pub deployment_target: Option<Version>,
    pub include_deprecated: bool,
}

impl AvailabilityPolicy {
    pub fn check(&self, raw: PlatformAvailability) -> Availability {
        match self.reason(&raw) {
            Some(reason) => Availability::Unavailable(reason),
            None => Availability::Available(raw.platforms),
        }
    }

    fn reason(&self, raw: &PlatformAvailability) -> Option<UnavailableReason> {
        if raw.always_unavailable {
            return Some(UnavailableReason::AlwaysUnavailable(raw.unavailable_message.clone()));
        }

        // reached by the deployment target, or unconditionally when there is none
        let reached = |v: &Version| self.deployment_target.is_none_or(|t| *v <= t);

        for entry in raw.platforms.iter().filter(|e| e.platform.eq_ignore_ascii_case(&self.platform)) {
            let platform = entry.platform.clone();
            if entry.unavailable {
                return Some(UnavailableReason::MarkedUnavailable { platform });
            }
            if let Some(version) = entry.obsoleted.filter(|v| reached(v)) {
                return Some(UnavailableReason::Obsoleted { platform, version });
            }
            if let (Some(target), Some(version)) = (self.deployment_target, entry.introduced) {
                if version > target {
                    return Some(UnavailableReason::NotYetIntroduced { platform, version });
                }
            }
            if !self.include_deprecated {
                if let Some(version) = entry.deprecated.filter(|v| reached(v)) {
                    return Some(UnavailableReason::Deprecated { platform, version });
                }
            }
        }

        if raw.always_deprecated && !self.include_deprecated {
            return Some(UnavailableReason::AlwaysDeprecated(raw.deprecated_message.clone()));
        }
        None
    }
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self { platform: "macos".to_string(), deployment_target: None, include_deprecated: false }
    }
}
