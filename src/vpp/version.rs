//! Version gate
//!
//! Dataplane release 23.x renamed a handful of calls to `_v2` variants with the
//! same semantics but 64-bit safe fields. This module is the only place that
//! looks at the version; reconcilers ask it for the wire name of a call.

use std::fmt;
use thiserror::Error;

/// First major release that only speaks the `_v2` call shapes
const V2_AFTER_MAJOR: i32 = 22;

/// Version string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed dataplane version {version:?}: expected YY.MM[suffix]")]
pub struct MalformedVersion {
    pub version: String,
}

/// Parsed `YY.MM[suffix]` version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTuple {
    pub major: i32,
    pub minor: i32,
    pub has_suffix: bool,
}

impl VersionTuple {
    /// Select the call shape for this dataplane
    pub fn variant(&self) -> Variant {
        if self.major > V2_AFTER_MAJOR {
            Variant::V2
        } else {
            Variant::Legacy
        }
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.major, self.minor)?;
        if self.has_suffix {
            write!(f, "+")?;
        }
        Ok(())
    }
}

/// One of the two wire-compatible shapes of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Legacy,
    V2,
}

impl Variant {
    /// Wire message name for a logical call
    pub fn message(self, call: &str) -> String {
        match self {
            Variant::Legacy => call.to_string(),
            Variant::V2 => format!("{}_v2", call),
        }
    }
}

/// Parse a dataplane version string such as `23.10-rc0~8-g1ec4ae0a2`
pub fn classify(version: &str) -> Result<VersionTuple, MalformedVersion> {
    let malformed = || MalformedVersion {
        version: version.to_string(),
    };

    let major = clamped_slice(version, 0, 2)
        .parse::<i32>()
        .map_err(|_| malformed())?;
    let minor = clamped_slice(version, 3, 5)
        .parse::<i32>()
        .map_err(|_| malformed())?;
    let has_suffix = version.chars().count() > 5;

    Ok(VersionTuple {
        major,
        minor,
        has_suffix,
    })
}

/// Character slice `[start:end]`, clamped to the string length
fn clamped_slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}
