//! `MAJOR.MINOR[.PATCH]` versions used by libraries and breadcrumb formats.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::VersionError;

/// A library or format version.
///
/// The patch component is optional. An unspecified patch orders and compares
/// equal to an explicit `0`, so `1.2 == 1.2.0 < 1.2.1`, while [`Display`]
/// keeps the original shape (`1.2` stays `1.2`).
///
/// [`Display`]: fmt::Display
#[derive(Debug, Clone, Copy, Eq)]
pub struct Version {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component, `None` when unspecified.
    pub patch: Option<u32>,
}

/// Which component first differs between two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDifference {
    /// The major components differ.
    Major,
    /// Same major, different minor.
    Minor,
    /// Same major and minor, different patch.
    Patch,
}

impl Version {
    /// Create a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    const fn key(&self) -> (u32, u32, u32) {
        let patch = match self.patch {
            Some(p) => p,
            None => 0,
        };
        (self.major, self.minor, patch)
    }

    /// Return the most significant differing component, or `None` if the
    /// versions are equal.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Option<VersionDifference> {
        if self.major != other.major {
            Some(VersionDifference::Major)
        } else if self.minor != other.minor {
            Some(VersionDifference::Minor)
        } else if self != other {
            Some(VersionDifference::Patch)
        } else {
            None
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError(s.to_string());
        let component = |part: &str| -> Result<u32, VersionError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.as_slice() {
            [major, minor] => Ok(Self::new(component(major)?, component(minor)?, None)),
            [major, minor, patch] => Ok(Self::new(
                component(major)?,
                component(minor)?,
                Some(component(patch)?),
            )),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
