//! Target platform triple and its compact command-line token.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Os {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    Mac,
    /// Linux.
    Linux,
}

impl Os {
    /// Bit used by `<Restrict Platform="...">` masks.
    #[must_use]
    pub const fn flag(self) -> u16 {
        match self {
            Self::Windows => 0b001,
            Self::Mac => 0b010,
            Self::Linux => 0b100,
        }
    }

    const fn token(self) -> &'static str {
        match self {
            Self::Windows => "win",
            Self::Mac => "macosx",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Mac => write!(f, "mac"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Architecture {
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X64,
}

impl Architecture {
    /// Bit used by `<Restrict Architecture="...">` masks.
    #[must_use]
    pub const fn flag(self) -> u16 {
        match self {
            Self::X86 => 0b01,
            Self::X64 => 0b10,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86 => write!(f, "x86"),
            Self::X64 => write!(f, "x64"),
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Configuration {
    /// Debug build.
    Debug,
    /// Release build.
    Release,
}

impl Configuration {
    /// Bit used by `<Restrict Configuration="...">` masks.
    #[must_use]
    pub const fn flag(self) -> u16 {
        match self {
            Self::Debug => 0b01,
            Self::Release => 0b10,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// The platform a dependency tree is resolved and installed for.
///
/// Written on the command line as a compact token such as `win64d`
/// (`win|macosx|linux`, then `32|64`, then `d` for debug builds). The same
/// token names the per-platform output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub architecture: Architecture,
    /// Build configuration.
    pub configuration: Configuration,
}

impl Platform {
    /// Create a platform from its parts.
    #[must_use]
    pub const fn new(os: Os, architecture: Architecture, configuration: Configuration) -> Self {
        Self {
            os,
            architecture,
            configuration,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = match self.architecture {
            Architecture::X86 => "32",
            Architecture::X64 => "64",
        };
        let suffix = match self.configuration {
            Configuration::Debug => "d",
            Configuration::Release => "",
        };
        write!(f, "{}{bits}{suffix}", self.os.token())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPlatform(s.to_string());
        let token = s.trim();

        let (os, rest) = [Os::Windows, Os::Mac, Os::Linux]
            .into_iter()
            .find_map(|os| token.strip_prefix(os.token()).map(|rest| (os, rest)))
            .ok_or_else(invalid)?;

        let (architecture, configuration) = match rest {
            "32" => (Architecture::X86, Configuration::Release),
            "32d" => (Architecture::X86, Configuration::Debug),
            "64" => (Architecture::X64, Configuration::Release),
            "64d" => (Architecture::X64, Configuration::Debug),
            _ => return Err(invalid()),
        };
        Ok(Self::new(os, architecture, configuration))
    }
}
