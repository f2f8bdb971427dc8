//! Member capabilities
//!
//! Each declared member part requires a capability: reading a field or getter
//! needs `READ`, assigning through a field or setter needs `WRITE`, calling a
//! function needs `INVOKE`. A resolver is built with the set of capabilities
//! it may expose and drops member parts outside that set.
//!
//! Capabilities parse from configuration strings such as `"READ|INVOKE"`.

use std::fmt;

/// Capability flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability(u8);

impl Capability {
    /// Nothing exposed
    pub const NONE: Self = Self(0x00);
    /// Read fields and getters
    pub const READ: Self = Self(0x01);
    /// Assign fields and setters
    pub const WRITE: Self = Self(0x02);
    /// Invoke functions
    pub const INVOKE: Self = Self(0x04);

    // Common combinations
    /// READ | INVOKE
    pub const READ_ONLY: Self = Self(0x05);
    /// READ | WRITE | INVOKE
    pub const ALL: Self = Self(0x07);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if all flags of `other` are present
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of capabilities
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Difference (remove flags)
    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Parse a single capability name (case-insensitive) or a hex/decimal literal
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "READ" => Some(Self::READ),
            "WRITE" => Some(Self::WRITE),
            "INVOKE" => Some(Self::INVOKE),
            "READ_ONLY" => Some(Self::READ_ONLY),
            "ALL" => Some(Self::ALL),
            _ => {
                let bits = if let Some(hex) = s.strip_prefix("0x") {
                    u8::from_str_radix(hex, 16).ok()?
                } else {
                    s.parse::<u8>().ok()?
                };
                if bits & !Self::ALL.0 != 0 {
                    return None;
                }
                Some(Self(bits))
            }
        }
    }

    /// Parse pipe-separated flags, e.g. `"READ|INVOKE"`
    pub fn from_combined_str(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            result = result.union(Self::parse(part.trim())?);
        }
        Some(result)
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => write!(f, "NONE"),
            Self::ALL => write!(f, "ALL"),
            Self::READ_ONLY => write!(f, "READ_ONLY"),
            _ => {
                let names: Vec<&str> = [(Self::READ, "READ"), (Self::WRITE, "WRITE"), (Self::INVOKE, "INVOKE")]
                    .into_iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| name)
                    .collect();
                write!(f, "{}", names.join("|"))
            }
        }
    }
}
