//! Method access flags and the access-flag filter used during tree construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Bitmask of method visibility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessFlags(u32);

impl AccessFlags {
    pub const NONE: AccessFlags = AccessFlags(0x0);
    pub const PUBLIC: AccessFlags = AccessFlags(0x1);
    pub const PRIVATE: AccessFlags = AccessFlags(0x2);
    pub const PROTECTED: AccessFlags = AccessFlags(0x4);
    pub const PACKAGE_PRIVATE: AccessFlags = AccessFlags(0x8);

    const NAMED: [(AccessFlags, &'static str); 4] = [
        (AccessFlags::PUBLIC, "public"),
        (AccessFlags::PRIVATE, "private"),
        (AccessFlags::PROTECTED, "protected"),
        (AccessFlags::PACKAGE_PRIVATE, "package"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        AccessFlags(bits & 0xf)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: AccessFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: AccessFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Filter that keeps only public methods
    pub const fn public_only_filter() -> Self {
        AccessFlags(Self::PRIVATE.0 | Self::PROTECTED.0 | Self::PACKAGE_PRIVATE.0)
    }

    /// Derive the flags from individual modifiers. A method that is neither
    /// public, private nor protected is package-private.
    pub fn of(is_public: bool, is_private: bool, is_protected: bool) -> Self {
        if is_public {
            Self::PUBLIC
        } else if is_private {
            Self::PRIVATE
        } else if is_protected {
            Self::PROTECTED
        } else {
            Self::PACKAGE_PRIVATE
        }
    }

    /// Whether a method with these flags survives `filter`.
    ///
    /// Methods without any visibility flag never pass.
    pub const fn passes(self, filter: AccessFlags) -> bool {
        self.0 != 0 && !self.intersects(filter)
    }
}

impl BitOr for AccessFlags {
    type Output = AccessFlags;

    fn bitor(self, rhs: AccessFlags) -> AccessFlags {
        AccessFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

impl FromStr for AccessFlags {
    type Err = String;

    /// Parse `|`- or `,`-separated flag names, e.g. `private|protected`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = AccessFlags::NONE;
        for token in s.split(['|', ',']).map(str::trim).filter(|t| !t.is_empty()) {
            let flag = match token.to_ascii_lowercase().as_str() {
                "public" => AccessFlags::PUBLIC,
                "private" => AccessFlags::PRIVATE,
                "protected" => AccessFlags::PROTECTED,
                "package" | "package-private" => AccessFlags::PACKAGE_PRIVATE,
                "none" => AccessFlags::NONE,
                other => return Err(format!("unknown access flag '{}'", other)),
            };
            flags = flags | flag;
        }
        Ok(flags)
    }
}

/// Accepted serialized forms: a raw bitmask or flag names
#[derive(Deserialize)]
#[serde(untagged)]
enum AccessSpec {
    Bits(u32),
    Names(String),
}

/// Deserialize either a bitmask or flag names. Used for hand-written class
/// dumps; persisted profiles always carry the plain bitmask.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<AccessFlags, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match AccessSpec::deserialize(deserializer)? {
        AccessSpec::Bits(bits) => Ok(AccessFlags::from_bits(bits)),
        AccessSpec::Names(names) => names.parse().map_err(serde::de::Error::custom),
    }
}
