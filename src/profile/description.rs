//! Library descriptions
//!
//! A description names a library version and is read from a small TOML file
//! next to the library artifact:
//!
//! ```toml
//! name = "OkHttp"
//! category = "Utilities"
//! version = "3.12.1"
//! date = "03.12.2018"
//! comment = "[SECURITY-FIX] certificate pinning bypass"
//! ```

use crate::error::ApiError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Release dates are written as `dd.MM.yyyy`
pub const DATE_FORMAT: &str = "%d.%m.%Y";

const SECURITY_MARKER: &str = "[SECURITY]";
const SECURITY_FIX_MARKER: &str = "[SECURITY-FIX]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LibraryCategory {
    Advertising,
    Analytics,
    Android,
    #[serde(alias = "Social Media", alias = "Social-Media")]
    SocialMedia,
    Cloud,
    Utilities,
}

impl LibraryCategory {
    pub const ALL: [LibraryCategory; 6] = [
        LibraryCategory::Advertising,
        LibraryCategory::Analytics,
        LibraryCategory::Android,
        LibraryCategory::SocialMedia,
        LibraryCategory::Cloud,
        LibraryCategory::Utilities,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LibraryCategory::Advertising => "Advertising",
            LibraryCategory::Analytics => "Analytics",
            LibraryCategory::Android => "Android",
            LibraryCategory::SocialMedia => "SocialMedia",
            LibraryCategory::Cloud => "Cloud",
            LibraryCategory::Utilities => "Utilities",
        }
    }
}

impl fmt::Display for LibraryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LibraryCategory {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        LibraryCategory::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == normalized)
            .ok_or_else(|| ApiError::DescriptionError(format!("Unknown library category: {}", s)))
    }
}

/// Security note attached to a library version through its comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityAdvisory {
    /// Version has a known vulnerability
    Vulnerable,
    /// Version fixes a known vulnerability
    Fix,
}

/// Name, category and optional version metadata of a library.
///
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescription {
    pub name: String,
    pub category: LibraryCategory,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, with = "date_format")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl LibraryDescription {
    pub fn new(name: impl Into<String>, category: LibraryCategory) -> Self {
        Self {
            name: name.into(),
            category,
            version: None,
            date: None,
            comment: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ApiError> {
        let desc: LibraryDescription = toml::from_str(content)
            .map_err(|e| ApiError::DescriptionError(format!("Failed to parse description: {}", e)))?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::DescriptionError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::DescriptionError(
                "Library name must not be empty".to_string(),
            ));
        }
        if self.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ApiError::DescriptionError(format!(
                "Empty version string for library {}",
                self.name
            )));
        }
        Ok(())
    }

    /// Version or `"--"` when unknown
    pub fn version_or_placeholder(&self) -> &str {
        self.version.as_deref().unwrap_or("--")
    }

    pub fn formatted_date(&self) -> String {
        match self.date {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => "---".to_string(),
        }
    }

    /// `[SECURITY-FIX]` takes precedence over `[SECURITY]`
    pub fn security_advisory(&self) -> Option<SecurityAdvisory> {
        let comment = self.comment.as_deref()?;
        if comment.contains(SECURITY_FIX_MARKER) {
            Some(SecurityAdvisory::Fix)
        } else if comment.contains(SECURITY_MARKER) {
            Some(SecurityAdvisory::Vulnerable)
        } else {
            None
        }
    }

    /// `name_version` with spaces replaced, used as profile file stem
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            self.name.trim().replace(' ', "-"),
            self.version_or_placeholder().trim().replace(' ', "-")
        )
    }

    /// Multi-line human-readable summary
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("        name: {}", self.name),
            format!("    category: {}", self.category),
            format!("     version: {}", self.version_or_placeholder()),
            format!("release-date: {}", self.formatted_date()),
            format!(
                "     comment: {}",
                self.comment.as_deref().unwrap_or("--")
            ),
        ]
    }
}

impl fmt::Display for LibraryDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version_or_placeholder())
    }
}

mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&d.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", s, e))),
            _ => Ok(None),
        }
    }
}
