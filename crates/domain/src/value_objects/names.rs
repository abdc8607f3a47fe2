//! Validated name newtypes for factions
//!
//! Faction names are bounded by configuration-supplied limits, so unlike the
//! cosmetic fields they take their bounds as an input instead of a constant.
//! Uniqueness is case-insensitive; `FactionName::key()` is the comparison key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for faction tags
const MAX_TAG_LENGTH: usize = 4;

/// Maximum length for faction descriptions
const MAX_DESCRIPTION_LENGTH: usize = 256;

// ============================================================================
// NameBounds
// ============================================================================

/// Inclusive character-count bounds for faction names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBounds {
    pub min: usize,
    pub max: usize,
}

impl NameBounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Why a proposed faction name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FactionNameError {
    #[error("Faction name must be at least {min} characters")]
    TooShort { min: usize },
    #[error("Faction name cannot exceed {max} characters")]
    TooLong { max: usize },
}

// ============================================================================
// FactionName
// ============================================================================

/// A validated faction display name (trimmed, within the configured bounds)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionName(String);

impl FactionName {
    /// Create a new validated faction name.
    ///
    /// Length is counted in characters after trimming.
    ///
    /// # Errors
    ///
    /// Returns `FactionNameError::TooShort` / `TooLong` when the trimmed name
    /// falls outside `bounds`.
    pub fn new(name: impl Into<String>, bounds: NameBounds) -> Result<Self, FactionNameError> {
        let name = name.into();
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if len < bounds.min || len == 0 {
            return Err(FactionNameError::TooShort {
                min: bounds.min.max(1),
            });
        }
        if len > bounds.max {
            return Err(FactionNameError::TooLong { max: bounds.max });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive key used for uniqueness checks and lookups.
    pub fn key(&self) -> String {
        name_key(&self.0)
    }
}

/// Normalizes a raw name into the case-insensitive lookup key.
pub fn name_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl fmt::Display for FactionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FactionName> for String {
    fn from(name: FactionName) -> String {
        name.0
    }
}

// ============================================================================
// FactionTag
// ============================================================================

/// Short uppercase tag shown next to member names (1-4 alphanumeric chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FactionTag(String);

impl FactionTag {
    pub fn new(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Faction tag cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TAG_LENGTH {
            return Err(DomainError::validation(format!(
                "Faction tag cannot exceed {} characters",
                MAX_TAG_LENGTH
            )));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(
                "Faction tag must be alphanumeric",
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FactionTag {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FactionTag> for String {
    fn from(tag: FactionTag) -> String {
        tag.0
    }
}

// ============================================================================
// FactionColor
// ============================================================================

/// Display color as a `#RRGGBB` hex string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FactionColor(String);

impl FactionColor {
    pub fn new(color: impl Into<String>) -> Result<Self, DomainError> {
        let color = color.into();
        let trimmed = color.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::validation(format!(
                "Faction color must be #RRGGBB, got '{}'",
                trimmed
            )));
        }
        Ok(Self(format!("#{}", hex.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FactionColor {
    fn default() -> Self {
        Self("#FFFFFF".to_string())
    }
}

impl fmt::Display for FactionColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FactionColor {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FactionColor> for String {
    fn from(color: FactionColor) -> String {
        color.0
    }
}

// ============================================================================
// Description
// ============================================================================

/// A validated faction description (may be empty, <=256 chars, trimmed)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the description exceeds 256 characters.
    pub fn new(description: impl Into<String>) -> Result<Self, DomainError> {
        let description = description.into();
        let trimmed = description.trim();
        if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DomainError::validation(format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Description {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Description> for String {
    fn from(description: Description) -> String {
        description.0
    }
}
