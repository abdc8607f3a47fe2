//! Unified error types for the domain layer
//!
//! Value objects validate themselves on construction and report problems
//! through `DomainError`. Component operations never use this type for
//! business outcomes; those are closed result enums in the engine.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for value objects that violate their invariants.
    ///
    /// # Example
    /// ```ignore
    /// if tag.is_empty() {
    ///     return Err(DomainError::validation("Faction tag cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for FactionRole {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "leader" => Ok(Self::Leader),
    ///             _ => Err(DomainError::parse(format!("Unknown role: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
