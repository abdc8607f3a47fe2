//! Outcome types for diplomacy operations.

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllyRequestResult {
    /// Recorded; waiting for the other side
    RequestSent,
    /// The other side had already asked; the alliance is now in place
    RequestAccepted,
    NotInFaction,
    NotOfficer,
    CannotRelateSelf,
    AlreadyAlly,
    FactionNotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptAllyResult {
    RequestAccepted,
    NoPendingRequest,
    NotInFaction,
    NotOfficer,
    FactionNotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetEnemyResult {
    Success,
    NotInFaction,
    NotOfficer,
    AlreadyEnemy,
    CannotRelateSelf,
    FactionNotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetNeutralResult {
    Success,
    NotInFaction,
    NotOfficer,
    AlreadyNeutral,
    CannotRelateSelf,
    FactionNotFound,
}
