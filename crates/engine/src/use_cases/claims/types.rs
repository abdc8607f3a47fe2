//! Outcome types for claim operations.

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    Success,
    NotInFaction,
    NotOfficer,
    AlreadyClaimedSelf,
    AlreadyClaimedOther,
    NotAdjacent,
    MaxClaimsReached,
    WorldNotAllowed,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnclaimResult {
    Success,
    NotInFaction,
    NotOfficer,
    ChunkNotClaimed,
    NotYourClaim,
    CannotUnclaimHome,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverclaimResult {
    Success,
    NotInFaction,
    NotOfficer,
    ChunkNotClaimed,
    AlreadyClaimedSelf,
    AlreadyClaimedAlly,
    /// Defender still holds enough power for its claims
    TargetHasPower,
    MaxClaimsReached,
}
