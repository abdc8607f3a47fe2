//! Outcome types for faction registry operations.
//!
//! Every operation returns one of these closed enums; none of them is an
//! error type. Storage failures travel separately as `RepoError`.

use territory_domain::FactionId;

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateFactionResult {
    Success(FactionId),
    AlreadyInFaction,
    NameTaken,
    NameTooShort,
    NameTooLong,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisbandResult {
    Success,
    NotLeader,
    FactionNotFound,
}

/// Outcome of adding, removing, kicking or leaving.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipResult {
    Success,
    NotOfficer,
    CannotKickLeader,
    FactionFull,
    AlreadyInFaction,
    NotFound,
}

/// Outcome of promote and demote.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankResult {
    Success,
    NotLeader,
    /// Target is already an officer or the leader
    CannotPromoteLeader,
    CannotDemoteMember,
    CannotDemoteLeader,
    NotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferResult {
    Success,
    NotLeader,
    NotFound,
    AlreadyLeader,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteResult {
    Success,
    NotOfficer,
    AlreadyInFaction,
    AlreadyInvited,
    FactionNotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResult {
    Success,
    AlreadyInFaction,
    FactionFull,
    NotInvited,
    FactionNotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameResult {
    Success,
    NotLeader,
    NameTaken,
    NameTooShort,
    NameTooLong,
    FactionNotFound,
}

/// Outcome of officer-gated cosmetic and access updates.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    Success,
    NotOfficer,
    FactionNotFound,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetHomeResult {
    Success,
    NotInFaction,
    NotOfficer,
    NotInTerritory,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearHomeResult {
    Success,
    NotInFaction,
    NotOfficer,
    NoHome,
}

/// What a successful flush wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    pub deleted: usize,
}
