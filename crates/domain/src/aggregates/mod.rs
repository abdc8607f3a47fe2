//! Aggregate roots - domain objects that own their related data
//!
//! | Concern | Expressed as |
//! |---------|--------------|
//! | Private fields + getters | Newtypes valid by construction |
//! | Value Object immutability | `#[derive(Clone)]` + consuming `with_*` methods |
//! | Aggregate root guards | Single writer in the engine's faction store |

pub mod faction;
pub mod member;

pub use faction::Faction;
pub use member::Member;
