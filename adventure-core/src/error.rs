//! Typed failures for world operations.
//!
//! Every operation returns `Result<String, WorldError>`: a
//! human-readable success message or one of these errors. Bad input
//! is always rejected with an error value, never a panic: the
//! narrator retries and the process keeps running.

use serde::Serialize;
use thiserror::Error;

/// A failed world operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("location '{id}' does not exist")]
    LocationNotFound { id: String },

    #[error("item '{id}' does not exist")]
    ItemNotFound { id: String },

    #[error("NPC '{id}' does not exist")]
    NpcNotFound { id: String },

    /// A transfer source that is neither "player", an NPC, nor a location.
    #[error("source container '{id}' does not exist")]
    SourceNotFound { id: String },

    /// A transfer destination that is neither "player", an NPC, nor a location.
    #[error("destination container '{id}' does not exist")]
    DestinationNotFound { id: String },

    /// No exit from the current location leads to the target.
    #[error("cannot move directly from {from} to {to}")]
    NoExit { from: String, to: String },

    #[error("the {door} is locked")]
    DoorLocked { door: String },

    #[error("no door to the {direction} in {location}")]
    NoSuchDoor {
        location: String,
        direction: String,
    },

    #[error("player does not have {item}")]
    KeyNotHeld { item: String },

    #[error("{item} cannot unlock this door")]
    KeyDoesNotMatch { item: String },

    /// The item is not in the container the caller claimed it was in.
    #[error("item '{item}' is not in {container}")]
    ItemNotPresent { item: String, container: String },

    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: EntityKind, id: String },
}

/// What sort of entity an id refers to, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Location,
    Item,
    Npc,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Location => "location",
            EntityKind::Item => "item",
            EntityKind::Npc => "NPC",
        };
        write!(f, "{s}")
    }
}

/// The coarse category of a failure, for callers that branch on kind
/// rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A location, item, NPC, or container id is unknown.
    EntityNotFound,
    /// The requested transition is not legal from the current state.
    InvalidTransition,
    /// Creation attempted with an id that is already taken.
    AlreadyExists,
    /// The state does not satisfy the operation's precondition.
    PreconditionNotMet,
}

impl WorldError {
    /// The coarse category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorldError::LocationNotFound { .. }
            | WorldError::ItemNotFound { .. }
            | WorldError::NpcNotFound { .. }
            | WorldError::SourceNotFound { .. }
            | WorldError::DestinationNotFound { .. } => ErrorKind::EntityNotFound,
            WorldError::NoExit { .. }
            | WorldError::DoorLocked { .. }
            | WorldError::NoSuchDoor { .. }
            | WorldError::KeyDoesNotMatch { .. } => ErrorKind::InvalidTransition,
            WorldError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            WorldError::KeyNotHeld { .. } | WorldError::ItemNotPresent { .. } => {
                ErrorKind::PreconditionNotMet
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = WorldError::LocationNotFound {
            id: "void".to_string(),
        };
        assert_eq!(err.to_string(), "location 'void' does not exist");

        let err = WorldError::DoorLocked {
            door: "locked oak door".to_string(),
        };
        assert_eq!(err.to_string(), "the locked oak door is locked");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            WorldError::NpcNotFound {
                id: "x".to_string()
            }
            .kind(),
            ErrorKind::EntityNotFound
        );
        assert_eq!(
            WorldError::NoExit {
                from: "a".to_string(),
                to: "b".to_string()
            }
            .kind(),
            ErrorKind::InvalidTransition
        );
        assert_eq!(
            WorldError::KeyNotHeld {
                item: "k".to_string()
            }
            .kind(),
            ErrorKind::PreconditionNotMet
        );
        assert_eq!(
            WorldError::AlreadyExists {
                kind: EntityKind::Item,
                id: "k".to_string()
            }
            .kind(),
            ErrorKind::AlreadyExists
        );
    }
}
