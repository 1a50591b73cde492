//! World-state mutation engine for an AI-narrated text adventure.
//!
//! This crate owns the authoritative world document (the player, a
//! graph of locations, the items and NPCs populating them, and the
//! door/lock relationships between locations) and exposes a fixed
//! catalog of validated state transitions for an LLM narrator to
//! invoke: movement, item transfer, door unlocking, NPC memory and
//! configuration updates, fact recording, and entity creation.
//!
//! Every operation is an atomic load-validate-mutate-persist
//! transaction serialized through one lock, returning a
//! human-readable success message or a typed [`error::WorldError`].
//! Bad input is rejected, never fatal.
//!
//! # Quick Start
//!
//! ```ignore
//! use adventure_core::WorldEngine;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = WorldEngine::with_path("world_state.json");
//!
//!     engine.add_to_inventory("silver_key").await.unwrap();
//!     engine.unlock_door("foyer", "north", "silver_key").await.unwrap();
//!     let msg = engine.move_player("study").await.unwrap();
//!     println!("{msg}");
//! }
//! ```

pub mod engine;
pub mod error;
pub mod store;
pub mod tools;
pub mod world;

// Primary public API
pub use engine::WorldEngine;
pub use error::{EntityKind, ErrorKind, WorldError};
pub use store::WorldStore;
pub use tools::{dispatch, Tool, ToolError, WorldTools};
pub use world::{ContainerRef, DoorState, Item, Location, Npc, Player, WorldDocument};
