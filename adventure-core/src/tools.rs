//! Tool catalog and dispatch for the narrator.
//!
//! Each world operation is exposed as one named tool with a JSON
//! schema, so an LLM orchestrator can discover and invoke them. The
//! argument names match the historical wire format. Dispatch decodes
//! a call's name and arguments, invokes the matching engine
//! operation, and returns its outcome; it never panics on malformed
//! input.

use crate::engine::WorldEngine;
use crate::error::WorldError;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

/// A tool definition for the orchestrator.
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A tool call that could not be routed to an operation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    BadArguments { tool: String, reason: String },

    #[error(transparent)]
    World(#[from] WorldError),
}

/// Collection of world-state tools.
pub struct WorldTools;

impl WorldTools {
    /// All tool definitions, in catalog order.
    pub fn all() -> Vec<Tool> {
        vec![
            Self::get_world_state(),
            Self::move_player(),
            Self::move_npc(),
            Self::transfer_item(),
            Self::add_to_inventory(),
            Self::remove_from_inventory(),
            Self::unlock_door(),
            Self::update_npc_memory(),
            Self::configure_npc(),
            Self::mark_npc_as_met(),
            Self::create_item(),
            Self::create_npc(),
            Self::create_location(),
            Self::add_location_facts(),
            Self::add_item_facts(),
            Self::add_npc_facts(),
        ]
    }

    fn get_world_state() -> Tool {
        Tool {
            name: "get_world_state".to_string(),
            description: "Get the current world state as JSON: player location and inventory, room contents, NPCs, and door states.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    fn move_player() -> Tool {
        Tool {
            name: "move_player".to_string(),
            description: "Move the player to an adjacent location. Fails if no exit leads there or the door is locked.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location id to move the player to (e.g. 'study')"
                    }
                },
                "required": ["location"]
            }),
        }
    }

    fn move_npc() -> Tool {
        Tool {
            name: "move_npc".to_string(),
            description: "Move an NPC to a location adjacent to its current one. Locked doors block NPCs just like the player.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "npc_id": {
                        "type": "string",
                        "description": "The NPC to move (e.g. 'elena')"
                    },
                    "location": {
                        "type": "string",
                        "description": "The destination location id"
                    }
                },
                "required": ["npc_id", "location"]
            }),
        }
    }

    fn transfer_item() -> Tool {
        Tool {
            name: "transfer_item".to_string(),
            description: "Move an item between containers. A container is 'player', an NPC id, or a location id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item": {
                        "type": "string",
                        "description": "The item id to transfer"
                    },
                    "from_location": {
                        "type": "string",
                        "description": "Source container id (or 'player')"
                    },
                    "to_location": {
                        "type": "string",
                        "description": "Destination container id (or 'player')"
                    }
                },
                "required": ["item", "from_location", "to_location"]
            }),
        }
    }

    fn add_to_inventory() -> Tool {
        Tool {
            name: "add_to_inventory".to_string(),
            description: "Player picks up an item from their current location.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item": {
                        "type": "string",
                        "description": "The item id to pick up"
                    }
                },
                "required": ["item"]
            }),
        }
    }

    fn remove_from_inventory() -> Tool {
        Tool {
            name: "remove_from_inventory".to_string(),
            description: "Player drops an item from their inventory into their current location.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item": {
                        "type": "string",
                        "description": "The item id to drop"
                    }
                },
                "required": ["item"]
            }),
        }
    }

    fn unlock_door() -> Tool {
        Tool {
            name: "unlock_door".to_string(),
            description: "Unlock a door using a key from the player's inventory. The key must be able to open that specific door. Unlocking is permanent.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location the door is in"
                    },
                    "direction": {
                        "type": "string",
                        "description": "The direction of the door (e.g. 'north')"
                    },
                    "key_item": {
                        "type": "string",
                        "description": "The key item id to use"
                    }
                },
                "required": ["location", "direction", "key_item"]
            }),
        }
    }

    fn update_npc_memory() -> Tool {
        Tool {
            name: "update_npc_memory".to_string(),
            description: "Append a thought and/or an action to an NPC's recent memory. Only the most recent four of each are kept.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "npc_id": {
                        "type": "string",
                        "description": "The NPC whose memory to update"
                    },
                    "thought": {
                        "type": "string",
                        "description": "A recent thought (optional)"
                    },
                    "action": {
                        "type": "string",
                        "description": "A recent action (optional)"
                    }
                },
                "required": ["npc_id"]
            }),
        }
    }

    fn configure_npc() -> Tool {
        Tool {
            name: "configure_npc".to_string(),
            description: "Overwrite an NPC's personality, backstory, and/or core memories. Core memories are a comma-separated list that replaces the previous set.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "npc_id": {
                        "type": "string",
                        "description": "The NPC to configure"
                    },
                    "personality": {
                        "type": "string",
                        "description": "Brief personality description (optional)"
                    },
                    "backstory": {
                        "type": "string",
                        "description": "Background story (optional)"
                    },
                    "core_memories": {
                        "type": "string",
                        "description": "Comma-separated list of important memories (optional)"
                    }
                },
                "required": ["npc_id"]
            }),
        }
    }

    fn mark_npc_as_met() -> Tool {
        Tool {
            name: "mark_npc_as_met".to_string(),
            description: "Mark an NPC as met by the player, so the narrator can refer to them by name. Safe to call repeatedly.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "npc_id": {
                        "type": "string",
                        "description": "The NPC the player has now met"
                    }
                },
                "required": ["npc_id"]
            }),
        }
    }

    fn create_item() -> Tool {
        Tool {
            name: "create_item".to_string(),
            description: "Create a new item resting in a location, in an NPC's inventory, or held by the player.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "string",
                        "description": "Unique id for the item (e.g. 'silver_key')"
                    },
                    "name": {
                        "type": "string",
                        "description": "Human-readable name (e.g. 'Silver Key')"
                    },
                    "location": {
                        "type": "string",
                        "description": "Where the item starts: a location id, an NPC id, or 'player'"
                    },
                    "initial_facts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Initial facts about the item (optional)"
                    }
                },
                "required": ["item_id", "name", "location"]
            }),
        }
    }

    fn create_npc() -> Tool {
        Tool {
            name: "create_npc".to_string(),
            description: "Create a new NPC at an existing location.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "npc_id": {
                        "type": "string",
                        "description": "Unique id for the NPC (e.g. 'elena')"
                    },
                    "name": {
                        "type": "string",
                        "description": "Human-readable name (e.g. 'Elena')"
                    },
                    "location": {
                        "type": "string",
                        "description": "Location id where the NPC starts"
                    },
                    "initial_facts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Initial facts about the NPC (optional)"
                    }
                },
                "required": ["npc_id", "name", "location"]
            }),
        }
    }

    fn create_location() -> Tool {
        Tool {
            name: "create_location".to_string(),
            description: "Create a new location. Exits map direction labels to location ids and need not be symmetric.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location_id": {
                        "type": "string",
                        "description": "Unique id for the location (e.g. 'secret_room')"
                    },
                    "name": {
                        "type": "string",
                        "description": "Human-readable name (e.g. 'Secret Room')"
                    },
                    "exits": {
                        "type": "object",
                        "additionalProperties": { "type": "string" },
                        "description": "Exits as {direction: location_id} (optional)"
                    }
                },
                "required": ["location_id", "name"]
            }),
        }
    }

    fn add_location_facts() -> Tool {
        Tool {
            name: "add_location_facts".to_string(),
            description: "Append facts to a location. Duplicates are not filtered here.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location_id": {
                        "type": "string",
                        "description": "The location to add facts to"
                    },
                    "new_facts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Facts to add"
                    }
                },
                "required": ["location_id", "new_facts"]
            }),
        }
    }

    fn add_item_facts() -> Tool {
        Tool {
            name: "add_item_facts".to_string(),
            description: "Append facts to an item. Duplicates are not filtered here.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "string",
                        "description": "The item to add facts to"
                    },
                    "new_facts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Facts to add"
                    }
                },
                "required": ["item_id", "new_facts"]
            }),
        }
    }

    fn add_npc_facts() -> Tool {
        Tool {
            name: "add_npc_facts".to_string(),
            description: "Append facts to an NPC, skipping exact duplicates. Reports which facts were new.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "npc_id": {
                        "type": "string",
                        "description": "The NPC to add facts to"
                    },
                    "new_facts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Facts to add"
                    }
                },
                "required": ["npc_id", "new_facts"]
            }),
        }
    }
}

/// Route a decoded tool call to its engine operation.
pub async fn dispatch(
    engine: &WorldEngine,
    name: &str,
    input: &Value,
) -> Result<String, ToolError> {
    match name {
        "get_world_state" => Ok(engine.world_snapshot().await),
        "move_player" => {
            let location = require_str(name, input, "location")?;
            Ok(engine.move_player(location).await?)
        }
        "move_npc" => {
            let npc_id = require_str(name, input, "npc_id")?;
            let location = require_str(name, input, "location")?;
            Ok(engine.move_npc(npc_id, location).await?)
        }
        "transfer_item" => {
            let item = require_str(name, input, "item")?;
            let from = require_str(name, input, "from_location")?;
            let to = require_str(name, input, "to_location")?;
            Ok(engine.transfer_item(item, from, to).await?)
        }
        "add_to_inventory" => {
            let item = require_str(name, input, "item")?;
            Ok(engine.add_to_inventory(item).await?)
        }
        "remove_from_inventory" => {
            let item = require_str(name, input, "item")?;
            Ok(engine.remove_from_inventory(item).await?)
        }
        "unlock_door" => {
            let location = require_str(name, input, "location")?;
            let direction = require_str(name, input, "direction")?;
            let key_item = require_str(name, input, "key_item")?;
            Ok(engine.unlock_door(location, direction, key_item).await?)
        }
        "update_npc_memory" => {
            let npc_id = require_str(name, input, "npc_id")?;
            let thought = optional_str(input, "thought");
            let action = optional_str(input, "action");
            Ok(engine.update_npc_memory(npc_id, thought, action).await?)
        }
        "configure_npc" => {
            let npc_id = require_str(name, input, "npc_id")?;
            let personality = optional_str(input, "personality");
            let backstory = optional_str(input, "backstory");
            let core_memories = optional_str(input, "core_memories");
            Ok(engine
                .configure_npc(npc_id, personality, backstory, core_memories)
                .await?)
        }
        "mark_npc_as_met" => {
            let npc_id = require_str(name, input, "npc_id")?;
            Ok(engine.mark_npc_as_met(npc_id).await?)
        }
        "create_item" => {
            let item_id = require_str(name, input, "item_id")?;
            let item_name = require_str(name, input, "name")?;
            let location = require_str(name, input, "location")?;
            let facts = string_list(input, "initial_facts");
            Ok(engine.create_item(item_id, item_name, location, &facts).await?)
        }
        "create_npc" => {
            let npc_id = require_str(name, input, "npc_id")?;
            let npc_name = require_str(name, input, "name")?;
            let location = require_str(name, input, "location")?;
            let facts = string_list(input, "initial_facts");
            Ok(engine.create_npc(npc_id, npc_name, location, &facts).await?)
        }
        "create_location" => {
            let location_id = require_str(name, input, "location_id")?;
            let loc_name = require_str(name, input, "name")?;
            let exits = exit_map(input, "exits");
            Ok(engine.create_location(location_id, loc_name, exits).await?)
        }
        "add_location_facts" => {
            let location_id = require_str(name, input, "location_id")?;
            let facts = require_list(name, input, "new_facts")?;
            Ok(engine.add_location_facts(location_id, &facts).await?)
        }
        "add_item_facts" => {
            let item_id = require_str(name, input, "item_id")?;
            let facts = require_list(name, input, "new_facts")?;
            Ok(engine.add_item_facts(item_id, &facts).await?)
        }
        "add_npc_facts" => {
            let npc_id = require_str(name, input, "npc_id")?;
            let facts = require_list(name, input, "new_facts")?;
            Ok(engine.add_npc_facts(npc_id, &facts).await?)
        }
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

fn require_str<'a>(tool: &str, input: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::BadArguments {
            tool: tool.to_string(),
            reason: format!("'{key}' is required"),
        })
}

fn optional_str<'a>(input: &'a Value, key: &str) -> &'a str {
    input.get(key).and_then(Value::as_str).unwrap_or("")
}

fn string_list(input: &Value, key: &str) -> Vec<String> {
    input
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn require_list(tool: &str, input: &Value, key: &str) -> Result<Vec<String>, ToolError> {
    input
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .ok_or_else(|| ToolError::BadArguments {
            tool: tool.to_string(),
            reason: format!("'{key}' is required"),
        })
}

fn exit_map(input: &Value, key: &str) -> Option<HashMap<String, String>> {
    input.get(key).and_then(Value::as_object).map(|obj| {
        obj.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn test_engine() -> (TempDir, WorldEngine) {
        let dir = TempDir::new().expect("temp dir");
        let engine = WorldEngine::with_path(dir.path().join("world_state.json"));
        (dir, engine)
    }

    #[test]
    fn test_catalog_is_complete() {
        let tools = WorldTools::all();
        assert_eq!(tools.len(), 16);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"move_player"));
        assert!(names.contains(&"unlock_door"));
        assert!(names.contains(&"add_npc_facts"));

        for tool in &tools {
            assert!(!tool.description.is_empty(), "{} lacks description", tool.name);
            assert_eq!(tool.input_schema["type"], "object");
            assert!(tool.input_schema["required"].is_array());
        }
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let (_dir, engine) = test_engine();

        let msg = dispatch(
            &engine,
            "add_to_inventory",
            &json!({ "item": "silver_key" }),
        )
        .await
        .unwrap();
        assert_eq!(msg, "Player picked up silver_key");

        let msg = dispatch(
            &engine,
            "unlock_door",
            &json!({ "location": "foyer", "direction": "north", "key_item": "silver_key" }),
        )
        .await
        .unwrap();
        assert!(msg.contains("unlocked"));

        let msg = dispatch(&engine, "move_player", &json!({ "location": "study" }))
            .await
            .unwrap();
        assert_eq!(msg, "Player moved from foyer to study");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let (_dir, engine) = test_engine();
        let err = dispatch(&engine, "summon_dragon", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_dispatch_missing_argument() {
        let (_dir, engine) = test_engine();
        let err = dispatch(&engine, "move_player", &json!({}))
            .await
            .unwrap_err();
        match err {
            ToolError::BadArguments { tool, reason } => {
                assert_eq!(tool, "move_player");
                assert!(reason.contains("location"));
            }
            other => panic!("expected BadArguments, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_world_error_passes_through() {
        let (_dir, engine) = test_engine();
        let err = dispatch(&engine, "move_player", &json!({ "location": "cellar" }))
            .await
            .unwrap_err();
        match err {
            ToolError::World(world_err) => {
                assert_eq!(world_err.kind(), ErrorKind::InvalidTransition)
            }
            other => panic!("expected World error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_optional_arguments() {
        let (_dir, engine) = test_engine();

        let msg = dispatch(
            &engine,
            "update_npc_memory",
            &json!({ "npc_id": "elena", "thought": "who am I?" }),
        )
        .await
        .unwrap();
        assert!(msg.contains("thought"));

        let msg = dispatch(
            &engine,
            "create_location",
            &json!({
                "location_id": "garden",
                "name": "Overgrown Garden",
                "exits": { "south": "foyer" }
            }),
        )
        .await
        .unwrap();
        assert!(msg.contains("garden"));
    }
}
