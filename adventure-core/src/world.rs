//! World document types.
//!
//! Contains the complete mutable world model for the adventure: the
//! player, the location graph, items, NPCs, and door/lock state. The
//! document is the sole unit of persistence; its JSON shape matches
//! the historical `world_state.json` layout so existing saves load.

use crate::error::WorldError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many recent thoughts/actions an NPC retains.
pub const RECENT_MEMORY_CAPACITY: usize = 4;

// ============================================================================
// Entities
// ============================================================================

/// The player character's mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Id of the location the player currently occupies.
    pub location: String,

    /// Item ids the player carries, in pickup order.
    #[serde(default)]
    pub inventory: Vec<String>,

    /// NPC ids the player has been introduced to.
    #[serde(default)]
    pub met_npcs: Vec<String>,
}

/// Lock state of a single door, keyed by direction on its location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorState {
    pub locked: bool,

    /// Narrative description ("locked oak door"). Optional in old saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DoorState {
    /// The description used in messages, falling back to "door".
    pub fn describe(&self) -> &str {
        self.description.as_deref().unwrap_or("door")
    }
}

/// A location in the world graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Display name ("Old Foyer").
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Item ids currently resting here.
    #[serde(default)]
    pub items: Vec<String>,

    /// Direction label -> target location id. Exits need not be
    /// symmetric; a reverse exit is never implied.
    #[serde(default)]
    pub exits: HashMap<String, String>,

    /// Only directions with a controllable door appear here.
    #[serde(default)]
    pub door_states: HashMap<String, DoorState>,

    /// Free-text facts discovered about this location. Append-only,
    /// duplicates allowed (dedup is the narrator's job).
    #[serde(default)]
    pub facts: Vec<String>,
}

impl Location {
    /// Create an empty location with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            items: Vec::new(),
            exits: HashMap::new(),
            door_states: HashMap::new(),
            facts: Vec::new(),
        }
    }
}

/// An item. Containment is implicit: exactly one of a location's
/// `items`, the player's `inventory`, or an NPC's `inventory` holds
/// the item's id at any time. The item itself never records where it
/// is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Display name ("Silver Key").
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Door ids this item opens, each `"{location_id}_{direction}"`.
    #[serde(default)]
    pub can_unlock: Vec<String>,

    /// Free-text facts. Append-only, duplicates allowed.
    #[serde(default)]
    pub facts: Vec<String>,
}

impl Item {
    /// Create a new item with no unlock powers and no facts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            can_unlock: Vec::new(),
            facts: Vec::new(),
        }
    }

    /// Whether this item opens the door `"{location_id}_{direction}"`.
    pub fn opens(&self, location_id: &str, direction: &str) -> bool {
        let door_id = format!("{location_id}_{direction}");
        self.can_unlock.iter().any(|d| d == &door_id)
    }
}

/// A non-player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Id of the location the NPC currently occupies.
    pub location: String,

    /// Item ids the NPC carries.
    #[serde(default)]
    pub inventory: Vec<String>,

    /// Ring buffer of recent thoughts, newest last, capped at
    /// [`RECENT_MEMORY_CAPACITY`].
    #[serde(default)]
    pub recent_thoughts: Vec<String>,

    /// Ring buffer of recent actions, newest last, capped at
    /// [`RECENT_MEMORY_CAPACITY`].
    #[serde(default)]
    pub recent_actions: Vec<String>,

    #[serde(default)]
    pub personality: String,

    #[serde(default)]
    pub backstory: String,

    /// Important memories, replaced wholesale by `configure_npc`.
    #[serde(default)]
    pub core_memories: Vec<String>,

    /// Free-text facts, deduplicated by exact string match.
    #[serde(default)]
    pub facts: Vec<String>,
}

impl Npc {
    /// Create a new NPC at the given location with empty state.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location: location.into(),
            inventory: Vec::new(),
            recent_thoughts: Vec::new(),
            recent_actions: Vec::new(),
            personality: String::new(),
            backstory: String::new(),
            core_memories: Vec::new(),
            facts: Vec::new(),
        }
    }

    /// Record a thought, evicting the oldest beyond the capacity.
    pub fn remember_thought(&mut self, thought: impl Into<String>) {
        push_recent(&mut self.recent_thoughts, thought.into());
    }

    /// Record an action, evicting the oldest beyond the capacity.
    pub fn remember_action(&mut self, action: impl Into<String>) {
        push_recent(&mut self.recent_actions, action.into());
    }
}

fn push_recent(buffer: &mut Vec<String>, entry: String) {
    buffer.push(entry);
    if buffer.len() > RECENT_MEMORY_CAPACITY {
        let excess = buffer.len() - RECENT_MEMORY_CAPACITY;
        buffer.drain(..excess);
    }
}

// ============================================================================
// Containers
// ============================================================================

/// One of the three places an item id may reside.
///
/// Resolution follows a fixed priority: the literal `"player"`, then
/// the NPC registry, then the location registry. An NPC whose id
/// shadows a location id is therefore always the NPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    Player,
    Npc(String),
    Location(String),
}

impl ContainerRef {
    /// Resolve a raw container id against the document.
    pub fn resolve(doc: &WorldDocument, id: &str) -> Option<Self> {
        if id == "player" {
            Some(ContainerRef::Player)
        } else if doc.npcs.contains_key(id) {
            Some(ContainerRef::Npc(id.to_string()))
        } else if doc.locations.contains_key(id) {
            Some(ContainerRef::Location(id.to_string()))
        } else {
            None
        }
    }

    /// The item list this container owns.
    pub fn items<'a>(&self, doc: &'a WorldDocument) -> &'a Vec<String> {
        match self {
            ContainerRef::Player => &doc.player.inventory,
            ContainerRef::Npc(id) => &doc.npcs[id].inventory,
            ContainerRef::Location(id) => &doc.locations[id].items,
        }
    }

    /// Mutable access to the item list this container owns.
    pub fn items_mut<'a>(
        &self,
        doc: &'a mut WorldDocument,
    ) -> Result<&'a mut Vec<String>, WorldError> {
        match self {
            ContainerRef::Player => Ok(&mut doc.player.inventory),
            ContainerRef::Npc(id) => Ok(&mut doc.npc_mut(id)?.inventory),
            ContainerRef::Location(id) => Ok(&mut doc.location_mut(id)?.items),
        }
    }

    /// Whether this container currently holds the item.
    pub fn holds(&self, doc: &WorldDocument, item_id: &str) -> bool {
        self.items(doc).iter().any(|i| i == item_id)
    }
}

// ============================================================================
// The document
// ============================================================================

/// The complete world state, the sole unit of persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldDocument {
    pub player: Player,

    #[serde(default)]
    pub locations: HashMap<String, Location>,

    #[serde(default)]
    pub items: HashMap<String, Item>,

    #[serde(default)]
    pub npcs: HashMap<String, Npc>,
}

impl WorldDocument {
    /// The built-in starting scenario: a six-room manor with a locked
    /// study door, the silver key that opens it, and an amnesiac NPC
    /// in the library.
    pub fn default_world() -> Self {
        let mut locations = HashMap::new();

        let mut foyer = Location::new("Old Foyer");
        foyer.description = "A dusty foyer with motes drifting in shafts of light".to_string();
        foyer.items = vec!["silver_key".to_string()];
        foyer.exits = [
            ("north".to_string(), "study".to_string()),
            ("east".to_string(), "library".to_string()),
            ("west".to_string(), "kitchen".to_string()),
        ]
        .into();
        foyer.door_states.insert(
            "north".to_string(),
            DoorState {
                locked: true,
                description: Some("locked oak door".to_string()),
            },
        );
        locations.insert("foyer".to_string(), foyer);

        let mut study = Location::new("Quiet Study");
        study.description = "A quiet study with a heavy oak desk".to_string();
        study.exits = [
            ("south".to_string(), "foyer".to_string()),
            ("up".to_string(), "attic".to_string()),
        ]
        .into();
        locations.insert("study".to_string(), study);

        let mut library = Location::new("Dusty Library");
        library.description = "Towering shelves sag under mouldering books".to_string();
        library.exits = [("west".to_string(), "foyer".to_string())].into();
        locations.insert("library".to_string(), library);

        let mut kitchen = Location::new("Abandoned Kitchen");
        kitchen.description = "Cold ovens and a faint smell of old ash".to_string();
        kitchen.exits = [
            ("east".to_string(), "foyer".to_string()),
            ("down".to_string(), "cellar".to_string()),
        ]
        .into();
        kitchen.door_states.insert(
            "down".to_string(),
            DoorState {
                locked: true,
                description: Some("heavy wooden trapdoor".to_string()),
            },
        );
        locations.insert("kitchen".to_string(), kitchen);

        let mut attic = Location::new("Cramped Attic");
        attic.description = "Bare rafters and the smell of dust".to_string();
        attic.exits = [("down".to_string(), "study".to_string())].into();
        locations.insert("attic".to_string(), attic);

        let mut cellar = Location::new("Stone Cellar");
        cellar.description = "Damp stone walls swallow every sound".to_string();
        cellar.exits = [("up".to_string(), "kitchen".to_string())].into();
        locations.insert("cellar".to_string(), cellar);

        let mut items = HashMap::new();
        let mut silver_key = Item::new("Silver Key");
        silver_key.description = "A tarnished silver key".to_string();
        silver_key.can_unlock = vec!["foyer_north".to_string()];
        items.insert("silver_key".to_string(), silver_key);

        let mut npcs = HashMap::new();
        let mut elena = Npc::new("Elena", "library");
        elena.description = "a woman in her thirties with dark hair loose and slightly \
                             disheveled, wearing a simple gray dress"
            .to_string();
        elena.personality =
            "curious and observant, pragmatic under pressure, empathetic but guarded".to_string();
        elena.backstory = "She has just woken up inside the manor and cannot remember who she \
                           is or how she got there."
            .to_string();
        npcs.insert("elena".to_string(), elena);

        Self {
            player: Player {
                location: "foyer".to_string(),
                inventory: Vec::new(),
                met_npcs: Vec::new(),
            },
            locations,
            items,
            npcs,
        }
    }

    /// Look up a location or fail with `LocationNotFound`.
    pub fn location(&self, id: &str) -> Result<&Location, WorldError> {
        self.locations
            .get(id)
            .ok_or_else(|| WorldError::LocationNotFound { id: id.to_string() })
    }

    /// Mutable location lookup.
    pub fn location_mut(&mut self, id: &str) -> Result<&mut Location, WorldError> {
        self.locations
            .get_mut(id)
            .ok_or_else(|| WorldError::LocationNotFound { id: id.to_string() })
    }

    /// Look up an item or fail with `ItemNotFound`.
    pub fn item(&self, id: &str) -> Result<&Item, WorldError> {
        self.items
            .get(id)
            .ok_or_else(|| WorldError::ItemNotFound { id: id.to_string() })
    }

    /// Mutable item lookup.
    pub fn item_mut(&mut self, id: &str) -> Result<&mut Item, WorldError> {
        self.items
            .get_mut(id)
            .ok_or_else(|| WorldError::ItemNotFound { id: id.to_string() })
    }

    /// Look up an NPC or fail with `NpcNotFound`.
    pub fn npc(&self, id: &str) -> Result<&Npc, WorldError> {
        self.npcs
            .get(id)
            .ok_or_else(|| WorldError::NpcNotFound { id: id.to_string() })
    }

    /// Mutable NPC lookup.
    pub fn npc_mut(&mut self, id: &str) -> Result<&mut Npc, WorldError> {
        self.npcs
            .get_mut(id)
            .ok_or_else(|| WorldError::NpcNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_world_scenario() {
        let doc = WorldDocument::default_world();

        assert_eq!(doc.player.location, "foyer");
        assert!(doc.player.inventory.is_empty());

        let foyer = doc.location("foyer").unwrap();
        assert!(foyer.items.contains(&"silver_key".to_string()));
        assert_eq!(foyer.exits["north"], "study");
        assert!(foyer.door_states["north"].locked);

        let key = doc.item("silver_key").unwrap();
        assert!(key.opens("foyer", "north"));
        assert!(!key.opens("kitchen", "down"));

        assert_eq!(doc.npc("elena").unwrap().location, "library");
    }

    #[test]
    fn test_default_world_exits_resolve() {
        let doc = WorldDocument::default_world();
        for (id, location) in &doc.locations {
            for target in location.exits.values() {
                assert!(
                    doc.locations.contains_key(target),
                    "exit from {id} leads to unknown location {target}"
                );
            }
        }
    }

    #[test]
    fn test_container_resolution_priority() {
        let mut doc = WorldDocument::default_world();

        assert_eq!(
            ContainerRef::resolve(&doc, "player"),
            Some(ContainerRef::Player)
        );
        assert_eq!(
            ContainerRef::resolve(&doc, "elena"),
            Some(ContainerRef::Npc("elena".to_string()))
        );
        assert_eq!(
            ContainerRef::resolve(&doc, "foyer"),
            Some(ContainerRef::Location("foyer".to_string()))
        );
        assert_eq!(ContainerRef::resolve(&doc, "nowhere"), None);

        // An NPC id shadowing a location id resolves to the NPC.
        doc.npcs.insert("foyer".to_string(), Npc::new("Foyer", "study"));
        assert_eq!(
            ContainerRef::resolve(&doc, "foyer"),
            Some(ContainerRef::Npc("foyer".to_string()))
        );
    }

    #[test]
    fn test_recent_memory_capped() {
        let mut npc = Npc::new("Elena", "library");
        for i in 0..10 {
            npc.remember_thought(format!("thought {i}"));
        }
        assert_eq!(npc.recent_thoughts.len(), RECENT_MEMORY_CAPACITY);
        assert_eq!(npc.recent_thoughts[0], "thought 6");
        assert_eq!(npc.recent_thoughts[3], "thought 9");
    }

    #[test]
    fn test_door_description_fallback() {
        let door = DoorState {
            locked: true,
            description: None,
        };
        assert_eq!(door.describe(), "door");
    }

    #[test]
    fn test_sparse_document_deserializes() {
        // Old saves omit fields newer code always writes.
        let json = r#"{
            "player": {"location": "foyer"},
            "locations": {
                "foyer": {"name": "Old Foyer", "exits": {"north": "study"}},
                "study": {"name": "Quiet Study"}
            }
        }"#;
        let doc: WorldDocument = serde_json::from_str(json).unwrap();
        assert!(doc.player.met_npcs.is_empty());
        assert!(doc.location("foyer").unwrap().door_states.is_empty());
        assert!(doc.items.is_empty());
    }
}
