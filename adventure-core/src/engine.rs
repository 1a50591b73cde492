//! The operation set: validated, atomic world-state transitions.
//!
//! Every operation is one transaction (load the document, validate
//! preconditions, mutate, persist, return a human-readable outcome)
//! executed under a single mutex so concurrent callers cannot
//! interleave their read and write phases and lose updates.

use crate::error::{EntityKind, WorldError};
use crate::store::WorldStore;
use crate::world::{ContainerRef, Item, Location, Npc, WorldDocument};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// The world-state mutation engine.
///
/// Owns the [`WorldStore`] and serializes all operations through one
/// lock held for the whole load-validate-mutate-save sequence.
pub struct WorldEngine {
    store: Mutex<WorldStore>,
}

impl WorldEngine {
    /// Create an engine over an existing store.
    pub fn new(store: WorldStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Create an engine backed by the given state file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::new(WorldStore::new(path))
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// The full current world state as pretty-printed JSON, for the
    /// narrator's context.
    pub async fn world_snapshot(&self) -> String {
        let store = self.store.lock().await;
        let doc = store.load().await;
        serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Move the player to an adjacent location.
    pub async fn move_player(&self, location: &str) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        let from = doc.player.location.clone();
        check_move(&doc, &from, location)?;

        doc.player.location = location.to_string();
        store.save(&doc).await;
        Ok(format!("Player moved from {from} to {location}"))
    }

    /// Move an NPC to a location adjacent to its current one.
    pub async fn move_npc(&self, npc_id: &str, location: &str) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        let from = doc.npc(npc_id)?.location.clone();
        check_move(&doc, &from, location)?;

        doc.npc_mut(npc_id)?.location = location.to_string();
        store.save(&doc).await;
        Ok(format!("NPC {npc_id} moved from {from} to {location}"))
    }

    // ========================================================================
    // Item transfer
    // ========================================================================

    /// Move an item between containers. A container id is the literal
    /// `"player"`, an NPC id, or a location id.
    pub async fn transfer_item(
        &self,
        item: &str,
        from: &str,
        to: &str,
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        transfer_in_doc(&mut doc, item, from, to)?;

        store.save(&doc).await;
        Ok(format!("Item '{item}' transferred from {from} to {to}"))
    }

    /// Pick an item up from the player's current location.
    pub async fn add_to_inventory(&self, item: &str) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        let here = doc.player.location.clone();
        if !doc.location(&here)?.items.iter().any(|i| i == item) {
            return Err(WorldError::ItemNotPresent {
                item: item.to_string(),
                container: here,
            });
        }

        transfer_in_doc(&mut doc, item, &here, "player")?;

        store.save(&doc).await;
        Ok(format!("Player picked up {item}"))
    }

    /// Drop an item from the player's inventory into their current
    /// location.
    pub async fn remove_from_inventory(&self, item: &str) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        if !doc.player.inventory.iter().any(|i| i == item) {
            return Err(WorldError::ItemNotPresent {
                item: item.to_string(),
                container: "player inventory".to_string(),
            });
        }

        let here = doc.player.location.clone();
        transfer_in_doc(&mut doc, item, "player", &here)?;

        store.save(&doc).await;
        Ok(format!("Player dropped {item} in {here}"))
    }

    // ========================================================================
    // Doors
    // ========================================================================

    /// Unlock a door with a key from the player's inventory. The key
    /// must list `"{location}_{direction}"` in its `can_unlock` set.
    /// Unlocking is permanent; there is no re-lock operation.
    pub async fn unlock_door(
        &self,
        location: &str,
        direction: &str,
        key_item: &str,
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        if !doc.location(location)?.door_states.contains_key(direction) {
            return Err(WorldError::NoSuchDoor {
                location: location.to_string(),
                direction: direction.to_string(),
            });
        }

        if !doc.player.inventory.iter().any(|i| i == key_item) {
            return Err(WorldError::KeyNotHeld {
                item: key_item.to_string(),
            });
        }

        if !doc.item(key_item)?.opens(location, direction) {
            return Err(WorldError::KeyDoesNotMatch {
                item: key_item.to_string(),
            });
        }

        if let Some(door) = doc.location_mut(location)?.door_states.get_mut(direction) {
            door.locked = false;
        }

        store.save(&doc).await;
        Ok(format!(
            "Door to the {direction} in {location} has been unlocked with {key_item}"
        ))
    }

    // ========================================================================
    // NPC memory and configuration
    // ========================================================================

    /// Append a thought and/or action to an NPC's recent memory.
    /// Empty strings are skipped; both empty is a no-op success.
    pub async fn update_npc_memory(
        &self,
        npc_id: &str,
        thought: &str,
        action: &str,
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        let npc = doc.npc_mut(npc_id)?;
        let mut updates = Vec::new();

        if !thought.is_empty() {
            npc.remember_thought(thought);
            updates.push(format!("thought: '{thought}'"));
        }
        if !action.is_empty() {
            npc.remember_action(action);
            updates.push(format!("action: '{action}'"));
        }

        if updates.is_empty() {
            return Ok(format!("No updates provided for {npc_id}"));
        }

        store.save(&doc).await;
        Ok(format!("Updated {npc_id} memory - {}", updates.join(", ")))
    }

    /// Overwrite an NPC's personality, backstory, and/or core
    /// memories. `core_memories` is a comma-separated list replacing
    /// the prior sequence wholesale. Empty arguments leave fields
    /// untouched; all empty is a no-op success.
    pub async fn configure_npc(
        &self,
        npc_id: &str,
        personality: &str,
        backstory: &str,
        core_memories: &str,
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        let npc = doc.npc_mut(npc_id)?;
        let mut updates = Vec::new();

        if !personality.is_empty() {
            npc.personality = personality.to_string();
            updates.push("personality");
        }
        if !backstory.is_empty() {
            npc.backstory = backstory.to_string();
            updates.push("backstory");
        }
        if !core_memories.is_empty() {
            npc.core_memories = core_memories
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
            updates.push("core memories");
        }

        if updates.is_empty() {
            return Ok(format!("No configuration changes provided for {npc_id}"));
        }

        store.save(&doc).await;
        Ok(format!("Updated {npc_id}: {}", updates.join(", ")))
    }

    /// Record that the player has been introduced to an NPC.
    /// Idempotent: a repeat call reports the fact without failing.
    pub async fn mark_npc_as_met(&self, npc_id: &str) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        doc.npc(npc_id)?;

        if doc.player.met_npcs.iter().any(|n| n == npc_id) {
            return Ok(format!("Player has already met {npc_id}"));
        }

        doc.player.met_npcs.push(npc_id.to_string());
        store.save(&doc).await;
        Ok(format!("Player has now met {npc_id}"))
    }

    // ========================================================================
    // Facts
    // ========================================================================

    /// Append facts to a location. Deduplication is deliberately the
    /// narrator's responsibility.
    pub async fn add_location_facts(
        &self,
        location_id: &str,
        new_facts: &[String],
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        doc.location_mut(location_id)?
            .facts
            .extend_from_slice(new_facts);

        store.save(&doc).await;
        Ok(format!(
            "Added {} facts to {location_id}: {new_facts:?}",
            new_facts.len()
        ))
    }

    /// Append facts to an item. Duplicates are allowed, as for
    /// locations.
    pub async fn add_item_facts(
        &self,
        item_id: &str,
        new_facts: &[String],
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        doc.item_mut(item_id)?.facts.extend_from_slice(new_facts);

        store.save(&doc).await;
        Ok(format!(
            "Added {} facts to {item_id}: {new_facts:?}",
            new_facts.len()
        ))
    }

    /// Append facts to an NPC, skipping exact-string duplicates.
    /// Reports which facts were actually new.
    pub async fn add_npc_facts(
        &self,
        npc_id: &str,
        new_facts: &[String],
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        let npc = doc.npc_mut(npc_id)?;
        let mut added = Vec::new();
        for fact in new_facts {
            if !npc.facts.contains(fact) {
                npc.facts.push(fact.clone());
                added.push(fact.clone());
            }
        }

        if added.is_empty() {
            return Ok(format!("No new facts added to {npc_id} (all were duplicates)"));
        }

        store.save(&doc).await;
        Ok(format!("Added {} facts to {npc_id}: {added:?}", added.len()))
    }

    // ========================================================================
    // Entity creation
    // ========================================================================

    /// Create a new item resting in a location, an NPC's inventory,
    /// or the player's inventory. The item record never stores its
    /// own location; the chosen container receives the id.
    pub async fn create_item(
        &self,
        item_id: &str,
        name: &str,
        location: &str,
        initial_facts: &[String],
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        if doc.items.contains_key(item_id) {
            return Err(WorldError::AlreadyExists {
                kind: EntityKind::Item,
                id: item_id.to_string(),
            });
        }

        let container = ContainerRef::resolve(&doc, location).ok_or_else(|| {
            WorldError::LocationNotFound {
                id: location.to_string(),
            }
        })?;

        let mut item = Item::new(name);
        item.facts = initial_facts.to_vec();
        doc.items.insert(item_id.to_string(), item);
        container.items_mut(&mut doc)?.push(item_id.to_string());

        store.save(&doc).await;
        Ok(format!("Created item '{name}' ({item_id}) at {location}"))
    }

    /// Create a new NPC at an existing location, with empty inventory
    /// and memory.
    pub async fn create_npc(
        &self,
        npc_id: &str,
        name: &str,
        location: &str,
        initial_facts: &[String],
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        if doc.npcs.contains_key(npc_id) {
            return Err(WorldError::AlreadyExists {
                kind: EntityKind::Npc,
                id: npc_id.to_string(),
            });
        }

        doc.location(location)?;

        let mut npc = Npc::new(name, location);
        npc.facts = initial_facts.to_vec();
        doc.npcs.insert(npc_id.to_string(), npc);

        store.save(&doc).await;
        Ok(format!("Created NPC '{name}' ({npc_id}) at {location}"))
    }

    /// Create a new location. Exits may point at locations that do
    /// not exist yet; movement validates targets at move time, and
    /// exits are never required to be symmetric.
    pub async fn create_location(
        &self,
        location_id: &str,
        name: &str,
        exits: Option<HashMap<String, String>>,
    ) -> Result<String, WorldError> {
        let store = self.store.lock().await;
        let mut doc = store.load().await;

        if doc.locations.contains_key(location_id) {
            return Err(WorldError::AlreadyExists {
                kind: EntityKind::Location,
                id: location_id.to_string(),
            });
        }

        let mut location = Location::new(name);
        location.exits = exits.unwrap_or_default();
        doc.locations.insert(location_id.to_string(), location);

        store.save(&doc).await;
        Ok(format!("Created location '{name}' ({location_id})"))
    }
}

/// Validate a move from `from` to `to`: the target must exist, some
/// exit of the current location must lead there by value, and no
/// locked door may guard any direction whose exit leads there.
fn check_move(doc: &WorldDocument, from: &str, to: &str) -> Result<(), WorldError> {
    doc.location(to)?;
    let current = doc.location(from)?;

    if !current.exits.values().any(|target| target == to) {
        return Err(WorldError::NoExit {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    for (direction, target) in &current.exits {
        if target == to {
            if let Some(door) = current.door_states.get(direction) {
                if door.locked {
                    return Err(WorldError::DoorLocked {
                        door: door.describe().to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Move an item between containers within an already-loaded document.
/// The destination is resolved before the source is mutated, so a bad
/// destination can never strand the item outside every container.
fn transfer_in_doc(
    doc: &mut WorldDocument,
    item: &str,
    from: &str,
    to: &str,
) -> Result<(), WorldError> {
    doc.item(item)?;

    let source = ContainerRef::resolve(doc, from).ok_or_else(|| WorldError::SourceNotFound {
        id: from.to_string(),
    })?;
    if !source.holds(doc, item) {
        return Err(WorldError::ItemNotPresent {
            item: item.to_string(),
            container: from.to_string(),
        });
    }

    let dest = ContainerRef::resolve(doc, to).ok_or_else(|| WorldError::DestinationNotFound {
        id: to.to_string(),
    })?;

    source.items_mut(doc)?.retain(|i| i != item);
    dest.items_mut(doc)?.push(item.to_string());
    Ok(())
}
