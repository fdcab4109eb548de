//! Everything one mission session owns, shared by the tick systems.

use std::collections::BTreeMap;

use hecs::{Component, Entity, World};
use rand_chacha::ChaCha8Rng;

use squadfall_core::components::{Extracted, Health, Identity, Tag};
use squadfall_core::enums::Faction;
use squadfall_core::events::SimEvent;
use squadfall_core::types::{ActorId, SimTime, TilePos};
use squadfall_map::grid::TileGrid;

use crate::engine::SimConfig;
use crate::mission_state::MissionState;

/// Session state. Systems borrow what they need from here.
pub struct Session {
    pub world: World,
    pub grid: TileGrid,
    /// Actor id -> entity. Iteration order is the canonical actor order.
    pub index: BTreeMap<ActorId, Entity>,
    pub time: SimTime,
    pub rng: ChaCha8Rng,
    pub events: Vec<SimEvent>,
    pub mission: MissionState,
    pub config: SimConfig,
}

impl Session {
    pub fn tick(&self) -> u64 {
        self.time.tick
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn entity(&self, id: ActorId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    /// All actor ids in ascending order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.index.keys().copied().collect()
    }

    /// Copy a component out of an actor.
    pub fn read<T: Component + Clone>(&self, id: ActorId) -> Option<T> {
        let entity = self.entity(id)?;
        self.world.get::<&T>(entity).ok().map(|c| (*c).clone())
    }

    /// Mutate a component in place. `None` if the actor or component is missing.
    pub fn update<T: Component, R>(&self, id: ActorId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let entity = self.entity(id)?;
        let mut component = self.world.get::<&mut T>(entity).ok()?;
        Some(f(&mut component))
    }

    pub fn insert<T: Component>(&mut self, id: ActorId, component: T) {
        if let Some(entity) = self.entity(id) {
            let _ = self.world.insert_one(entity, component);
        }
    }

    pub fn remove<T: Component>(&mut self, id: ActorId) -> Option<T> {
        let entity = self.entity(id)?;
        self.world.remove_one::<T>(entity).ok()
    }

    pub fn faction(&self, id: ActorId) -> Option<Faction> {
        self.read::<Identity>(id).map(|i| i.faction)
    }

    pub fn position(&self, id: ActorId) -> Option<TilePos> {
        self.read::<TilePos>(id)
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.read::<Health>(id).is_some_and(|h| h.is_alive())
    }

    pub fn is_extracted(&self, id: ActorId) -> bool {
        self.entity(id)
            .is_some_and(|e| self.world.get::<&Extracted>(e).is_ok())
    }

    /// Alive and still on the map: targetable and occupying a tile.
    pub fn is_active(&self, id: ActorId) -> bool {
        self.is_alive(id) && !self.is_extracted(id)
    }

    /// Active actors of one faction, in id order.
    pub fn active_of(&self, faction: Faction) -> Vec<ActorId> {
        self.index
            .keys()
            .copied()
            .filter(|id| self.faction(*id) == Some(faction) && self.is_active(*id))
            .collect()
    }

    /// Every actor of one faction regardless of state, in id order.
    pub fn all_of(&self, faction: Faction) -> Vec<ActorId> {
        self.index
            .keys()
            .copied()
            .filter(|id| self.faction(*id) == Some(faction))
            .collect()
    }

    /// Tiles held by active actors.
    pub fn occupancy(&self) -> BTreeMap<TilePos, ActorId> {
        self.index
            .keys()
            .copied()
            .filter(|id| self.is_active(*id))
            .filter_map(|id| self.position(id).map(|p| (p, id)))
            .collect()
    }

    /// Actors carrying a given tag, dead or alive.
    pub fn find_tagged(&self, tag: &str) -> Vec<ActorId> {
        self.index
            .keys()
            .copied()
            .filter(|id| self.read::<Tag>(*id).is_some_and(|t| t.0 == tag))
            .collect()
    }
}
