//! Evac availability, retreat and per-actor extraction.
//!
//! An actor extracts only while alive, inside the evac zone, and with evac
//! available. Extraction takes it off the map without killing it; any loot
//! it carries counts as secured.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use squadfall_core::components::*;
use squadfall_core::enums::*;
use squadfall_core::error::{CommandError, ExtractBlock};
use squadfall_core::events::SimEvent;
use squadfall_core::types::{ActorId, TilePos};

use crate::mission_state::InteractableStatus;
use crate::session::Session;
use crate::systems::orders::{self, Intent};

/// Extract one actor, or say which precondition failed.
pub fn extract(s: &mut Session, actor: ActorId) -> Result<(), CommandError> {
    if s.entity(actor).is_none() {
        return Err(CommandError::UnknownActor(actor));
    }
    if s.is_extracted(actor) {
        return Err(CommandError::ActorExtracted(actor));
    }
    if !s.is_alive(actor) {
        return Err(CommandError::CannotExtract(ExtractBlock::NotAlive));
    }
    if s.read::<Behavior>(actor).is_some_and(|b| b.state == BehaviorState::Down) {
        return Err(CommandError::ActorDown(actor));
    }
    if !s.mission.evac_available {
        return Err(CommandError::CannotExtract(ExtractBlock::EvacUnavailable));
    }
    let in_zone = s
        .position(actor)
        .is_some_and(|p| s.grid.zone_at(p) == ZoneKind::Evac);
    if !in_zone {
        return Err(CommandError::CannotExtract(ExtractBlock::NotInZone));
    }
    complete_extraction(s, actor);
    Ok(())
}

fn complete_extraction(s: &mut Session, actor: ActorId) {
    orders::supersede(s, actor);
    let tick = s.tick();
    s.insert(actor, Extracted { at_tick: tick });
    if let Some(carrying) = s.read::<Carrying>(actor) {
        for item in &carrying.items {
            if let Some(object) = s.mission.interactables.get_mut(item) {
                object.status = InteractableStatus::Secured;
            }
        }
    }
    info!(actor = %actor, tick, "actor extracted");
    s.emit(SimEvent::ActorExtracted { actor });
}

/// Request evac. It arrives after the configured delay.
pub fn call_evac(s: &mut Session) {
    if s.mission.evac_available || s.mission.evac_at.is_some() {
        return;
    }
    let at = s.tick() + s.config.evac_delay_ticks;
    s.mission.evac_at = Some(at);
    info!(at, "evac called");
    if s.config.evac_delay_ticks == 0 {
        make_available(s);
    }
}

pub fn make_available(s: &mut Session) {
    if s.mission.evac_available {
        return;
    }
    s.mission.evac_available = true;
    info!(tick = s.tick(), "evac available");
    s.emit(SimEvent::EvacAvailable);
}

/// Abandon the mission: call evac and send every crew member to it.
pub fn initiate_retreat(s: &mut Session) -> Result<(), CommandError> {
    let phase = s.mission.phase;
    if !phase.is_live() {
        return Err(CommandError::WrongPhase(phase));
    }
    if s.mission.retreating {
        return Ok(());
    }
    s.mission.retreating = true;
    info!(tick = s.tick(), "retreat initiated");
    call_evac(s);
    route_crew_to_evac(s);
    Ok(())
}

/// Stop retreating. Crew still walking to evac halt; evac stays called.
pub fn cancel_retreat(s: &mut Session) -> Result<(), CommandError> {
    let phase = s.mission.phase;
    if !phase.is_live() {
        return Err(CommandError::WrongPhase(phase));
    }
    if !s.mission.retreating {
        return Ok(());
    }
    s.mission.retreating = false;
    info!(tick = s.tick(), "retreat cancelled");
    for crew in s.active_of(Faction::Crew) {
        let retreating = s.read::<Behavior>(crew).is_some_and(|b| {
            matches!(b.order, Order::Move { retreating: true, .. })
        });
        if retreating {
            orders::clear_order(s, crew);
        }
    }
    Ok(())
}

fn route_crew_to_evac(s: &mut Session) {
    let evac = s.grid.zone_tiles(ZoneKind::Evac);
    if evac.is_empty() {
        warn!("retreat with no evac zone on the map");
        return;
    }
    let mut claimed: BTreeSet<TilePos> = BTreeSet::new();
    for crew in s.active_of(Faction::Crew) {
        let Some(pos) = s.position(crew) else {
            continue;
        };
        if s.grid.zone_at(pos) == ZoneKind::Evac {
            claimed.insert(pos);
            continue;
        }
        let occupancy = s.occupancy();
        let target = evac
            .iter()
            .copied()
            .filter(|t| !claimed.contains(t) && !occupancy.contains_key(t))
            .min_by(|a, b| pos.distance_to(a).total_cmp(&pos.distance_to(b)));
        let Some(target) = target else {
            continue;
        };
        match orders::issue(s, crew, Intent::Retreat(target)) {
            Ok(()) => {
                claimed.insert(target);
            }
            Err(err) => debug!(crew = %crew, %err, "crew cannot retreat"),
        }
    }
}

/// Evac timer, and automatic extraction of retreating crew in the zone.
pub fn run(s: &mut Session) {
    if !s.mission.evac_available && s.mission.evac_at.is_some_and(|at| s.tick() >= at) {
        make_available(s);
    }
    if !(s.mission.retreating && s.mission.evac_available) {
        return;
    }
    for crew in s.active_of(Faction::Crew) {
        let in_zone = s
            .position(crew)
            .is_some_and(|p| s.grid.zone_at(p) == ZoneKind::Evac);
        if in_zone && extract(s, crew).is_ok() {
            debug!(crew = %crew, "retreating crew extracted");
        }
    }
}
