//! Multi-tick interactions: loot pickup and terminal hacks.
//!
//! A channel is a progress counter, never a blocking call. Competing
//! orders, knockdown and (configurably) damage interrupt it through
//! `orders::interrupt_channel`.

use tracing::info;

use squadfall_core::components::{Carrying, Channel};
use squadfall_core::enums::InteractableKind;
use squadfall_core::events::SimEvent;
use squadfall_core::types::ActorId;

use crate::mission_state::InteractableStatus;
use crate::session::Session;
use crate::systems::orders;

pub fn run(s: &mut Session) {
    for id in s.actor_ids() {
        if !s.is_active(id) {
            continue;
        }
        let Some(channel) = s.read::<Channel>(id) else {
            continue;
        };
        let still_ours = s
            .mission
            .interactables
            .get(&channel.object_id)
            .is_some_and(|o| o.status == InteractableStatus::Available && o.claimed_by == Some(id));
        if !still_ours {
            orders::interrupt_channel(s, id);
            continue;
        }

        let progress = channel.progress + 1;
        if progress < channel.required {
            s.update::<Channel, _>(id, |c| c.progress = progress);
        } else {
            complete(s, id, channel.object_id);
        }
    }
}

fn complete(s: &mut Session, actor: ActorId, object_id: String) {
    s.remove::<Channel>(actor);
    let Some(object) = s.mission.interactables.get_mut(&object_id) else {
        return;
    };
    object.claimed_by = None;
    let kind = object.spec.kind;
    object.status = match kind {
        InteractableKind::Loot => InteractableStatus::Carried(actor),
        InteractableKind::Terminal => InteractableStatus::Hacked,
    };
    if kind == InteractableKind::Loot {
        s.update::<Carrying, _>(actor, |c| c.items.push(object_id.clone()));
    }
    orders::clear_order(s, actor);

    info!(actor = %actor, object = %object_id, ?kind, "interaction completed");
    s.emit(SimEvent::InteractionCompleted { actor, object_id });
}
