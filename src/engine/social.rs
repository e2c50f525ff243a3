use crate::engine::lifecycle::SpawnPhase;
use crate::engine::{roll_secs, DynamicNpcEngine};
use crate::entities::character::EntityId;
use crate::rng::RandomSource;
use crate::tables::replies::{ReplyKind, ReplyScope};
use crate::world::host::{Action, WorldHost};
use crate::world::room::RoomFlag;
use std::sync::Arc;

const COOLDOWN_SECS: (i64, i64) = (2, 5);

impl<R: RandomSource> DynamicNpcEngine<R> {
    /// Lets configured dynamic entities in the actor's room answer a social.
    /// Returns how many replied.
    pub fn notify_social(
        &mut self,
        host: &mut dyn WorldHost,
        actor: EntityId,
        target: Option<EntityId>,
        social: &str,
    ) -> usize {
        let Some(actor_view) = host.character(actor) else {
            return 0;
        };
        let Some(room) = actor_view.room.and_then(|room| host.room(room)) else {
            return 0;
        };
        if room.has(RoomFlag::Peaceful) {
            return 0;
        }

        let now = host.now();
        let store = Arc::clone(&self.store);
        let tables = store.load();
        let mut replied = 0;
        for responder in host.occupants(room.id) {
            if responder == actor || !self.answers_socials(responder) {
                continue;
            }
            let Some(view) = host.character(responder) else {
                continue;
            };
            if !view.awake || view.being_removed {
                continue;
            }
            // the cooldown is spent even when the responder cannot see the actor
            if !self.take_cooldown(responder, now) || !host.can_see(responder, actor) {
                continue;
            }

            let targeted = target == Some(responder);
            let scope = if targeted {
                ReplyScope::Targeted
            } else {
                ReplyScope::Room
            };
            let Some(reply) = tables.replies.pick(scope, social, &mut self.rng) else {
                continue;
            };
            let text = reply.render(&actor_view.name);
            let action = match reply.kind {
                ReplyKind::Say => Action::Say(text),
                ReplyKind::Emote => Action::Emote(text),
                ReplyKind::Action => Action::Social {
                    name: text,
                    target: targeted.then(|| actor_view.name.clone()),
                },
            };
            tracing::debug!(
                target: "npcgen::social",
                responder = responder.0,
                actor = actor.0,
                social,
                ?action,
                "answering social"
            );
            host.perform(responder, action);
            replied += 1;
        }
        replied
    }

    fn answers_socials(&self, id: EntityId) -> bool {
        self.lifecycle
            .get(id)
            .filter(|record| record.phase == SpawnPhase::Configured)
            .and_then(|record| self.profile(record.profile))
            .is_some_and(|profile| profile.answers_socials)
    }

    /// Re-arms the reply cooldown and returns `true` when it had run out.
    fn take_cooldown(&mut self, id: EntityId, now: u64) -> bool {
        if self
            .reply_cooldowns
            .get(&id)
            .is_some_and(|ready_at| now < *ready_at)
        {
            return false;
        }
        let cooldown = roll_secs(&mut self.rng, COOLDOWN_SECS.0, COOLDOWN_SECS.1);
        self.reply_cooldowns.put(id, now + cooldown);
        true
    }
}
