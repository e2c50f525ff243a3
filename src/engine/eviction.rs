use crate::engine::profile::ProfileKind;
use crate::engine::DynamicNpcEngine;
use crate::entities::character::EntityId;
use crate::rng::RandomSource;
use crate::world::host::WorldHost;
use crate::world::room::ZoneId;
use std::collections::{BTreeMap, HashSet};

/// Unequips and destroys everything the character holds, then removes it.
fn strip_and_remove(host: &mut dyn WorldHost, id: EntityId) {
    for (slot, _) in host.equipment(id) {
        if let Some(item) = host.unequip(id, slot) {
            host.destroy_item(item);
        }
    }
    for item in host.carried(id) {
        if host.take_item(id, item) {
            host.destroy_item(item);
        }
    }
    host.remove_character(id);
}

impl<R: RandomSource> DynamicNpcEngine<R> {
    /// Removes dynamic entities from player-free zones that have been quiet for
    /// at least their profile's inactivity threshold.
    pub(crate) fn sweep_idle_zones(
        &mut self,
        host: &mut dyn WorldHost,
        now: u64,
        occupied: &HashSet<ZoneId>,
    ) -> usize {
        let mut by_zone: BTreeMap<ZoneId, Vec<(EntityId, ProfileKind)>> = BTreeMap::new();
        for id in self.lifecycle.ids() {
            let Some(record) = self.lifecycle.get(id) else {
                continue;
            };
            let zone = host
                .character(id)
                .and_then(|view| view.room)
                .and_then(|room| host.zone_of(room));
            if let Some(zone) = zone {
                by_zone.entry(zone).or_default().push((id, record.profile));
            }
        }

        let mut evicted = 0;
        for (zone, members) in by_zone {
            if occupied.contains(&zone) {
                continue;
            }
            let mut swept = 0;
            for (id, kind) in members {
                let Some(threshold) = self.profile(kind).map(|profile| profile.spawn.inactivity_secs)
                else {
                    continue;
                };
                if !self.activity.idle_for(zone, now, threshold) {
                    continue;
                }
                if host.character(id).map_or(true, |view| view.being_removed) {
                    continue;
                }
                strip_and_remove(host, id);
                self.forget(id);
                swept += 1;
            }
            if swept > 0 {
                tracing::info!(
                    target: "npcgen::eviction",
                    zone = zone.0,
                    evicted = swept,
                    "evicted dynamic entities from idle zone"
                );
                self.activity.touch(zone, now);
                evicted += swept;
            }
        }
        evicted
    }

    pub(crate) fn ensure_boot_cleanup(&mut self, host: &mut dyn WorldHost) {
        if !self.boot_cleanup_done {
            self.boot_cleanup(host);
        }
    }

    /// Removes NPCs left behind by an earlier session: anything built from a
    /// profile template or carrying a profile's role keyword that this engine is
    /// not tracking. Runs once; later calls return 0.
    pub fn boot_cleanup(&mut self, host: &mut dyn WorldHost) -> usize {
        if self.boot_cleanup_done {
            return 0;
        }
        self.boot_cleanup_done = true;
        let leftovers: Vec<EntityId> = host
            .characters()
            .into_iter()
            .filter(|id| !self.lifecycle.contains(*id))
            .filter(|id| {
                host.character(*id).is_some_and(|view| {
                    view.is_npc
                        && self
                            .profiles
                            .iter()
                            .any(|profile| profile.matches_leftover(&view.keywords, view.template))
                })
            })
            .collect();
        for id in &leftovers {
            strip_and_remove(host, *id);
        }
        if !leftovers.is_empty() {
            tracing::info!(
                target: "npcgen::eviction",
                removed = leftovers.len(),
                "boot cleanup removed dynamic NPCs from a previous session"
            );
        }
        leftovers.len()
    }
}
