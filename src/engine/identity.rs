use crate::engine::profile::Profile;
use crate::entities::character::{EntityId, Identity};
use crate::rng::RandomSource;
use crate::tables::names::NamePool;
use crate::world::host::WorldHost;

pub fn generate(profile: &Profile, names: &NamePool, rng: &mut dyn RandomSource) -> Identity {
    let name = names.full_name(rng);
    Identity {
        keywords: profile.keywords(&name),
        room_desc: profile.room_desc(&name),
        look_desc: profile.look_desc.to_string(),
        name,
    }
}

/// Replaces all four display strings at once.
pub fn assign(
    host: &mut dyn WorldHost,
    rng: &mut dyn RandomSource,
    profile: &Profile,
    names: &NamePool,
    entity: EntityId,
) -> Identity {
    let identity = generate(profile, names, rng);
    host.set_identity(entity, &identity);
    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::EngineRng;

    #[test]
    fn identity_fields_share_the_name() {
        let names = NamePool::new(vec!["Kira".into()], vec!["Vance".into()]);
        let mut rng = EngineRng::from_seed(1);
        let identity = generate(&Profile::runner(), &names, &mut rng);
        assert_eq!(identity.name, "Kira Vance");
        assert_eq!(identity.keywords, "Kira Vance adventurer runner");
        assert_eq!(
            identity.room_desc,
            "Kira Vance is here, gearing up for the next run."
        );
        assert!(identity.look_desc.starts_with("A grim-faced adventurer"));
    }
}
