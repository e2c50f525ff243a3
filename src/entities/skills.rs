use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u16);

pub const SKILL_MIN: i32 = 2;
pub const SKILL_MAX: i32 = 12;

/// `round(base * mult) + jitter`, clamped to `[2, 12]`.
pub fn scale_skill(base: i32, mult: f32, jitter: i32) -> i32 {
    let scaled = (base as f32 * mult).round() as i32;
    scaled.saturating_add(jitter).clamp(SKILL_MIN, SKILL_MAX)
}
