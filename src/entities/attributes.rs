#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Body,
    Quickness,
    Reaction,
    Strength,
    Intelligence,
    Willpower,
}

pub const ATTRIBUTE_MIN: i32 = 1;
pub const ATTRIBUTE_MAX: i32 = 12;

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Body,
        Attribute::Quickness,
        Attribute::Reaction,
        Attribute::Strength,
        Attribute::Intelligence,
        Attribute::Willpower,
    ];

    pub fn index(self) -> usize {
        match self {
            Attribute::Body => 0,
            Attribute::Quickness => 1,
            Attribute::Reaction => 2,
            Attribute::Strength => 3,
            Attribute::Intelligence => 4,
            Attribute::Willpower => 5,
        }
    }
}

/// Multiplier first, then the additive bump, then clamped to `[1, 12]`.
pub fn scale_attribute(base: i32, mult: f32, add: i32) -> i32 {
    // float -> int casts saturate and map NaN to 0
    let scaled = (base as f32 * mult).round() as i32;
    scaled
        .saturating_add(add)
        .clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_applies_before_bump() {
        assert_eq!(scale_attribute(4, 1.5, 1), 7);
        assert_eq!(scale_attribute(5, 1.0, 0), 5);
        assert_eq!(scale_attribute(3, 1.5, 0), 5);
    }

    #[test]
    fn scaled_attributes_stay_in_range() {
        let mults = [-3.0f32, -0.5, 0.0, 0.25, 1.0, 2.5, 40.0, f32::NAN, f32::INFINITY];
        let adds = [-100, -3, 0, 3, 100, i32::MAX, i32::MIN];
        for base in [-5, 0, 1, 6, 12, 30] {
            for mult in mults {
                for add in adds {
                    let value = scale_attribute(base, mult, add);
                    assert!(
                        (ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value),
                        "base={base} mult={mult} add={add} -> {value}"
                    );
                }
            }
        }
    }

    #[test]
    fn indices_follow_table_order() {
        for (idx, attribute) in Attribute::ALL.iter().enumerate() {
            assert_eq!(attribute.index(), idx);
        }
    }
}
