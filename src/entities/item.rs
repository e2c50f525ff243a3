use serde::Deserialize;

/// A live object instance owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

/// An object prototype number, as listed in gear tables and archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ItemTypeId(pub u32);

impl ItemTypeId {
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

/// Entries of an archetype item list up to, not including, the first unassigned one.
pub fn leading_assigned(items: &[ItemTypeId]) -> impl Iterator<Item = ItemTypeId> + '_ {
    items.iter().copied().take_while(|item| item.is_assigned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_assigned_stops_at_first_gap() {
        let items = [ItemTypeId(10), ItemTypeId(11), ItemTypeId(0), ItemTypeId(12)];
        let taken: Vec<_> = leading_assigned(&items).collect();
        assert_eq!(taken, vec![ItemTypeId(10), ItemTypeId(11)]);
        assert_eq!(leading_assigned(&[ItemTypeId(0)]).count(), 0);
    }
}
