use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

static MODIFICATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)M(\d+)").expect("invalid MODIFICATION_REGEX"));

/// The family of an equipment item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentKind {
    Turret,
    Hull,
    Protection,
}

/// Equipment seen on a profile page.
///
/// Items are stored as `"{Name} M{level}"`.
/// Every equipped item is also in the matching owned set.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct EquipmentSet {
    /// Every turret modification ever owned, in discovery order
    pub turrets: IndexSet<String>,

    /// Every hull modification ever owned, in discovery order
    pub hulls: IndexSet<String>,

    /// Every protection modification ever owned, sorted
    pub protections: IndexSet<String>,

    /// Turrets currently installed
    pub equipped_turrets: IndexSet<String>,

    /// Hulls currently installed
    pub equipped_hulls: IndexSet<String>,

    /// Protections currently installed, sorted
    pub equipped_protections: IndexSet<String>,
}

impl EquipmentSet {
    /// Make an empty [`EquipmentSet`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an owned item.
    ///
    /// Returns `false` if it was already known.
    pub fn insert_owned(&mut self, kind: EquipmentKind, item: String) -> bool {
        self.owned_mut(kind).insert(item)
    }

    /// Record an installed item.
    ///
    /// It is added to the owned set too.
    pub fn insert_equipped(&mut self, kind: EquipmentKind, item: String) -> bool {
        if !self.owned(kind).contains(&item) {
            self.owned_mut(kind).insert(item.clone());
        }
        self.equipped_mut(kind).insert(item)
    }

    /// The owned items of a family
    pub fn owned(&self, kind: EquipmentKind) -> &IndexSet<String> {
        match kind {
            EquipmentKind::Turret => &self.turrets,
            EquipmentKind::Hull => &self.hulls,
            EquipmentKind::Protection => &self.protections,
        }
    }

    /// The installed items of a family
    pub fn equipped(&self, kind: EquipmentKind) -> &IndexSet<String> {
        match kind {
            EquipmentKind::Turret => &self.equipped_turrets,
            EquipmentKind::Hull => &self.equipped_hulls,
            EquipmentKind::Protection => &self.equipped_protections,
        }
    }

    fn owned_mut(&mut self, kind: EquipmentKind) -> &mut IndexSet<String> {
        match kind {
            EquipmentKind::Turret => &mut self.turrets,
            EquipmentKind::Hull => &mut self.hulls,
            EquipmentKind::Protection => &mut self.protections,
        }
    }

    fn equipped_mut(&mut self, kind: EquipmentKind) -> &mut IndexSet<String> {
        match kind {
            EquipmentKind::Turret => &mut self.equipped_turrets,
            EquipmentKind::Hull => &mut self.equipped_hulls,
            EquipmentKind::Protection => &mut self.equipped_protections,
        }
    }

    /// Sort protections for stable display.
    pub(crate) fn sort_protections(&mut self) {
        self.protections.sort();
        self.equipped_protections.sort();
    }

    /// Turrets and hulls, the items that count towards equipment quality.
    pub fn weapons(&self) -> impl Iterator<Item = &str> {
        self.turrets.iter().chain(self.hulls.iter()).map(String::as_str)
    }

    /// Returns `true` if nothing was found.
    pub fn is_empty(&self) -> bool {
        self.turrets.is_empty() && self.hulls.is_empty() && self.protections.is_empty()
    }
}

/// Get the modification level of an item like `"Smoky M2"`.
///
/// Items without a level count as M0.
pub fn modification_level(item: &str) -> u8 {
    MODIFICATION_REGEX
        .captures(item)
        .and_then(|captures| captures.get(1)?.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equipped_items_are_owned() {
        let mut set = EquipmentSet::new();
        assert!(set.insert_equipped(EquipmentKind::Hull, "Hunter M2".into()));
        assert!(set.hulls.contains("Hunter M2"));
        assert!(!set.insert_owned(EquipmentKind::Hull, "Hunter M2".into()));
        assert_eq!(set.hulls.len(), 1);
    }

    #[test]
    fn levels() {
        assert_eq!(modification_level("Smoky M3"), 3);
        assert_eq!(modification_level("Rail m1"), 1);
        assert_eq!(modification_level("Badger"), 0);
    }
}
