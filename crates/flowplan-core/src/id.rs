use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a recipe row inside its production table.
    pub struct RowId;
}

/// Identifies a catalog object (recipe, goods, crafter, technology).
///
/// Ids are dense indices assigned at registration and never change for the
/// lifetime of a loaded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Index into per-object tables (milestone masks, catalog storage).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a quality tier. Tier 0 is always Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualityId(pub u8);

impl QualityId {
    pub const NORMAL: QualityId = QualityId(0);
}

/// Identifies a group of fluids that are the same logical fluid at
/// different temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantGroupId(pub u32);

/// Identifies a production table submitted to the solve worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey(pub u64);

/// A catalog object paired with the quality it is used at.
///
/// Two references are equal only when both the object and the quality match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectWithQuality {
    pub target: ObjectId,
    pub quality: QualityId,
}

impl ObjectWithQuality {
    pub fn new(target: ObjectId, quality: QualityId) -> Self {
        Self { target, quality }
    }

    /// Wrap an object at Normal quality.
    pub fn normal(target: ObjectId) -> Self {
        Self::new(target, QualityId::NORMAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_equality_needs_object_and_quality() {
        let a = ObjectWithQuality::new(ObjectId(3), QualityId(1));
        let b = ObjectWithQuality::new(ObjectId(3), QualityId(1));
        let other_quality = ObjectWithQuality::new(ObjectId(3), QualityId::NORMAL);
        let other_object = ObjectWithQuality::new(ObjectId(4), QualityId(1));
        assert_eq!(a, b);
        assert_ne!(a, other_quality);
        assert_ne!(a, other_object);
    }

    #[test]
    fn normal_wrapper_uses_tier_zero() {
        let w = ObjectWithQuality::normal(ObjectId(7));
        assert_eq!(w.quality, QualityId(0));
        assert_eq!(w.target.index(), 7);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ObjectWithQuality::normal(ObjectId(0)), "coal");
        map.insert(ObjectWithQuality::new(ObjectId(0), QualityId(2)), "rare coal");
        assert_eq!(map.len(), 2);
        assert_eq!(map[&ObjectWithQuality::normal(ObjectId(0))], "coal");
    }
}
