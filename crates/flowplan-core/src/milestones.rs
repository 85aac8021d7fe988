//! Milestone accessibility analysis and ordering.
//!
//! Every catalog object gets a 64-bit mask. Bit 0 means the object is
//! reachable at all; bit `i + 1` means it requires milestone `i`. A mask of
//! zero marks an inaccessible object.
//!
//! [`Milestones::milestone_order`] folds a mask into an ordinal that sorts
//! fully unlocked objects first, then locked objects by which milestones
//! remain, and inaccessible objects last. The ordinal depends on the set of
//! unlocked milestones, so [`Milestones::set_unlocked`] bumps a version
//! counter that callers can use to notice stale rankings.

use crate::catalog::{Catalog, DependencyKind};
use crate::id::ObjectId;
use std::collections::HashSet;

/// Bit 0 is reserved for "accessible", leaving 63 milestone bits.
pub const MAX_MILESTONES: usize = 63;

const ACCESSIBLE_BIT: u64 = 1;

#[derive(Debug, Clone)]
pub struct Milestones {
    milestones: Vec<ObjectId>,
    masks: Vec<u64>,
    locked_mask: u64,
    version: u64,
}

impl Milestones {
    /// Run the accessibility analysis over `catalog`. All milestones start
    /// locked.
    pub fn compute(catalog: &Catalog, milestones: Vec<ObjectId>) -> Result<Self, MilestoneError> {
        if milestones.len() > MAX_MILESTONES {
            return Err(MilestoneError::TooManyMilestones(milestones.len()));
        }
        if let Some(bad) = milestones.iter().find(|m| catalog.get(**m).is_none()) {
            return Err(MilestoneError::UnknownMilestone(*bad));
        }

        let mut milestone_bits = vec![0u64; catalog.len()];
        for (i, m) in milestones.iter().enumerate() {
            milestone_bits[m.index()] |= 1 << (i + 1);
        }

        let masks = propagate(catalog, &milestone_bits);
        let mut result = Self {
            milestones,
            masks,
            locked_mask: 0,
            version: 0,
        };
        result.locked_mask = result.mask_for(&HashSet::new());
        tracing::debug!(
            objects = catalog.len(),
            milestones = result.milestones.len(),
            "milestone analysis complete"
        );
        Ok(result)
    }

    /// A milestone set where every object is unlocked and nothing is tracked.
    pub fn all_unlocked(catalog: &Catalog) -> Self {
        let masks = propagate(catalog, &vec![0u64; catalog.len()]);
        Self {
            milestones: Vec::new(),
            masks,
            locked_mask: ACCESSIBLE_BIT,
            version: 0,
        }
    }

    /// Replace the set of unlocked milestones and invalidate orderings.
    /// Ids that are not tracked milestones are ignored.
    pub fn set_unlocked(&mut self, unlocked: &HashSet<ObjectId>) {
        self.locked_mask = self.mask_for(unlocked);
        self.version += 1;
    }

    fn mask_for(&self, unlocked: &HashSet<ObjectId>) -> u64 {
        let mut mask = ACCESSIBLE_BIT;
        for (i, m) in self.milestones.iter().enumerate() {
            if !unlocked.contains(m) {
                mask |= 1 << (i + 1);
            }
        }
        mask
    }

    /// Raw accessibility mask.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the analyzed catalog.
    pub fn mask(&self, id: ObjectId) -> u64 {
        self.masks[id.index()]
    }

    /// Comparable ordinal: lower sorts first.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the analyzed catalog.
    pub fn milestone_order(&self, id: ObjectId) -> u64 {
        self.mask(id).wrapping_sub(1) & self.locked_mask
    }

    /// Reachable at all, regardless of unlocked milestones.
    pub fn is_accessible(&self, id: ObjectId) -> bool {
        self.mask(id) != 0
    }

    /// Reachable without any milestone that is still locked.
    pub fn is_accessible_with_current_milestones(&self, id: ObjectId) -> bool {
        self.mask(id) & self.locked_mask == ACCESSIBLE_BIT
    }

    pub fn locked_mask(&self) -> u64 {
        self.locked_mask
    }

    pub fn milestones(&self) -> &[ObjectId] {
        &self.milestones
    }

    /// Incremented on every change to the unlocked set.
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Fixed-point propagation of masks along dependency lists.
fn propagate(catalog: &Catalog, milestone_bits: &[u64]) -> Vec<u64> {
    let mut masks = vec![0u64; catalog.len()];
    let max_passes = catalog.len() + 1;

    for pass in 0..max_passes {
        let mut changed = false;
        for object in catalog.objects() {
            let mut mask = ACCESSIBLE_BIT;
            for list in &object.dependencies {
                let part = match list.kind {
                    DependencyKind::RequireAll => list.objects.iter().try_fold(0u64, |acc, dep| {
                        let m = masks[dep.index()];
                        (m != 0).then_some(acc | m)
                    }),
                    DependencyKind::RequireAny => list
                        .objects
                        .iter()
                        .map(|dep| masks[dep.index()])
                        .filter(|&m| m != 0)
                        .min_by_key(|&m| (m.count_ones(), m)),
                };
                match part {
                    Some(bits) => mask |= bits,
                    None => {
                        mask = 0;
                        break;
                    }
                }
            }
            if mask != 0 {
                mask |= milestone_bits[object.id.index()];
            }
            if masks[object.id.index()] != mask {
                masks[object.id.index()] = mask;
                changed = true;
            }
        }
        if !changed {
            return masks;
        }
        if pass + 1 == max_passes {
            tracing::warn!(passes = max_passes, "milestone propagation did not converge");
        }
    }
    masks
}

#[derive(Debug, thiserror::Error)]
pub enum MilestoneError {
    #[error("at most {MAX_MILESTONES} milestones can be tracked, got {0}")]
    TooManyMilestones(usize),
    #[error("milestone {0:?} is not in the catalog")]
    UnknownMilestone(ObjectId),
}
