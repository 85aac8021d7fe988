//! Quick-select: pick the single candidate a one-click action should apply.
//!
//! The scan first treats only `Normal` objects as the universe. Special-type
//! objects are considered only when no `Normal` candidate is accessible, so
//! they can never break a tie between `Normal` candidates.

use crate::catalog::SpecialType;
use crate::id::ObjectId;
use crate::ordering::OrderingContext;
use std::fmt;

/// Why a quick-select did or did not pick something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionHint {
    /// No candidate is reachable at all.
    NothingAccessible,
    /// Candidates exist but all need milestones that are still locked.
    LockedByMilestones,
    /// The only accessible candidate was picked.
    OnlyAccessible,
    /// The unique favorite was picked.
    Favorite,
    /// Several accessible candidates and no favorite among them.
    MarkFavorite,
    /// More than one accessible candidate is a favorite.
    MultipleFavorites,
}

impl fmt::Display for SelectionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SelectionHint::NothingAccessible => "Hint: mark one of these as accessible to enable quick select",
            SelectionHint::LockedByMilestones => "Hint: complete milestones to enable quick select",
            SelectionHint::OnlyAccessible => "Quick select adds the only accessible option",
            SelectionHint::Favorite => "Quick select adds your favorite",
            SelectionHint::MarkFavorite => "Hint: set a favorite to add it with quick select",
            SelectionHint::MultipleFavorites => "Hint: quick select is unavailable with multiple favorites",
        };
        f.write_str(text)
    }
}

/// Result of [`select_single`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub selected: Option<ObjectId>,
    pub hint: SelectionHint,
}

struct Pass {
    selection: Selection,
    considered: usize,
}

/// Pick the candidate a quick-select action would apply, if unambiguous.
pub fn select_single(candidates: &[ObjectId], ctx: &OrderingContext<'_>) -> Selection {
    let normal = scan(candidates, ctx, true);
    // Special-type candidates only count when no Normal one is accessible,
    // so a special favorite never breaks a tie between Normal candidates.
    if normal.considered > 0 {
        return normal.selection;
    }
    scan(candidates, ctx, false).selection
}

fn scan(candidates: &[ObjectId], ctx: &OrderingContext<'_>, normal_only: bool) -> Pass {
    let milestones = ctx.milestones;
    let mut hint = if candidates.iter().any(|&c| milestones.is_accessible(c)) {
        SelectionHint::LockedByMilestones
    } else {
        SelectionHint::NothingAccessible
    };
    let mut accept_only_favorites = false;
    let mut element: Option<ObjectId> = None;
    let mut considered = 0;

    for &candidate in candidates {
        if !milestones.is_accessible_with_current_milestones(candidate) {
            continue;
        }
        if normal_only && ctx.catalog.object(candidate).special_type != SpecialType::Normal {
            continue;
        }
        considered += 1;

        if ctx.preferences.is_favorite(candidate) {
            if !accept_only_favorites || element.is_none() {
                element = Some(candidate);
                hint = SelectionHint::Favorite;
                accept_only_favorites = true;
            } else {
                return Pass {
                    selection: Selection {
                        selected: None,
                        hint: SelectionHint::MultipleFavorites,
                    },
                    considered,
                };
            }
        } else if !accept_only_favorites {
            if element.is_none() {
                element = Some(candidate);
                hint = SelectionHint::OnlyAccessible;
            } else {
                element = None;
                hint = SelectionHint::MarkFavorite;
                accept_only_favorites = true;
            }
        }
    }

    Pass {
        selection: Selection {
            selected: element,
            hint,
        },
        considered,
    }
}
