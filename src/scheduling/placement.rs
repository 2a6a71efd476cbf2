use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::compat::compatible;
use super::generator::ScheduleGenerator;
use crate::catalog::Catalog;
use crate::errors::{Result, RevisitError};
use crate::models::Item;

/// Where an item is being moved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementTarget {
    /// A real box, by id
    Box(String),
    /// The pseudo-box for items without a box, optionally inside a category
    Unclassified { category_id: Option<String> },
}

/// What a placement does to the item's pattern and schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementDecision {
    /// Pattern and schedule stay as they are
    Keep,
    /// Pattern id switches to a structurally identical one; schedule kept
    AdoptPattern { pattern_id: String },
    /// Pattern switches and the schedule is generated afresh
    Regenerate { pattern_id: String },
}

/// Decides whether an item may be placed into a target
///
/// An item with no completed review dates can go anywhere; entering a box
/// that binds a different pattern regenerates its schedule. Once a review
/// has been completed, only boxes with no pattern or a compatible one are
/// allowed, so completed steps keep their meaning. The unclassified
/// pseudo-box is always allowed and never touches the pattern.
///
/// ### Errors
///
/// Returns an error if:
/// - The box, the box's pattern or the item's pattern is unknown (`NotFound`)
/// - The item has completed reviews and the box pattern is incompatible
///   (`IncompatiblePattern`)
#[instrument(skip(item, catalog), fields(item_id = %item.id))]
pub fn check_placement(
    item: &Item,
    target: &PlacementTarget,
    catalog: &Catalog,
) -> Result<PlacementDecision> {
    let box_id = match target {
        PlacementTarget::Unclassified { .. } => return Ok(PlacementDecision::Keep),
        PlacementTarget::Box(box_id) => box_id,
    };

    let review_box = catalog.review_box(box_id)?;
    let Some(box_pattern_id) = review_box.pattern_id.as_deref() else {
        debug!("Box {} has no pattern, keeping schedule", box_id);
        return Ok(PlacementDecision::Keep);
    };
    let box_pattern = catalog.pattern(box_pattern_id)?;

    if item.pattern_id.as_deref() == Some(box_pattern_id) {
        return Ok(PlacementDecision::Keep);
    }

    if !item.has_completed_reviews() {
        debug!("No completed reviews, switching to pattern {}", box_pattern_id);
        return Ok(PlacementDecision::Regenerate {
            pattern_id: box_pattern_id.to_string(),
        });
    }

    let item_pattern_id = item.pattern_id.as_deref().ok_or_else(|| {
        warn!("Item has completed reviews but no pattern");
        RevisitError::IncompatiblePattern {
            item_pattern: "none".to_string(),
            box_pattern: box_pattern_id.to_string(),
        }
    })?;
    let item_pattern = catalog.pattern(item_pattern_id)?;

    if compatible(item_pattern, box_pattern) {
        Ok(PlacementDecision::AdoptPattern {
            pattern_id: box_pattern_id.to_string(),
        })
    } else {
        warn!("Pattern {} is incompatible with box pattern {}", item_pattern_id, box_pattern_id);
        Err(RevisitError::IncompatiblePattern {
            item_pattern: item_pattern_id.to_string(),
            box_pattern: box_pattern_id.to_string(),
        })
    }
}

/// Produces the placed item for a decision returned by [`check_placement`]
///
/// The input item is never modified.
pub fn apply_placement(
    item: &Item,
    target: &PlacementTarget,
    decision: &PlacementDecision,
    catalog: &Catalog,
    generator: &ScheduleGenerator,
) -> Result<Item> {
    let mut placed = item.clone();

    match target {
        PlacementTarget::Box(box_id) => {
            let review_box = catalog.review_box(box_id)?;
            placed.box_id = Some(review_box.id.clone());
            placed.category_id = Some(review_box.category_id.clone());
        }
        PlacementTarget::Unclassified { category_id } => {
            placed.box_id = None;
            placed.category_id = category_id.clone();
        }
    }

    match decision {
        PlacementDecision::Keep => {}
        PlacementDecision::AdoptPattern { pattern_id } => {
            placed.pattern_id = Some(pattern_id.clone());
        }
        PlacementDecision::Regenerate { pattern_id } => {
            let pattern = catalog.pattern(pattern_id)?;
            placed.review_dates = generator.generate(pattern, placed.learned_date)?;
            placed.pattern_id = Some(pattern_id.clone());
        }
    }

    Ok(placed)
}
