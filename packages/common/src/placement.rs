//! Reordering and re-parenting of categories.
//!
//! Planners are pure: they read the current categories and return the
//! single `Placement` to persist, or an error before anything is written.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{DomainError, DomainResult};
use crate::tree::CategoryTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    Up,
    Down,
}

/// Where a dragged category was dropped relative to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Above,
    Below,
    Inside,
}

/// Already-resolved drag-and-drop intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MoveRequest {
    #[schema(example = 12)]
    pub dragged_id: i32,
    #[schema(example = 7)]
    pub target_id: i32,
    pub position: DropPosition,
}

/// New parent and order for one category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub sort_order: f64,
}

/// Categories sharing `parent`, ordered by `sort_order` (ties keep slice order).
fn sorted_siblings(categories: &[Category], parent: Option<i32>) -> Vec<&Category> {
    let mut siblings: Vec<&Category> = categories
        .iter()
        .filter(|c| c.parent_id == parent)
        .collect();
    siblings.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
    siblings
}

/// Swap a category one step up or down among its siblings.
///
/// Returns `Ok(None)` when the category is already first (up) or last (down).
pub fn plan_reorder(
    categories: &[Category],
    id: i32,
    direction: ReorderDirection,
) -> DomainResult<Option<Placement>> {
    let target = categories
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| DomainError::not_found("Category not found"))?;

    let siblings = sorted_siblings(categories, target.parent_id);
    let Some(pos) = siblings.iter().position(|c| c.id == id) else {
        return Err(DomainError::not_found("Category not found"));
    };

    let sort_order = match direction {
        ReorderDirection::Up => {
            if pos == 0 {
                return Ok(None);
            }
            siblings[pos - 1].sort_order - 1.0
        }
        ReorderDirection::Down => {
            if pos + 1 == siblings.len() {
                return Ok(None);
            }
            siblings[pos + 1].sort_order + 1.0
        }
    };

    Ok(Some(Placement {
        id,
        parent_id: target.parent_id,
        sort_order,
    }))
}

/// Resolve a drop onto a target category.
///
/// Dropping a category onto itself is a no-op. The resulting parent must
/// not be the dragged category or anything below it.
pub fn plan_move(tree: &CategoryTree, request: MoveRequest) -> DomainResult<Option<Placement>> {
    let MoveRequest {
        dragged_id,
        target_id,
        position,
    } = request;

    if dragged_id == target_id {
        return Ok(None);
    }

    if !tree.contains(dragged_id) {
        return Err(DomainError::not_found("Category not found"));
    }
    let target = tree.get(target_id).ok_or_else(|| {
        DomainError::ReferentialIntegrity(format!("Target category {target_id} does not exist"))
    })?;

    let (parent_id, sort_order) = match position {
        DropPosition::Inside => {
            let order = tree
                .children(target_id)
                .map(|c| c.sort_order)
                .reduce(f64::max)
                .map_or(0.0, |max| max + 1.0);
            (Some(target_id), order)
        }
        DropPosition::Above => (target.parent_id, target.sort_order - 0.5),
        DropPosition::Below => (target.parent_id, target.sort_order + 0.5),
    };

    if let Some(parent) = parent_id
        && (parent == dragged_id || tree.is_descendant(dragged_id, parent))
    {
        return Err(DomainError::Cycle(format!(
            "Cannot move category {dragged_id} under its own descendant {parent}"
        )));
    }

    Ok(Some(Placement {
        id: dragged_id,
        parent_id,
        sort_order,
    }))
}

/// Check an explicit parent assignment made through a plain update.
pub fn validate_parent_change(
    tree: &CategoryTree,
    id: i32,
    new_parent: Option<i32>,
) -> DomainResult<()> {
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if parent == id {
        return Err(DomainError::Cycle(
            "A category cannot be its own parent".into(),
        ));
    }
    if !tree.contains(parent) {
        return Err(DomainError::ReferentialIntegrity(format!(
            "Parent category {parent} does not exist"
        )));
    }
    if tree.is_descendant(id, parent) {
        return Err(DomainError::Cycle(format!(
            "Category {parent} is a descendant of category {id}"
        )));
    }
    Ok(())
}

/// Order value that appends after the current last sibling under `parent`.
pub fn next_sibling_order(categories: &[Category], parent: Option<i32>) -> f64 {
    categories
        .iter()
        .filter(|c| c.parent_id == parent)
        .map(|c| c.sort_order)
        .reduce(f64::max)
        .map_or(0.0, |max| max + 1.0)
}

/// Reassign `0, 1, 2, ...` to the siblings under `parent` in their current
/// sequence. Only categories whose order actually changes are returned.
pub fn renumber_siblings(categories: &[Category], parent: Option<i32>) -> Vec<Placement> {
    sorted_siblings(categories, parent)
        .into_iter()
        .enumerate()
        .filter(|(i, c)| c.sort_order != *i as f64)
        .map(|(i, c)| Placement {
            id: c.id,
            parent_id: parent,
            sort_order: i as f64,
        })
        .collect()
}
