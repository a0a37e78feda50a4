//! Category hierarchy built from the flat persisted list.
//!
//! The tree is an arena addressed by category id: nodes live in a `Vec`,
//! an id map points into it and each parent keeps an ordered list of child
//! slots. Nothing here is persisted; callers rebuild on every fetch.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A category with its children, for presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Default, Clone)]
pub struct CategoryTree {
    nodes: Vec<Category>,
    index: HashMap<i32, usize>,
    roots: Vec<usize>,
    children: HashMap<i32, Vec<usize>>,
}

impl CategoryTree {
    /// Build the tree from a flat list.
    ///
    /// A category is a root when it has no parent, when its parent id is
    /// unknown, or when it names itself as parent. Siblings are ordered by
    /// `sort_order`, ties keep insertion order. A repeated id replaces the
    /// earlier entry in place.
    pub fn build(categories: Vec<Category>) -> Self {
        let mut nodes: Vec<Category> = Vec::with_capacity(categories.len());
        let mut index: HashMap<i32, usize> = HashMap::with_capacity(categories.len());

        for category in categories {
            match index.get(&category.id) {
                Some(&slot) => nodes[slot] = category,
                None => {
                    index.insert(category.id, nodes.len());
                    nodes.push(category);
                }
            }
        }

        let mut roots = Vec::new();
        let mut children: HashMap<i32, Vec<usize>> = HashMap::new();

        for (slot, node) in nodes.iter().enumerate() {
            match node.parent_id {
                Some(parent) if parent != node.id && index.contains_key(&parent) => {
                    children.entry(parent).or_default().push(slot);
                }
                _ => roots.push(slot),
            }
        }

        let mut tree = Self {
            nodes,
            index,
            roots,
            children,
        };
        tree.adopt_unreachable();

        let nodes = &tree.nodes;
        let by_order = |a: &usize, b: &usize| nodes[*a].sort_order.total_cmp(&nodes[*b].sort_order);
        tree.roots.sort_by(by_order);
        for slots in tree.children.values_mut() {
            slots.sort_by(by_order);
        }

        tree
    }

    /// Promote nodes that no root reaches (corrupt data with a parent loop)
    /// so that every category stays visible.
    fn adopt_unreachable(&mut self) {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.clone();
        self.mark_reachable(&mut stack, &mut seen);

        for slot in 0..self.nodes.len() {
            if seen.contains(&slot) {
                continue;
            }
            tracing::warn!(
                category_id = self.nodes[slot].id,
                "Category parent chain loops, treating it as a root"
            );
            self.roots.push(slot);
            stack.push(slot);
            self.mark_reachable(&mut stack, &mut seen);
        }
    }

    fn mark_reachable(&self, stack: &mut Vec<usize>, seen: &mut HashSet<usize>) {
        while let Some(slot) = stack.pop() {
            if !seen.insert(slot) {
                continue;
            }
            if let Some(kids) = self.children.get(&self.nodes[slot].id) {
                stack.extend(kids.iter().copied());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: i32) -> Option<&Category> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// All categories in insertion order.
    pub fn categories(&self) -> &[Category] {
        &self.nodes
    }

    /// Root categories in display order.
    pub fn roots(&self) -> impl Iterator<Item = &Category> {
        self.roots.iter().map(|&slot| &self.nodes[slot])
    }

    /// Direct children of `id` in display order.
    pub fn children(&self, id: i32) -> impl Iterator<Item = &Category> {
        self.children
            .get(&id)
            .map(|slots| slots.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&slot| &self.nodes[slot])
    }

    /// The parent the tree actually attaches `id` under. `None` for roots,
    /// including categories whose declared parent does not exist.
    pub fn parent_of(&self, id: i32) -> Option<i32> {
        let node = self.get(id)?;
        node.parent_id
            .filter(|&parent| parent != id && self.contains(parent))
    }

    /// Ancestor ids from the direct parent up to the root.
    pub fn ancestors(&self, id: i32) -> Vec<i32> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == id || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// True when `candidate` sits anywhere below `ancestor`.
    pub fn is_descendant(&self, ancestor: i32, candidate: i32) -> bool {
        if ancestor == candidate {
            return false;
        }
        let mut seen = HashSet::new();
        let mut stack: Vec<i32> = self.children(ancestor).map(|c| c.id).collect();
        while let Some(id) = stack.pop() {
            if id == candidate {
                return true;
            }
            if seen.insert(id) {
                stack.extend(self.children(id).map(|c| c.id));
            }
        }
        false
    }

    /// Keep only the categories that satisfy `keep` along with every
    /// ancestor, so a rejected category takes its whole subtree with it.
    pub fn prune(self, keep: impl Fn(&Category) -> bool) -> Self {
        let kept: Vec<Category> = self
            .nodes
            .iter()
            .filter(|&node| {
                keep(node)
                    && self
                        .ancestors(node.id)
                        .iter()
                        .filter_map(|&id| self.get(id))
                        .all(&keep)
            })
            .cloned()
            .collect();
        Self::build(kept)
    }

    /// Nested copy of the forest for serialization.
    pub fn to_nested(&self) -> Vec<CategoryNode> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.roots
            .iter()
            .filter_map(|&slot| self.nest(slot, &mut seen))
            .collect()
    }

    fn nest(&self, slot: usize, seen: &mut HashSet<usize>) -> Option<CategoryNode> {
        if !seen.insert(slot) {
            return None;
        }
        let category = self.nodes[slot].clone();
        let children = self
            .children
            .get(&category.id)
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|&child| self.nest(child, seen))
                    .collect()
            })
            .unwrap_or_default();
        Some(CategoryNode { category, children })
    }

    /// Categories in display pre-order, fields untouched.
    pub fn flatten(&self) -> Vec<Category> {
        flatten_nodes(&self.to_nested())
    }
}

/// Build the nested forest in one call.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    CategoryTree::build(categories).to_nested()
}

/// Pre-order walk of a nested forest back into a flat list.
pub fn flatten_nodes(nodes: &[CategoryNode]) -> Vec<Category> {
    let mut out = Vec::new();
    let mut stack: Vec<&CategoryNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node.category.clone());
        stack.extend(node.children.iter().rev());
    }
    out
}
