//! Categorized child collection
//!
//! Maps category names to ordered sequences of child controllers and applies
//! the owning kind's admission and removal rules. The collection itself never
//! publishes or subscribes; it reports what changed and leaves notification to
//! the owning mesh.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::controller::{CloneMap, Controller};
use super::policy::{Category, MeshKind};
use crate::core::EntityId;

/// Children held in one category
pub(crate) type Children = SmallVec<[Controller; 4]>;

/// Children paired with the category they entered or left
pub(crate) type Changes = SmallVec<[(Controller, Category); 4]>;

#[derive(Debug, Clone, Default)]
pub(crate) struct ChildCollection {
    categories: FxHashMap<Category, Children>,
    /// Faces: number of admitted edges referencing each vertex
    references: FxHashMap<EntityId, usize>,
    /// Faces: vertices each admitted edge had when it was added
    endpoints: FxHashMap<EntityId, SmallVec<[Controller; 2]>>,
}

impl ChildCollection {
    /// Children of a category; empty for unknown categories
    pub(crate) fn get(&self, category: &Category) -> Vec<Controller> {
        self.categories
            .get(category)
            .map(|children| children.to_vec())
            .unwrap_or_default()
    }

    /// Every child in every category
    pub(crate) fn all(&self) -> Vec<Controller> {
        self.categories.values().flatten().cloned().collect()
    }

    /// Names of categories currently holding children
    pub(crate) fn names(&self) -> Vec<Category> {
        let mut names: Vec<_> = self
            .categories
            .iter()
            .filter(|(_, children)| !children.is_empty())
            .map(|(category, _)| category.clone())
            .collect();
        names.sort();
        names
    }

    /// Whether `child` is present in any category
    pub(crate) fn contains(&self, child: &Controller) -> bool {
        self.categories
            .values()
            .any(|children| children.iter().any(|c| c.same_entity(child)))
    }

    /// Whether `child` is still held in a category the owner listens to
    pub(crate) fn held_in_propagating(&self, kind: MeshKind, child: &Controller) -> bool {
        self.categories.iter().any(|(category, children)| {
            kind.propagates(category) && children.iter().any(|c| c.same_entity(child))
        })
    }

    /// Number of admitted edges referencing `vertex`
    pub(crate) fn references(&self, vertex: EntityId) -> usize {
        self.references.get(&vertex).copied().unwrap_or(0)
    }

    /// Vertex pairs of the admitted edges, in edge order
    pub(crate) fn edge_endpoints(&self) -> Vec<SmallVec<[Controller; 2]>> {
        self.categories
            .get(&Category::EDGES)
            .into_iter()
            .flatten()
            .filter_map(|edge| self.endpoints.get(&edge.id()).cloned())
            .collect()
    }

    /// Structural content compared by equality: non-empty, non-back-reference
    /// categories ordered by name.
    pub(crate) fn structure(&self, kind: MeshKind) -> Vec<(Category, Children)> {
        let mut structure: Vec<_> = self
            .categories
            .iter()
            .filter(|(category, children)| {
                !children.is_empty() && !kind.is_back_reference(category)
            })
            .map(|(category, children)| (category.clone(), children.clone()))
            .collect();
        structure.sort_by(|a, b| a.0.cmp(&b.0));
        structure
    }

    /// Apply the admission rules for adding `child` to `category`.
    ///
    /// `endpoints` are the child's vertices when a face admits an edge.
    /// Returns every child that entered the collection (the child itself
    /// first, then derived vertices), or `None` if the admission was rejected.
    pub(crate) fn admit(
        &mut self,
        kind: MeshKind,
        child: &Controller,
        category: &Category,
        endpoints: &[Controller],
    ) -> Option<Changes> {
        let held = self.categories.get(category).map_or(0, |c| c.len());
        if kind.capacity(category).is_some_and(|capacity| held >= capacity) {
            log::debug!("{category} of {kind:?} is full; rejecting {}", child.id());
            return None;
        }

        let mut changes = Changes::new();
        if kind.is_face() {
            let present = self
                .categories
                .get(category)
                .is_some_and(|children| children.iter().any(|c| c.same_entity(child)));
            if *category == Category::EDGES {
                if present {
                    return None;
                }
                self.push(category, child, &mut changes);
                self.endpoints
                    .insert(child.id(), endpoints.iter().cloned().collect());
                for vertex in endpoints {
                    *self.references.entry(vertex.id()).or_insert(0) += 1;
                    let derived = self
                        .categories
                        .get(&Category::VERTICES)
                        .is_some_and(|v| v.iter().any(|c| c.same_entity(vertex)));
                    if !derived {
                        self.push(&Category::VERTICES, vertex, &mut changes);
                    }
                }
                return Some(changes);
            }
            if *category == Category::VERTICES && (present || !kind.accepts_direct_vertices()) {
                log::debug!("{kind:?} does not accept {} as a direct vertex", child.id());
                return None;
            }
        }

        self.push(category, child, &mut changes);
        Some(changes)
    }

    fn push(&mut self, category: &Category, child: &Controller, changes: &mut Changes) {
        self.categories
            .entry(category.clone())
            .or_default()
            .push(child.clone());
        changes.push((child.clone(), category.clone()));
    }

    /// Apply the removal rules for `child` across all categories.
    ///
    /// Returns every child that left (including vertices a face dropped
    /// because no edge references them any more). Empty if nothing changed.
    pub(crate) fn withdraw(&mut self, kind: MeshKind, child: &Controller) -> Changes {
        let mut changes = Changes::new();
        let referenced = kind.is_face() && self.references(child.id()) > 0;

        for (category, children) in &mut self.categories {
            if referenced && *category == Category::VERTICES {
                log::debug!("{} is still referenced by an edge; keeping it", child.id());
                continue;
            }
            let before = children.len();
            children.retain(|c| !c.same_entity(child));
            if children.len() != before {
                changes.push((child.clone(), category.clone()));
            }
        }

        let removed_edge = changes
            .iter()
            .any(|(_, category)| *category == Category::EDGES);
        if kind.is_face() && removed_edge {
            let endpoints = self.endpoints.remove(&child.id()).unwrap_or_default();
            for vertex in endpoints {
                let Some(count) = self.references.get_mut(&vertex.id()) else {
                    continue;
                };
                *count -= 1;
                if *count == 0 {
                    self.references.remove(&vertex.id());
                    if let Some(vertices) = self.categories.get_mut(&Category::VERTICES) {
                        let before = vertices.len();
                        vertices.retain(|c| !c.same_entity(&vertex));
                        if vertices.len() != before {
                            changes.push((vertex, Category::VERTICES));
                        }
                    }
                }
            }
        }

        changes
    }

    /// Replace the contents of `category`, returning what it held before
    pub(crate) fn replace(&mut self, category: &Category, child: Option<Controller>) -> Children {
        let previous = self.categories.remove(category).unwrap_or_default();
        if let Some(child) = child {
            self.categories
                .insert(category.clone(), std::iter::once(child).collect());
        }
        previous
    }

    /// Swap the structural categories for those of `other`, keeping this
    /// collection's back-references. Returns the children that were dropped.
    pub(crate) fn replace_structure(&mut self, kind: MeshKind, other: Self) -> Changes {
        let mut dropped = Changes::new();
        self.categories.retain(|category, children| {
            if kind.is_back_reference(category) {
                return true;
            }
            dropped.extend(children.drain(..).map(|c| (c, category.clone())));
            false
        });
        for (category, children) in other.categories {
            if kind.is_back_reference(&category) {
                continue;
            }
            self.categories.insert(category, children);
        }
        self.references = other.references;
        self.endpoints = other.endpoints;
        dropped
    }

    /// Rebuild `source` by admitting its structural children one by one under
    /// `kind`'s rules. Edges go first so a face derives its vertices from
    /// them; each category keeps the order it had in `source`.
    pub(crate) fn admitted(kind: MeshKind, source: Self) -> Self {
        let mut out = Self::default();
        let mut entries = source.structure(kind);
        entries.sort_by_key(|(category, _)| *category != Category::EDGES);

        for (category, children) in &entries {
            for child in children {
                let endpoints: SmallVec<[Controller; 2]> =
                    if kind.is_face() && *category == Category::EDGES {
                        source.endpoints.get(&child.id()).cloned().unwrap_or_else(|| {
                            child.model().children(&Category::VERTICES).into_iter().collect()
                        })
                    } else {
                        SmallVec::new()
                    };
                let held = out
                    .categories
                    .get(category)
                    .is_some_and(|c| c.iter().any(|c| c.same_entity(child)));
                if out.admit(kind, child, category, &endpoints).is_none() && !held {
                    log::debug!("{category} of {kind:?} does not admit {}; dropped", child.id());
                }
            }
        }

        for (category, children) in &mut out.categories {
            if let Some(order) = source.categories.get(category) {
                children.sort_by_key(|c| {
                    order
                        .iter()
                        .position(|o| o.same_entity(c))
                        .unwrap_or(usize::MAX)
                });
            }
        }
        out
    }

    /// Deep-clone the structural categories of a collection owned by a mesh
    /// of kind `kind`. Children shared between categories stay shared.
    pub(crate) fn remap(&self, kind: MeshKind, clones: &mut CloneMap) -> Self {
        let mut out = Self::default();

        // Edges first so vertices reached through them are cloned once
        let mut categories: Vec<_> = self
            .categories
            .iter()
            .filter(|(category, _)| !kind.is_back_reference(category))
            .collect();
        categories.sort_by_key(|(category, _)| **category != Category::EDGES);

        for (category, children) in categories {
            let mapped = children.iter().map(|c| c.deep_clone_with(clones)).collect();
            out.categories.insert(category.clone(), mapped);
        }
        for (edge, endpoints) in &self.endpoints {
            if let Some(edge) = clones.get(*edge).map(Controller::id) {
                let mapped = endpoints.iter().map(|v| v.deep_clone_with(clones)).collect();
                out.endpoints.insert(edge, mapped);
            }
        }
        for (vertex, count) in &self.references {
            if let Some(vertex) = clones.get(*vertex).map(Controller::id) {
                out.references.insert(vertex, *count);
            }
        }

        out
    }

    /// Every (child, category) pair the owner of kind `kind` listens to
    pub(crate) fn propagating(&self, kind: MeshKind) -> Changes {
        self.categories
            .iter()
            .filter(|(category, _)| kind.propagates(category))
            .flat_map(|(category, children)| {
                children.iter().map(move |c| (c.clone(), category.clone()))
            })
            .collect()
    }
}
