//! Edges between two vertices

use crate::model::{Category, Controller, Mesh, MeshKind};

impl Mesh {
    /// Edge from `v1` to `v2`, delivering through `v1`'s dispatcher
    #[must_use]
    pub fn edge(v1: &Controller, v2: &Controller) -> Self {
        Self::edge_of(MeshKind::Edge, v1, v2)
    }

    /// Straight edge from `v1` to `v2`, delivering through `v1`'s dispatcher
    #[must_use]
    pub fn linear_edge(v1: &Controller, v2: &Controller) -> Self {
        Self::edge_of(MeshKind::LinearEdge, v1, v2)
    }

    fn edge_of(kind: MeshKind, v1: &Controller, v2: &Controller) -> Self {
        let mesh = Self::with_dispatcher(kind, v1.model().updates().dispatcher().clone());
        mesh.add_to_category(v1, &Category::VERTICES);
        mesh.add_to_category(v2, &Category::VERTICES);
        mesh
    }

    /// Both vertices of an edge, in insertion order
    #[must_use]
    pub fn endpoints(&self) -> Option<(Controller, Controller)> {
        if !self.kind().is_edge() {
            return None;
        }
        match self.children(&Category::VERTICES).as_slice() {
            [a, b] => Some((a.clone(), b.clone())),
            _ => None,
        }
    }

    /// Distance between the vertices of a linear edge
    #[must_use]
    pub fn length(&self) -> Option<f64> {
        if self.kind() != MeshKind::LinearEdge {
            return None;
        }
        let (a, b) = self.endpoints()?;
        Some(a.model().position().distance(b.model().position()))
    }
}
