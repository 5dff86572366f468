//! Faces derived from their edges
//!
//! Adding an edge to a face's "Edges" category pulls the edge's vertices
//! into "Vertices"; the face counts how many of its edges reference each
//! vertex and drops a vertex once that count reaches zero.

use crate::model::{Controller, Mesh, MeshKind};

impl Mesh {
    /// Face accepting edges and direct vertices, on the global dispatcher
    #[must_use]
    pub fn face() -> Self {
        Self::new(MeshKind::Face)
    }

    /// Face whose vertices only ever come from its edges, on the global
    /// dispatcher
    #[must_use]
    pub fn detailed_face() -> Self {
        Self::new(MeshKind::DetailedFace)
    }

    /// Number of this face's edges that reference `vertex`
    #[must_use]
    pub fn vertex_references(&self, vertex: &Controller) -> usize {
        self.children.read().references(vertex.id())
    }

    /// Boundary vertices in order, found by walking edges end to end from
    /// the first edge. Stops early if the edges do not form a closed loop.
    #[must_use]
    pub fn vertex_loop(&self) -> Vec<Controller> {
        if !self.kind().is_face() {
            return Vec::new();
        }

        let mut edges: Vec<_> = self
            .children
            .read()
            .edge_endpoints()
            .into_iter()
            .filter(|pair| pair.len() == 2)
            .collect();
        if edges.is_empty() {
            return Vec::new();
        }

        let first = edges.remove(0);
        let start = first[0].clone();
        let mut current = first[1].clone();
        let mut ring = vec![start.clone()];
        while !current.same_entity(&start) {
            ring.push(current.clone());
            let Some(next) = edges
                .iter()
                .position(|pair| pair.iter().any(|v| v.same_entity(&current)))
            else {
                break;
            };
            let pair = edges.remove(next);
            current = if pair[0].same_entity(&current) {
                pair[1].clone()
            } else {
                pair[0].clone()
            };
        }
        ring
    }
}
