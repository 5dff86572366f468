//! Categories and the per-kind structural rules
//!
//! Each [`MeshKind`] carries the rules its child collection follows: which
//! categories have a capacity, which categories hold back-references, and
//! where an uncategorized child goes. Back-reference categories break the
//! cycles the graph would otherwise contain (edge and vertex, edge and face,
//! shape and parent): the owner does not subscribe to their members, they
//! are ignored by structural equality, and cloning does not follow them.

use std::borrow::Cow;
use std::fmt;

/// Name of a bucket in a child collection
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(Cow<'static, str>);

impl Category {
    /// Where children go when no category is given
    pub const DEFAULT: Self = Self(Cow::Borrowed("Default"));
    /// Vertices of an edge or face
    pub const VERTICES: Self = Self(Cow::Borrowed("Vertices"));
    /// Edges of a face, or edges a vertex belongs to
    pub const EDGES: Self = Self(Cow::Borrowed("Edges"));
    /// Faces an edge belongs to
    pub const FACES: Self = Self(Cow::Borrowed("Faces"));
    /// The single parent of a shape
    pub const PARENT: Self = Self(Cow::Borrowed("Parent"));
    /// Sub-shapes of a shape
    pub const CHILDREN: Self = Self(Cow::Borrowed("Children"));

    /// Create a category with a custom name
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Get the category name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometric kind of a mesh, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Generic entity with unrestricted categories
    Basic,
    /// Free-standing point with a location
    Point,
    /// Mesh vertex with a location
    Vertex,
    /// Edge between at most two vertices
    Edge,
    /// Straight edge whose length follows from its vertices
    LinearEdge,
    /// Face deriving vertices from its edges; vertices may also be added directly
    Face,
    /// Face whose vertices come only from its edges
    DetailedFace,
    /// Part of an assembly with at most one parent
    Shape,
    /// Cylindrical shape with dimension properties
    Tube,
}

impl MeshKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 9] = [
        Self::Basic,
        Self::Point,
        Self::Vertex,
        Self::Edge,
        Self::LinearEdge,
        Self::Face,
        Self::DetailedFace,
        Self::Shape,
        Self::Tube,
    ];

    /// Whether the kind has a location
    #[must_use]
    pub const fn is_located(self) -> bool {
        matches!(self, Self::Point | Self::Vertex)
    }

    /// Edge-shaped kinds
    #[must_use]
    pub const fn is_edge(self) -> bool {
        matches!(self, Self::Edge | Self::LinearEdge)
    }

    /// Face kinds, which derive their vertices from their edges
    #[must_use]
    pub const fn is_face(self) -> bool {
        matches!(self, Self::Face | Self::DetailedFace)
    }

    /// Shape kinds, which have a single parent
    #[must_use]
    pub const fn is_shape(self) -> bool {
        matches!(self, Self::Shape | Self::Tube)
    }

    /// Whether `category` holds back-references for this kind
    #[must_use]
    pub fn is_back_reference(self, category: &Category) -> bool {
        match self {
            Self::Vertex => *category == Category::EDGES,
            Self::Edge | Self::LinearEdge => *category == Category::FACES,
            Self::Shape | Self::Tube => *category == Category::PARENT,
            _ => false,
        }
    }

    /// Whether the owner subscribes to children placed in `category`
    #[must_use]
    pub fn propagates(self, category: &Category) -> bool {
        !self.is_back_reference(category)
    }

    /// Maximum number of children `category` may hold
    #[must_use]
    pub fn capacity(self, category: &Category) -> Option<usize> {
        if self.is_edge() && *category == Category::VERTICES {
            Some(2)
        } else if self.is_shape() && *category == Category::PARENT {
            Some(1)
        } else {
            None
        }
    }

    /// Whether vertices may be added to "Vertices" directly rather than only
    /// through edge derivation
    #[must_use]
    pub const fn accepts_direct_vertices(self) -> bool {
        !matches!(self, Self::DetailedFace)
    }

    /// Category an uncategorized child of kind `child` is placed in
    #[must_use]
    pub fn default_category(self, child: Self) -> Category {
        match self {
            Self::Vertex if child.is_edge() => Category::EDGES,
            Self::Edge | Self::LinearEdge if child == Self::Vertex => Category::VERTICES,
            Self::Edge | Self::LinearEdge if child.is_face() => Category::FACES,
            Self::Face | Self::DetailedFace if child.is_edge() => Category::EDGES,
            Self::Face | Self::DetailedFace if child == Self::Vertex => Category::VERTICES,
            Self::Shape | Self::Tube => Category::CHILDREN,
            _ => Category::DEFAULT,
        }
    }
}
