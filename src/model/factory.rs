//! Kind-aware controller construction

use rustc_hash::FxHashMap;

use super::controller::Controller;
use super::mesh::Mesh;
use super::policy::MeshKind;
use super::view::View;

/// Builds the view a controller of some kind starts with
pub type ViewBuilder = Box<dyn Fn(&Mesh) -> View + Send + Sync>;

/// Wraps a bare mesh in the controller matching its kind
pub trait ControllerFactory: Send + Sync {
    /// Create a controller for `mesh`, or `None` if its kind is not handled
    fn create_controller(&self, mesh: Mesh) -> Option<Controller>;
}

/// Factory dispatching on [`MeshKind`]
pub struct KindControllerFactory {
    builders: FxHashMap<MeshKind, ViewBuilder>,
}

impl KindControllerFactory {
    /// Factory that recognizes no kind
    #[must_use]
    pub fn new() -> Self {
        Self {
            builders: FxHashMap::default(),
        }
    }

    /// Factory handling every geometric kind with a fresh default view on
    /// the mesh's dispatcher. Generic [`MeshKind::Basic`] meshes are left
    /// unrecognized.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        for kind in MeshKind::ALL {
            if kind != MeshKind::Basic {
                factory.register(kind, default_view);
            }
        }
        factory
    }

    /// Handle `kind` with views built by `builder`, replacing any earlier one
    pub fn register(
        &mut self,
        kind: MeshKind,
        builder: impl Fn(&Mesh) -> View + Send + Sync + 'static,
    ) {
        self.builders.insert(kind, Box::new(builder));
    }

    /// Whether `kind` is handled
    #[must_use]
    pub fn supports(&self, kind: MeshKind) -> bool {
        self.builders.contains_key(&kind)
    }
}

impl Default for KindControllerFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ControllerFactory for KindControllerFactory {
    fn create_controller(&self, mesh: Mesh) -> Option<Controller> {
        let Some(builder) = self.builders.get(&mesh.kind()) else {
            log::debug!("No controller registered for {:?}", mesh.kind());
            return None;
        };
        let view = builder(&mesh);
        Some(Controller::new(mesh, view))
    }
}

fn default_view(mesh: &Mesh) -> View {
    View::with_dispatcher(mesh.updates().dispatcher().clone())
}
