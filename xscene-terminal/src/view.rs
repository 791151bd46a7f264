/// Realized scene ready for rasterization
use log::info;
use nalgebra::{Point3, Vector3};
use xscene_core::{realize, Aabb, BoundingBox, Mesh, MeshFactory, SceneConfig, SceneTree};

/// A scene tree together with its world-space meshes and bounding box
pub struct SceneView {
    tree: SceneTree,
    meshes: Vec<Mesh>,
    root_position: Vector3<f32>,
}

impl SceneView {
    /// Realize every geometry request as a mesh and attach the aggregated
    /// bounding box to the tree's root
    pub fn new(mut tree: SceneTree, factory: &mut MeshFactory, config: &SceneConfig) -> Self {
        let realized = realize(&tree, factory);
        tree.update_bounding_box(&realized, config);

        let root_position = tree
            .root()
            .and_then(|root| tree.world_position(root))
            .unwrap_or_else(Vector3::zeros);
        let meshes: Vec<Mesh> = realized.handles().cloned().collect();
        info!(
            "scene view: {} nodes, {} meshes, {} triangles",
            tree.len(),
            meshes.len(),
            meshes.iter().map(|mesh| mesh.triangles.len()).sum::<usize>()
        );

        Self {
            tree,
            meshes,
            root_position,
        }
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.tree.bounding_box()
    }

    pub fn root_position(&self) -> Vector3<f32> {
        self.root_position
    }

    /// The bounding box in world space; a zero-size box on the origin for an
    /// empty tree
    pub fn world_bounds(&self) -> Aabb {
        self.bounding_box()
            .map(|bounding_box| bounding_box.to_world(&self.root_position))
            .unwrap_or_else(|| Aabb::point(Point3::origin()))
    }

    /// One-line description of the bounding box
    pub fn bounds_summary(&self) -> String {
        match self.bounding_box() {
            Some(b) => format!(
                "bounds center=({:.2}, {:.2}, {:.2}) size=({:.2}, {:.2}, {:.2})",
                b.center.x, b.center.y, b.center.z, b.size.x, b.size.y, b.size.z
            ),
            None => "bounds: empty scene".to_string(),
        }
    }
}
