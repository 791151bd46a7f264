/// Axis-aligned bounds and aggregation over a scene tree
use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::SceneConfig;
use crate::scene::{NodeId, SceneTree};

/// World-space axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Box with full extents `size` around `center`
    pub fn from_center_size(center: Point3<f32>, size: Vector3<f32>) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Zero-size box at `point`
    pub fn point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Smallest box containing every point, `None` if there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = Self::point(points.next()?);
        Some(points.fold(first, |mut aabb, point| {
            aabb.encapsulate_point(&point);
            aabb
        }))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Full extents along each axis
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.coords.inf(&other.min.coords).into(),
            max: self.max.coords.sup(&other.max.coords).into(),
        }
    }

    pub fn encapsulate(&mut self, other: &Aabb) {
        *self = self.union(other);
    }

    pub fn encapsulate_point(&mut self, point: &Point3<f32>) {
        self.min = self.min.coords.inf(&point.coords).into();
        self.max = self.max.coords.sup(&point.coords).into();
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box around this box's corners after `matrix` is applied
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Aabb {
        let corners = self.corners().map(|corner| matrix.transform_point(&corner));
        Self::from_points(corners).unwrap_or(*self)
    }
}

/// Volume enclosing all geometry under a root, relative to the root's world
/// position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub center: Vector3<f32>,
    pub size: Vector3<f32>,
}

impl BoundingBox {
    /// World-space box, given the root's world position
    pub fn to_world(&self, root_position: &Vector3<f32>) -> Aabb {
        Aabb::from_center_size(Point3::from(root_position + self.center), self.size)
    }
}

/// Supplies the world-space bounds of realized geometry
pub trait BoundsSource {
    fn world_bounds(&self, id: NodeId) -> Option<Aabb>;
}

impl BoundsSource for HashMap<NodeId, Aabb> {
    fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.get(&id).copied()
    }
}

/// Union of the bounds of every geometry node in `tree`, recentred on the
/// root's world position.
///
/// With no geometry the result is a zero-size box on the root. Returns `None`
/// only for an empty tree.
pub fn aggregate<S: BoundsSource + ?Sized>(
    tree: &SceneTree,
    source: &S,
    config: &SceneConfig,
) -> Option<BoundingBox> {
    let root = tree.root()?;
    let origin = Point3::from(tree.world_position(root)?);

    let seed = config.enclose_root_origin.then(|| Aabb::point(origin));
    let union = tree
        .geometry_nodes()
        .filter_map(|(id, kind)| {
            let bounds = source.world_bounds(id);
            if bounds.is_none() {
                warn!("no bounds for {} node {:?}; skipping", kind, id);
            }
            bounds
        })
        .fold(seed, |union, bounds| match union {
            Some(union) => Some(union.union(&bounds)),
            None => Some(bounds),
        })
        .unwrap_or_else(|| Aabb::point(origin));

    let bounding_box = BoundingBox {
        center: union.center() - origin,
        size: union.size(),
    };
    debug!("aggregated bounds {:?}", bounding_box);
    Some(bounding_box)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentNode;
    use crate::scene::build_scene;

    fn translated(x: f32, y: f32, z: f32) -> String {
        format!("1 0 0 {x} 0 1 0 {y} 0 0 1 {z} 0 0 0 1")
    }

    fn cube(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::from_center_size(Point3::new(x, y, z), Vector3::new(2.0, 2.0, 2.0))
    }

    fn two_cube_tree(root: (f32, f32, f32)) -> SceneTree {
        let document = DocumentNode::new("root", translated(root.0, root.1, root.2))
            .with_child(DocumentNode::new("a", translated(0.0, 0.0, 0.0)).with_geometry("Cube"))
            .with_child(DocumentNode::new("b", translated(5.0, 0.0, 0.0)).with_geometry("Cube"));
        build_scene(&document).unwrap()
    }

    fn bounds_for(tree: &SceneTree) -> HashMap<NodeId, Aabb> {
        let mut bounds = HashMap::new();
        bounds.insert(tree.find("a").unwrap(), cube(0.0, 0.0, 0.0));
        bounds.insert(tree.find("b").unwrap(), cube(5.0, 0.0, 0.0));
        bounds
    }

    #[test]
    fn test_aabb_union() {
        let union = cube(0.0, 0.0, 0.0).union(&cube(5.0, 0.0, 0.0));
        assert_eq!(union.center(), Point3::new(2.5, 0.0, 0.0));
        assert_eq!(union.size(), Vector3::new(7.0, 2.0, 2.0));
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(vec![
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(-2.0, 3.0, 0.5),
            Point3::new(0.0, 0.0, -4.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Point3::new(-2.0, -1.0, -4.0));
        assert_eq!(aabb.max, Point3::new(1.0, 3.0, 0.5));
        assert!(Aabb::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_aabb_transformed() {
        let unit = Aabb::from_center_size(Point3::origin(), Vector3::new(1.0, 1.0, 1.0));
        let matrix = Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0))
            * Matrix4::new_rotation(Vector3::new(0.0, 0.0, std::f32::consts::FRAC_PI_4));
        let moved = unit.transformed(&matrix);
        let half_diagonal = 0.5 * 2.0f32.sqrt();
        assert!((moved.center() - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((moved.size().x - 2.0 * half_diagonal).abs() < 1e-5);
        assert!((moved.size().z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_two_cubes() {
        let tree = two_cube_tree((0.0, 0.0, 0.0));
        let bounding_box = aggregate(&tree, &bounds_for(&tree), &SceneConfig::default()).unwrap();
        assert_eq!(bounding_box.center, Vector3::new(2.5, 0.0, 0.0));
        assert_eq!(bounding_box.size, Vector3::new(7.0, 2.0, 2.0));
    }

    #[test]
    fn test_aggregate_recentres_on_root() {
        let tree = two_cube_tree((1.0, 2.0, 0.0));
        let bounding_box = aggregate(&tree, &bounds_for(&tree), &SceneConfig::default()).unwrap();
        assert_eq!(bounding_box.center, Vector3::new(1.5, -2.0, 0.0));
        assert_eq!(bounding_box.size, Vector3::new(7.0, 2.0, 2.0));

        let world = bounding_box.to_world(&Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(world.center(), Point3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut tree = two_cube_tree((0.5, 0.25, -3.0));
        let bounds = bounds_for(&tree);
        let config = SceneConfig::default();
        let first = tree.update_bounding_box(&bounds, &config).unwrap();
        let second = tree.update_bounding_box(&bounds, &config).unwrap();
        assert_eq!(first.center.map(f32::to_bits), second.center.map(f32::to_bits));
        assert_eq!(first.size.map(f32::to_bits), second.size.map(f32::to_bits));
        assert_eq!(tree.bounding_box(), Some(&second));
    }

    #[test]
    fn test_aggregate_without_geometry() {
        let document = DocumentNode::new("root", translated(3.0, 4.0, 5.0))
            .with_child(DocumentNode::new("group", translated(1.0, 1.0, 1.0)));
        let tree = build_scene(&document).unwrap();
        let bounding_box = aggregate(&tree, &HashMap::new(), &SceneConfig::default()).unwrap();
        assert_eq!(bounding_box.center, Vector3::zeros());
        assert_eq!(bounding_box.size, Vector3::zeros());
    }

    #[test]
    fn test_aggregate_skips_missing_bounds() {
        let tree = two_cube_tree((0.0, 0.0, 0.0));
        let mut bounds = HashMap::new();
        bounds.insert(tree.find("b").unwrap(), cube(5.0, 0.0, 0.0));
        let bounding_box = aggregate(&tree, &bounds, &SceneConfig::default()).unwrap();
        assert_eq!(bounding_box.center, Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(bounding_box.size, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_aggregate_enclosing_root_origin() {
        let tree = two_cube_tree((0.0, 0.0, 0.0));
        let mut bounds = HashMap::new();
        bounds.insert(tree.find("b").unwrap(), cube(5.0, 0.0, 0.0));
        let config = SceneConfig::default().with_enclose_root_origin(true);
        let bounding_box = aggregate(&tree, &bounds, &config).unwrap();
        assert_eq!(bounding_box.center, Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(bounding_box.size, Vector3::new(6.0, 2.0, 2.0));
    }

    #[test]
    fn test_aggregate_empty_tree() {
        let tree = SceneTree::new();
        assert!(aggregate(&tree, &HashMap::new(), &SceneConfig::default()).is_none());
    }
}
