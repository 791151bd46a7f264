/// Scene tree construction from document nodes
use std::fmt;

use log::{debug, info};
use nalgebra::{Matrix4, Vector3};

use crate::bounds::{aggregate, BoundingBox, BoundsSource};
use crate::config::SceneConfig;
use crate::document::DocumentNode;
use crate::error::{Result, SceneError};
use crate::matrix::parse_matrix;
use crate::transform::Transform;

/// Handle to a node inside a [`SceneTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Primitive kinds a node can ask the geometry factory for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Sphere,
    Cube,
}

impl Primitive {
    /// Map a document geometry tag to a primitive. Tags are case sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Sphere" => Some(Self::Sphere),
            "Cube" => Some(Self::Cube),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Cube => "Cube",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positioned node in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    name: String,
    local: Transform,
    geometry: Option<Primitive>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent, or to the world for the root
    pub fn local(&self) -> &Transform {
        &self.local
    }

    /// `None` for group nodes
    pub fn geometry(&self) -> Option<Primitive> {
        self.geometry
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed scene tree.
///
/// The tree owns every node; parents hold their children's ids in document
/// order and each child records its parent's id. A child's id is always
/// greater than its parent's.
#[derive(Debug, Clone, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    bounding_box: Option<BoundingBox>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(NodeId(0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Like [`SceneTree::get`], failing with `SceneError::UnknownNode`
    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.get(id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(SceneNode::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(SceneNode::children).unwrap_or(&[])
    }

    /// Parents of `id`, nearest first, ending at the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Pre-order traversal from the root, children in document order
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.root().into_iter().collect(),
        }
    }

    /// First node named `name` in pre-order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter_depth_first().find(|&id| self.nodes[id.0].name == name)
    }

    /// Nodes that requested a primitive, in pre-order
    pub fn geometry_nodes(&self) -> impl Iterator<Item = (NodeId, Primitive)> + '_ {
        self.iter_depth_first()
            .filter_map(move |id| self.nodes[id.0].geometry.map(|kind| (id, kind)))
    }

    /// World matrix of every node, indexed by [`NodeId::index`]
    pub fn world_matrices(&self) -> Vec<Matrix4<f32>> {
        let mut world: Vec<Matrix4<f32>> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = node.local.to_matrix();
            let matrix = match node.parent {
                Some(parent) => world[parent.0] * local,
                None => local,
            };
            world.push(matrix);
        }
        world
    }

    /// Product of the local matrices from the root down to `id`
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let local = self.get(id)?.local.to_matrix();
        Some(
            self.ancestors(id)
                .fold(local, |acc, ancestor| self.nodes[ancestor.0].local.to_matrix() * acc),
        )
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.world_matrix(id)
            .map(|matrix| Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]))
    }

    /// Bounding box attached to the root by the last aggregation
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn attach_bounding_box(&mut self, bounding_box: BoundingBox) {
        self.bounding_box = Some(bounding_box);
    }

    /// Aggregate the bounds of all geometry and attach the result to the root,
    /// replacing any previous box
    pub fn update_bounding_box<S: BoundsSource + ?Sized>(
        &mut self,
        source: &S,
        config: &SceneConfig,
    ) -> Option<BoundingBox> {
        let bounding_box = aggregate(self, source, config)?;
        self.attach_bounding_box(bounding_box);
        Some(bounding_box)
    }
}

impl fmt::Display for SceneTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<(NodeId, usize)> =
            self.root().map(|root| (root, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
            let t = node.local.translation;
            let s = node.local.scale;
            write!(f, "{:indent$}{}", "", node.name, indent = depth * 2)?;
            if let Some(kind) = node.geometry {
                write!(f, " [{}]", kind)?;
            }
            writeln!(
                f,
                " t=({:.3}, {:.3}, {:.3}) s=({:.3}, {:.3}, {:.3})",
                t.x, t.y, t.z, s.x, s.y, s.z
            )?;
        }
        Ok(())
    }
}

/// Iterator returned by [`SceneTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a SceneTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Iterator returned by [`SceneTree::iter_depth_first`]
pub struct DepthFirst<'a> {
    tree: &'a SceneTree,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Builds scene trees from document trees
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Build a new tree rooted at `document`
    pub fn build(&self, document: &DocumentNode) -> Result<SceneTree> {
        let mut tree = SceneTree::new();
        self.build_into(&mut tree, document, None)?;
        Ok(tree)
    }

    /// Build `document` and its descendants into `tree`.
    ///
    /// With a parent, the new subtree becomes that node's last child and its
    /// transform is local to the parent. Without one, `tree` must be empty and
    /// the new node becomes its root. On error `tree` is left unchanged.
    pub fn build_into(
        &self,
        tree: &mut SceneTree,
        document: &DocumentNode,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        match parent {
            Some(parent) if tree.get(parent).is_none() => {
                return Err(SceneError::UnknownNode(parent))
            }
            None if !tree.is_empty() => return Err(SceneError::RootExists),
            _ => {}
        }

        let base = tree.nodes.len();
        let mut staged: Vec<SceneNode> = Vec::with_capacity(document.count());
        let mut pending: Vec<(&DocumentNode, Option<NodeId>)> = vec![(document, parent)];

        while let Some((source, parent)) = pending.pop() {
            let id = NodeId(base + staged.len());
            staged.push(self.convert(source, parent)?);

            // The subtree root's parent is outside the staging area; it is
            // linked on commit.
            if let Some(parent) = parent.filter(|parent| parent.0 >= base) {
                staged[parent.0 - base].children.push(id);
            }

            pending.extend(source.children.iter().rev().map(|child| (child, Some(id))));
        }

        let root = NodeId(base);
        if let Some(parent) = parent {
            tree.nodes[parent.0].children.push(root);
            if tree.bounding_box.take().is_some() {
                debug!("discarding stale bounding box after attaching `{}`", document.name);
            }
        }
        info!("built {} scene nodes under `{}`", staged.len(), document.name);
        tree.nodes.extend(staged);

        Ok(root)
    }

    fn convert(&self, source: &DocumentNode, parent: Option<NodeId>) -> Result<SceneNode> {
        let matrix = parse_matrix(&source.transformation).map_err(|err| SceneError::Format {
            node: source.name.clone(),
            text: source.transformation.clone(),
            source: err,
        })?;

        let local = Transform::decompose(&matrix, &self.config).map_err(|_| {
            SceneError::DegenerateRotation {
                node: source.name.clone(),
            }
        })?;

        let geometry = match source.geometry.as_deref() {
            None | Some("") => None,
            Some(tag) => Some(Primitive::from_tag(tag).ok_or_else(|| {
                SceneError::UnsupportedGeometry {
                    node: source.name.clone(),
                    tag: tag.to_string(),
                }
            })?),
        };

        if source.length.is_some() || source.radius.is_some() {
            debug!("node `{}`: Length/Radius are not applied", source.name);
        }
        debug!(
            "node `{}`: geometry={:?} translation={:?} scale={:?}",
            source.name, geometry, local.translation, local.scale
        );

        Ok(SceneNode {
            name: source.name.clone(),
            local,
            geometry,
            parent,
            children: Vec::new(),
        })
    }
}

/// Build a tree with the default configuration
pub fn build_scene(document: &DocumentNode) -> Result<SceneTree> {
    SceneBuilder::default().build(document)
}
