/// Primitive meshes and realization of geometry requests
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use log::debug;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::bounds::{Aabb, BoundsSource};
use crate::scene::{NodeId, Primitive, SceneTree};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, zero for degenerate faces
    pub fn face_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices.map(|v| v.position);
        (v1 - v0)
            .cross(&(v2 - v0))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Axis-aligned cube with edge length `size`, centred on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        for axis in 0..3 {
            for sign in [1.0f32, -1.0] {
                let mut normal = Vector3::zeros();
                normal[axis] = sign;
                // u x v == normal keeps the faces wound outward
                let mut u = Vector3::zeros();
                u[(axis + 1) % 3] = sign;
                let mut v = Vector3::zeros();
                v[(axis + 2) % 3] = 1.0;

                let center = Point3::from(normal * half);
                let corner = |a: f32, b: f32| {
                    Vertex::new(center + u * (a * half) + v * (b * half), normal)
                };
                let quad = [
                    corner(-1.0, -1.0),
                    corner(1.0, -1.0),
                    corner(1.0, 1.0),
                    corner(-1.0, 1.0),
                ];
                mesh.add_triangle(Triangle::new(quad[0], quad[1], quad[2]));
                mesh.add_triangle(Triangle::new(quad[0], quad[2], quad[3]));
            }
        }

        mesh
    }

    /// Latitude/longitude sphere centred on the origin
    pub fn uv_sphere(radius: f32, segments: usize, rings: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let point = |ring: usize, segment: usize| {
            let polar = PI * ring as f32 / rings as f32;
            let azimuth = TAU * segment as f32 / segments as f32;
            let normal = Vector3::new(
                polar.sin() * azimuth.cos(),
                polar.cos(),
                polar.sin() * azimuth.sin(),
            );
            Vertex::new(Point3::from(normal * radius), normal)
        };

        let mut mesh = Self::with_capacity(2 * segments * (rings - 1));
        for ring in 0..rings {
            for segment in 0..segments {
                let top_left = point(ring, segment);
                let top_right = point(ring, segment + 1);
                let bottom_left = point(ring + 1, segment);
                let bottom_right = point(ring + 1, segment + 1);

                if ring > 0 {
                    mesh.add_triangle(Triangle::new(top_left, top_right, bottom_left));
                }
                if ring + 1 < rings {
                    mesh.add_triangle(Triangle::new(top_right, bottom_right, bottom_left));
                }
            }
        }

        mesh
    }

    pub fn extend(&mut self, other: &Mesh) {
        self.triangles.extend_from_slice(&other.triangles);
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.triangles.iter().flat_map(|triangle| triangle.vertices.iter())
    }

    /// Copy of this mesh with `matrix` applied to positions and normals
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Mesh {
        let linear: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);

        let apply = |vertex: &Vertex| {
            Vertex::new(
                matrix.transform_point(&vertex.position),
                (normal_matrix * vertex.normal)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::zeros),
            )
        };

        Mesh {
            triangles: self
                .triangles
                .iter()
                .map(|triangle| Triangle {
                    vertices: [
                        apply(&triangle.vertices[0]),
                        apply(&triangle.vertices[1]),
                        apply(&triangle.vertices[2]),
                    ],
                })
                .collect(),
        }
    }

    /// Bounds of all vertex positions, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices().map(|vertex| vertex.position))
    }
}

/// A realized primitive and its world-space bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<H> {
    pub handle: H,
    pub bounds: Aabb,
}

/// Turns geometry requests into renderable objects
pub trait GeometryFactory {
    type Handle;

    /// Called once per geometry node with the node's world matrix
    fn instantiate(&mut self, id: NodeId, kind: Primitive, world: &Matrix4<f32>)
        -> Instance<Self::Handle>;
}

/// Every instance produced for one scene tree, in pre-order
#[derive(Debug, Clone)]
pub struct Realized<H> {
    instances: Vec<(NodeId, Instance<H>)>,
    index: HashMap<NodeId, usize>,
}

impl<H> Realized<H> {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Instance<H>> {
        self.index.get(&id).map(|&slot| &self.instances[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Instance<H>)> {
        self.instances.iter().map(|(id, instance)| (*id, instance))
    }

    pub fn handles(&self) -> impl Iterator<Item = &H> {
        self.instances.iter().map(|(_, instance)| &instance.handle)
    }
}

impl<H> BoundsSource for Realized<H> {
    fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.get(id).map(|instance| instance.bounds)
    }
}

/// Ask `factory` for one instance per geometry node of `tree`
pub fn realize<F: GeometryFactory + ?Sized>(tree: &SceneTree, factory: &mut F) -> Realized<F::Handle> {
    let world = tree.world_matrices();
    let mut instances = Vec::new();
    let mut index = HashMap::new();

    for (id, kind) in tree.geometry_nodes() {
        let instance = factory.instantiate(id, kind, &world[id.index()]);
        index.insert(id, instances.len());
        instances.push((id, instance));
    }

    debug!("realized {} primitives", instances.len());
    Realized { instances, index }
}

/// Builds world-space triangle meshes: a unit cube and a sphere of
/// diameter one, both centred on the node origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshFactory {
    pub sphere_segments: usize,
    pub sphere_rings: usize,
}

impl MeshFactory {
    pub fn new(sphere_segments: usize, sphere_rings: usize) -> Self {
        Self {
            sphere_segments,
            sphere_rings,
        }
    }

    pub fn local_mesh(&self, kind: Primitive) -> Mesh {
        match kind {
            Primitive::Cube => Mesh::cube(1.0),
            Primitive::Sphere => Mesh::uv_sphere(0.5, self.sphere_segments, self.sphere_rings),
        }
    }
}

impl Default for MeshFactory {
    fn default() -> Self {
        Self::new(24, 12)
    }
}

impl GeometryFactory for MeshFactory {
    type Handle = Mesh;

    fn instantiate(&mut self, id: NodeId, kind: Primitive, world: &Matrix4<f32>) -> Instance<Mesh> {
        let local_bounds = Aabb::from_center_size(Point3::origin(), Vector3::new(1.0, 1.0, 1.0));
        let bounds = local_bounds.transformed(world);
        debug!("{:?}: {} bounds {:?}", id, kind, bounds);
        Instance {
            handle: self.local_mesh(kind).transformed(world),
            bounds,
        }
    }
}
