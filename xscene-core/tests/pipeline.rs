use nalgebra::{Point3, Vector3};
use xscene_core::{
    build_scene, realize, DocumentNode, MeshFactory, Primitive, SceneBuilder, SceneConfig,
    SceneError, ScaleMode,
};

fn table() -> DocumentNode {
    let leg = |name: &str, x: &str, z: &str| {
        DocumentNode::new(name, format!("0.1 0 0 {x} 0 1. 0 -.5 0 0 .1 {z} 0 0 0 1")).with_geometry("Cube")
    };

    DocumentNode::new("table", "1 0 0 0 0 1 0 2 0 0 1 0 0 0 0 1")
        .with_child(DocumentNode::new("top", "2 0 0 0 0 0.1 0 0 0 0 1 0 0 0 0 1").with_geometry("Cube"))
        .with_child(
            DocumentNode::new("legs", "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1").with_children(vec![
                leg("leg_a", ".9", ".4"),
                leg("leg_b", "-.9", ".4"),
                leg("leg_c", ".9", "-.4"),
                leg("leg_d", "-.9", "-.4"),
            ]),
        )
        .with_child(
            DocumentNode::new("vase", "1 0 0 0 0 1 0 .3 0 0 1 0 0 0 0 1")
                .with_geometry("Sphere")
                .with_radius("0.25"),
        )
}

#[test]
fn test_build_realize_aggregate() {
    let mut tree = build_scene(&table()).unwrap();
    assert_eq!(tree.len(), 8);
    assert_eq!(tree.geometry_nodes().count(), 6);

    let realized = realize(&tree, &mut MeshFactory::default());
    assert_eq!(realized.len(), 6);

    let bounding_box = tree
        .update_bounding_box(&realized, &SceneConfig::default())
        .unwrap();

    // x: legs reach 0.95, the top reaches 1.0; y: legs bottom out at 1.0, the vase tops at 2.8
    let root_position = tree.world_position(tree.root().unwrap()).unwrap();
    assert!((root_position - Vector3::new(0.0, 2.0, 0.0)).norm() < 1e-6);
    let world = bounding_box.to_world(&root_position);
    assert!((world.min - Point3::new(-1.0, 1.0, -0.5)).norm() < 1e-5);
    assert!((world.max - Point3::new(1.0, 2.8, 0.5)).norm() < 1e-5);
    assert!((bounding_box.center - Vector3::new(0.0, -0.1, 0.0)).norm() < 1e-5);

    assert_eq!(tree.bounding_box(), Some(&bounding_box));
}

#[test]
fn test_geometry_order_matches_document() {
    let tree = build_scene(&table()).unwrap();
    let kinds: Vec<Primitive> = tree.geometry_nodes().map(|(_, kind)| kind).collect();
    assert_eq!(
        kinds,
        [
            Primitive::Cube,
            Primitive::Cube,
            Primitive::Cube,
            Primitive::Cube,
            Primitive::Cube,
            Primitive::Sphere,
        ]
    );
}

#[test]
fn test_malformed_leaf_aborts_whole_build() {
    let document = table().with_child(DocumentNode::new("lamp", "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0"));
    match build_scene(&document) {
        Err(SceneError::Format { node, .. }) => assert_eq!(node, "lamp"),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn test_scale_modes_agree_on_affine_data() {
    let projective = build_scene(&table()).unwrap();
    let affine = SceneBuilder::new(SceneConfig::default().with_scale_mode(ScaleMode::Affine))
        .build(&table())
        .unwrap();

    for id in projective.iter_depth_first() {
        let a = projective.get(id).unwrap().local().scale;
        let b = affine.get(id).unwrap().local().scale;
        assert!((a - b).norm() < 1e-6);
    }
}
