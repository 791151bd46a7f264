/// Example: build a demo scene and print its tree and bounding box
///
/// Usage: cargo run --example print_scene -- [solar|snowman|table]

use std::env;
use std::process;

use clap::ValueEnum;
use xscene_core::{build_scene, realize, MeshFactory, SceneConfig};
use xscene_terminal::demo::Demo;

fn main() {
    let name = env::args().nth(1).unwrap_or_else(|| "solar".to_string());
    let demo = match Demo::from_str(&name, true) {
        Ok(demo) => demo,
        Err(err) => {
            eprintln!("Unknown demo `{}`: {}", name, err);
            process::exit(2);
        }
    };

    let mut tree = match build_scene(&demo.document()) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("Failed to build scene: {}", err);
            process::exit(1);
        }
    };

    let realized = realize(&tree, &mut MeshFactory::default());
    let bounding_box = tree.update_bounding_box(&realized, &SceneConfig::default());

    print!("{}", tree);
    println!("{} primitives", realized.len());
    if let Some(b) = bounding_box {
        println!("bounding box center={:?} size={:?}", b.center, b.size);
    }
}
