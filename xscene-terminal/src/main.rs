/// xscene Terminal Viewer
///
/// Builds one of the built-in scene documents into a scene tree, realizes its
/// primitives as meshes and shows them in the terminal.
/// Controls:
///   - WASD / Arrow Keys: Orbit the scene
///   - Space: Toggle spinning
///   - P: Toggle perspective / orthographic
///   - B: Toggle the bounding box readout
///   - Q/ESC: Quit

use clap::Parser;
use log::info;
use xscene_core::{MeshFactory, SceneBuilder};
use xscene_terminal::cli::Cli;
use xscene_terminal::{AppOptions, SceneView, TerminalApp};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.scene_config();
    let document = cli.demo.document();
    info!("building {:?} demo with {:?}", cli.demo, config);

    let tree = SceneBuilder::new(config).build(&document)?;
    let mut factory = MeshFactory::new(cli.sphere_segments, (cli.sphere_segments / 2).max(2));
    let view = SceneView::new(tree, &mut factory, &config);

    if cli.print {
        print!("{}", view.tree());
        println!("{}", view.bounds_summary());
        return Ok(());
    }

    let options = AppOptions {
        fps: cli.fps,
        spin: true,
    };
    let mut app = TerminalApp::new(view, options)?;
    app.run()?;

    Ok(())
}
