/// Built-in scene documents for the viewer
use clap::ValueEnum;
use xscene_core::DocumentNode;

const IDENTITY: &str = "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1";

/// Scenes the viewer can show without an external document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// A sun with an orbiting planet and moon
    Solar,
    /// Three stacked spheres wearing a cube hat
    Snowman,
    /// A table top on four legs, with a vase
    Table,
}

impl Demo {
    pub fn document(self) -> DocumentNode {
        match self {
            Demo::Solar => solar(),
            Demo::Snowman => snowman(),
            Demo::Table => table(),
        }
    }
}

/// Row-major text for a uniform scale `s` at (x, y, z), written the way
/// exporters emit it: bare leading and trailing decimal points included
fn placed(s: &str, x: &str, y: &str, z: &str) -> String {
    format!("{s} 0 0 {x} 0 {s} 0 {y} 0 0 {s} {z} 0 0 0 1")
}

fn solar() -> DocumentNode {
    // 30 degrees about Y
    let tilted = "0.866 0 0.5 3. 0 1 0 0 -0.5 0 0.866 0 0 0 0 1";

    DocumentNode::new("system", IDENTITY)
        .with_child(DocumentNode::new("sun", placed("2.", "0", "0", "0")).with_geometry("Sphere"))
        .with_child(
            DocumentNode::new("orbit", tilted)
                .with_child(DocumentNode::new("planet", placed(".8", "0", "0", "0")).with_geometry("Sphere"))
                .with_child(
                    DocumentNode::new("moon", placed(".3", "0", ".6", "1."))
                        .with_geometry("Sphere")
                        .with_radius(".15"),
                ),
        )
}

fn snowman() -> DocumentNode {
    DocumentNode::new("snowman", IDENTITY).with_children(vec![
        DocumentNode::new("base", placed("1.5", "0", ".75", "0")).with_geometry("Sphere"),
        DocumentNode::new("body", placed("1.", "0", "1.9", "0")).with_geometry("Sphere"),
        DocumentNode::new("head", placed(".7", "0", "2.7", "0"))
            .with_geometry("Sphere")
            .with_child(DocumentNode::new("hat", "1 0 0 0 0 .6 0 .55 0 0 1 0 0 0 0 1").with_geometry("Cube")),
    ])
}

fn table() -> DocumentNode {
    let leg = |name: &str, x: &str, z: &str| {
        DocumentNode::new(name, format!(".1 0 0 {x} 0 1. 0 -.5 0 0 .1 {z} 0 0 0 1"))
            .with_geometry("Cube")
            .with_length("1")
    };

    DocumentNode::new("table", placed("1", "0", "1", "0"))
        .with_child(DocumentNode::new("top", "2 0 0 0 0 .1 0 0 0 0 1.2 0 0 0 0 1").with_geometry("Cube"))
        .with_child(DocumentNode::new("legs", IDENTITY).with_children(vec![
            leg("leg_a", ".9", ".5"),
            leg("leg_b", "-.9", ".5"),
            leg("leg_c", ".9", "-.5"),
            leg("leg_d", "-.9", "-.5"),
        ]))
        .with_child(DocumentNode::new("vase", placed(".4", "0", ".25", "0")).with_geometry("Sphere"))
}
