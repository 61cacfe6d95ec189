/// Example: Load an STL file and show it next to the demo scene
///
/// Usage: cargo run --example load_stl -- path/to/file.stl
use anyhow::{anyhow, Context, Result};
use rast3d_core::{stl, Color};
use rast3d_terminal::{DemoScene, TerminalApp};
use std::env;
use std::fs;

fn main() -> Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("Usage: load_stl <stl-file>"))?;

    let data = fs::read(&path).with_context(|| format!("failed to read STL file {path}"))?;
    let mesh = stl::parse_stl(&data, Color::rgb(200, 200, 200))
        .with_context(|| format!("failed to parse STL file {path}"))?;

    println!("Loaded {} triangles", mesh.triangle_count());
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let demo = DemoScene::new(160, 200)?.with_model(mesh);
    let mut app = TerminalApp::new(demo)?;
    app.run()
}
