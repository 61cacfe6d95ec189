/// rast3d terminal demo
///
/// Renders the demo scene as tinted ASCII art, or to a PNG with `--snapshot`.
/// Controls:
///   - W/A/S/D, R/F: Move the camera
///   - Mouse / Arrow Keys: Look around
///   - I/J/K/L, U/O: Rotate the cube
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use log::info;
use rast3d_core::{stl, Color};
use rast3d_terminal::{AppConfig, DemoScene, TerminalApp};
use std::fs;

const MODEL_COLOR: Color = Color::rgb(200, 200, 200);

fn main() -> Result<()> {
    env_logger::init();
    let config = AppConfig::parse()?;

    let mut demo =
        DemoScene::new(config.width, config.height).context("failed to build the demo scene")?;

    if let Some(path) = &config.stl {
        let data = fs::read(path)
            .with_context(|| format!("failed to read STL file {}", path.display()))?;
        let mesh = stl::parse_stl(&data, MODEL_COLOR)
            .with_context(|| format!("failed to parse STL file {}", path.display()))?;
        info!(
            "loaded {} triangles from {}",
            mesh.triangle_count(),
            path.display()
        );
        demo = demo.with_model(mesh);
    }

    if let Some(path) = &config.snapshot {
        demo.update(config.time);
        let fragments = demo.draw().context("failed to render the snapshot")?;
        demo.renderer()
            .texture()
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {} ({fragments} fragments)", path.display());
        return Ok(());
    }

    let mut app = TerminalApp::new(demo)?;
    app.run()
}
