/// Command line options of the terminal demo
use anyhow::{anyhow, Context, Result};
use rast3d_core::RendererConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const USAGE: &str = "Usage: rast3d-terminal [--width <px>] [--height <px>] [--stl <file>] \
                     [--snapshot <file.png>] [--time <seconds>]";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Size of the rendered image; the terminal view samples it down to its cell grid
    pub width: u32,
    pub height: u32,
    /// Extra model drawn next to the demo scene
    pub stl: Option<PathBuf>,
    /// Render a single frame to this PNG instead of opening the interactive view
    pub snapshot: Option<PathBuf>,
    /// Scene time of the snapshot frame, in seconds
    pub time: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let renderer = RendererConfig::default();
        Self {
            width: renderer.width,
            height: renderer.height,
            stl: None,
            snapshot: None,
            time: 0.0,
        }
    }
}

impl AppConfig {
    pub fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" => config.width = parse_value(&arg, args.next())?,
                "--height" => config.height = parse_value(&arg, args.next())?,
                "--time" => config.time = parse_value(&arg, args.next())?,
                "--stl" => config.stl = Some(value(&arg, args.next())?.into()),
                "--snapshot" => config.snapshot = Some(value(&arg, args.next())?.into()),
                "-h" | "--help" => return Err(anyhow!(USAGE)),
                other => return Err(anyhow!("Unknown argument: {other}\n{USAGE}")),
            }
        }

        if config.width == 0 || config.height == 0 {
            return Err(anyhow!(
                "image size must be positive, got {}x{}",
                config.width,
                config.height
            ));
        }

        Ok(config)
    }
}

fn value(flag: &str, next: Option<String>) -> Result<String> {
    next.ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_value<T>(flag: &str, next: Option<String>) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value(flag, next)?;
    raw.parse()
        .with_context(|| format!("invalid value {raw:?} for {flag}"))
}
