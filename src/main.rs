use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use raytrace::consts::{ NUM_THREADS, OUT_FILE };
use raytrace::parallel::render_scene;
use raytrace::scene::Scene;

/// Renders a scene of spheres and planes to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// JSON scene description. Renders a built-in demo scene if omitted.
    scene: Option<PathBuf>,

    /// Where to write the rendered image.
    #[clap(short, long, default_value = OUT_FILE)]
    output: PathBuf,

    /// Number of render threads. 0 or 1 renders on the main thread.
    #[clap(short, long, default_value_t = NUM_THREADS)]
    threads: usize,

    /// Canvas width in pixels, overriding the scene.
    #[clap(long)]
    width: Option<usize>,

    /// Canvas height in pixels, overriding the scene.
    #[clap(long)]
    height: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Args::parse();

    let mut scene = match &args.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            info!("No scene given, rendering the demo scene");
            Scene::demo()
        },
    };

    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or_else(|| scene.camera.hsize());
        let height = args.height.unwrap_or_else(|| scene.camera.vsize());
        anyhow::ensure!(width > 0 && height > 0,
            "canvas must be at least 1x1, got {}x{}", width, height);

        scene.resize(width, height);
    }

    let canvas = render_scene(scene, args.threads).context("Render failed")?;

    canvas.save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Saved render to {}", args.output.display());

    Ok(())
}
