/// Example: Load an STL file and print its projected footprint
///
/// Usage: cargo run --example load_stl -- path/to/file.stl [width] [height]

use anyhow::{Context, Result};
use std::env;
use strata_core::{Camera, Mesh, MeshRenderer, RenderOptions, Vertex};
use strata_terminal::{load_stl, Framebuffer, TerminalPresenter};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mesh = match args.get(1) {
        Some(path) => load_stl(path).with_context(|| format!("failed to load {}", path))?,
        None => {
            eprintln!("Usage: {} <stl-file> [width] [height]", args[0]);
            eprintln!("\nNo STL file provided, using default cube...");
            Mesh::cube(2.0)
        }
    };
    let width: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(80);
    let height: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(40);

    println!("Loaded {} triangles", mesh.len());

    let mut camera = Camera::new(width as u32, height as u32);
    camera.position = Vertex::point(3.0, 4.0, 6.0);

    let renderer = MeshRenderer::new(
        camera.projection_matrix(),
        camera.view_matrix(),
        Vertex::direction(0.3, 0.5, 0.8).normalize(),
        width as f32,
        height as f32,
    )
    .with_options(RenderOptions {
        depth_sort: true,
        ..Default::default()
    });

    let mut framebuffer = Framebuffer::new(width, height);
    let drawn = renderer.render(&mut framebuffer, &mesh)?;

    let mut out = std::io::stdout();
    TerminalPresenter::new().present(&framebuffer, &mut out)?;
    println!("\nDrew {} triangles", drawn);
    Ok(())
}
