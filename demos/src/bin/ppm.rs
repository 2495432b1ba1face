//! Renders a scene without a window and saves it as `triangles.ppm`.

use std::{fs::File, io::Write};

use sgl::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let (w, h) = (320, 240);
    let mut ctx = Context::new(w, h, Config::default());

    ctx.matrix_mode(MatrixMode::Projection);
    ctx.ortho(-4.0, 4.0, -3.0, 3.0, -10.0, 10.0);
    ctx.matrix_mode(MatrixMode::Modelview);
    ctx.clear_color(0.0, 0.0, 0.0, 1.0);
    ctx.clear(ClearMask::COLOR | ClearMask::DEPTH);
    ctx.enable(Capability::DepthTest);

    // Two overlapping triangles; the depth test keeps the nearer one
    // on top regardless of drawing order.
    let tris = [
        ([1.0, 0.2, 0.2], -2.0, 0.5),
        ([0.2, 1.0, 0.2], 0.0, -0.5),
    ];
    ctx.begin(PrimitiveKind::Triangles);
    for ([r, g, b], x, z) in tris {
        ctx.color3f(r, g, b);
        ctx.vertex3(x - 2.0, -2.0, z);
        ctx.vertex3(x + 2.0, -2.0, z);
        ctx.vertex3(x, 2.0, z);
    }
    ctx.end();

    // A blended quad over both
    ctx.enable(Capability::Blend);
    ctx.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    ctx.disable(Capability::DepthTest);
    ctx.begin(PrimitiveKind::Quads);
    ctx.color4f(0.3, 0.3, 1.0, 0.5);
    for (x, y) in [(-3.0, -1.0), (3.0, -1.0), (3.0, 0.0), (-3.0, 0.0)] {
        ctx.vertex2(x, y);
    }
    ctx.end();

    // A wireframe triangle
    ctx.polygon_mode(PolygonMode::Line);
    ctx.line_width(2.0);
    ctx.begin(PrimitiveKind::Triangles);
    ctx.color3f(1.0, 1.0, 1.0);
    ctx.vertex2(1.0, 1.0);
    ctx.vertex2(3.5, 1.0);
    ctx.vertex2(2.25, 2.8);
    ctx.end();

    let mut rgb = vec![0; 3 * (w * h) as usize];
    ctx.read_pixels(
        0,
        0,
        w as i32,
        h as i32,
        PixelFormat::Rgb,
        PixelType::UnsignedByte,
        &mut rgb,
    );
    if let Some(e) = ctx.get_error() {
        return Err(e.into());
    }
    log::info!("\n{}", ctx.stats());

    let mut out = File::create("triangles.ppm")?;
    writeln!(out, "P6 {w} {h} 255")?;
    // PPM rows are top-down
    for row in rgb.chunks_exact(3 * w as usize).rev() {
        out.write_all(row)?;
    }
    Ok(())
}
