use std::ops::ControlFlow::Continue;

use sgl::prelude::*;
use sgl_front::minifb::Window;

/// Returns an 8×8 RGBA checkerboard.
fn checker() -> Vec<u8> {
    (0..64)
        .flat_map(|i| {
            let xor = ((i % 8) ^ (i / 8)) & 1 == 1;
            if xor {
                [0xFF, 0x80, 0x80, 0xFF]
            } else {
                [0x20, 0x80, 0xFF, 0xFF]
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let image = checker();
    let mut win = Window::builder().title("softgl//square").build()?;
    let mut ctx = win.context();
    let (w, h) = win.dims;

    let mut tex = [0];
    ctx.gen_textures(&mut tex);
    ctx.bind_texture(tex[0]);
    let (fmt, ty) = (PixelFormat::Rgba, PixelType::UnsignedByte);
    ctx.tex_image(8, 8, fmt, ty, &image, false);
    ctx.tex_parameter(TexParam::MagFilter, Filter::Nearest.to_raw());
    ctx.tex_parameter(TexParam::WrapS, Wrap::MirroredRepeat.to_raw());
    ctx.enable(Capability::Texture2D);

    ctx.matrix_mode(MatrixMode::Projection);
    let aspect = w as f32 / h as f32;
    ctx.frustum(-0.1 * aspect, 0.1 * aspect, -0.1, 0.1, 0.1, 100.0);
    ctx.matrix_mode(MatrixMode::Modelview);

    if let Some(e) = ctx.get_error() {
        return Err(e.into());
    }

    win.run(&mut ctx, |frame| {
        let secs = frame.t.as_secs_f32();
        let ctx = &mut *frame.ctx;

        ctx.clear(ClearMask::COLOR);
        ctx.load_identity();
        ctx.translate(0.0, 0.0, -3.0 - secs.sin());
        ctx.rotate(secs * 45.0, 0.0, 1.0, 0.0);

        ctx.begin(PrimitiveKind::Quads);
        for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            ctx.tex_coord((x + 1.0) * 2.0, (y + 1.0) * 2.0);
            ctx.vertex2(x, y);
        }
        ctx.end();
        Continue(())
    })?;
    Ok(())
}
