use std::ops::ControlFlow::Continue;

use sgl::prelude::*;
use sgl_front::{dims::VGA_640_480, minifb::Window};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut win = Window::builder()
        .title("softgl//triangle")
        .dims(VGA_640_480)
        .build()?;

    let mut ctx = win.context();
    let (w, h) = win.dims;

    ctx.matrix_mode(MatrixMode::Projection);
    ctx.frustum(-0.1, 0.1, -0.075, 0.075, 0.1, 100.0);
    ctx.matrix_mode(MatrixMode::Modelview);
    ctx.viewport(10, 10, w as i32 - 20, h as i32 - 20);
    ctx.clear_color(0.1, 0.1, 0.2, 1.0);
    ctx.enable(Capability::DepthTest);

    win.run(&mut ctx, |frame| {
        let secs = frame.t.as_secs_f32();
        let ctx = &mut *frame.ctx;

        ctx.clear(ClearMask::COLOR | ClearMask::DEPTH);
        ctx.load_identity();
        ctx.translate(0.0, 0.0, -3.0);
        ctx.rotate(secs * 60.0, 0.0, 1.0, 0.0);

        ctx.begin(PrimitiveKind::Triangles);
        ctx.color3f(1.0, 0.0, 0.0);
        ctx.vertex3(-1.0, -1.0, 0.0);
        ctx.color3f(0.0, 0.8, 0.0);
        ctx.vertex3(1.0, -1.0, 0.0);
        ctx.color3f(0.4, 0.4, 1.0);
        ctx.vertex3(0.0, 1.0, 0.0);
        ctx.end();

        if let Some(e) = ctx.get_error() {
            log::warn!("frame error: {e}");
        }
        Continue(())
    })?;
    Ok(())
}
