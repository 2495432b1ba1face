use softgl_core::prelude::*;

fn main() {
    let (w, h) = (40, 20);
    let mut ctx = Context::new(w, h, Config::default());

    ctx.matrix_mode(MatrixMode::Projection);
    ctx.ortho(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
    ctx.matrix_mode(MatrixMode::Modelview);
    ctx.clear(ClearMask::COLOR);

    ctx.begin(PrimitiveKind::Triangles);
    ctx.color3f(1.0, 0.0, 0.0);
    ctx.vertex2(-0.9, -0.9);
    ctx.color3f(0.0, 1.0, 0.0);
    ctx.vertex2(0.9, -0.9);
    ctx.color3f(0.0, 0.0, 1.0);
    ctx.vertex2(0.0, 0.9);
    ctx.end();

    let mut px = vec![0u8; 3 * (w * h) as usize];
    let (fmt, ty) = (PixelFormat::Rgb, PixelType::UnsignedByte);
    ctx.read_pixels(0, 0, w as i32, h as i32, fmt, ty, &mut px);

    // Print the dominant channel of each pixel, top row first
    for row in px.chunks_exact(3 * w as usize).rev() {
        let line: String = row
            .chunks_exact(3)
            .map(|c| match c {
                [0, 0, 0] => '.',
                [r, g, b] if r >= g && r >= b => 'R',
                [_, g, b] if g >= b => 'G',
                _ => 'B',
            })
            .collect();
        println!("{line}");
    }
    println!("{}", ctx.stats());
}
