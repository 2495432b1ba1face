//! End-to-end rendering scenarios through the immediate-mode API.

use softgl_core::assert_approx_eq;
use softgl_core::prelude::*;
use softgl_core::{
    math::vec4,
    render::{Varyings, clip::ClipVert, project},
};

const BLACK: [u8; 4] = [0, 0, 0, 0xFF];
const WHITE: [u8; 4] = [0xFF; 4];
const RED: [u8; 4] = [0xFF, 0, 0, 0xFF];
const BLUE: [u8; 4] = [0, 0, 0xFF, 0xFF];

/// Returns a context whose vertex coordinates equal window coordinates.
fn ctx<'a>(w: u32, h: u32) -> Context<'a> {
    let mut ctx = Context::new(w, h, Config::default());
    ctx.matrix_mode(MatrixMode::Projection);
    ctx.ortho(0.0, w as f32, 0.0, h as f32, -1.0, 1.0);
    ctx.matrix_mode(MatrixMode::Modelview);
    ctx.clear(ClearMask::COLOR | ClearMask::DEPTH);
    ctx
}

/// Reads back the color buffer as RGBA bytes, bottom row first.
fn pixels(ctx: &mut Context) -> Vec<[u8; 4]> {
    let (w, h) = (ctx.framebuf().width(), ctx.framebuf().height());
    let mut buf = vec![0; 4 * (w * h) as usize];
    let (fmt, ty) = (PixelFormat::Rgba, PixelType::UnsignedByte);
    ctx.read_pixels(0, 0, w as i32, h as i32, fmt, ty, &mut buf);
    assert_eq!(ctx.get_error(), None);
    buf.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]).collect()
}

fn quad(ctx: &mut Context, [x0, y0, x1, y1]: [f32; 4], z: f32) {
    ctx.begin(PrimitiveKind::Quads);
    ctx.vertex3(x0, y0, z);
    ctx.vertex3(x1, y0, z);
    ctx.vertex3(x1, y1, z);
    ctx.vertex3(x0, y1, z);
    ctx.end();
}

/// A triangle covering the whole of an 8×8 framebuffer.
fn big_tri(ctx: &mut Context, z: f32) {
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex3(-1.0, -1.0, z);
    ctx.vertex3(20.0, -1.0, z);
    ctx.vertex3(-1.0, 20.0, z);
    ctx.end();
}

#[test]
fn clear_and_point() {
    let mut ctx = ctx(4, 4);
    ctx.begin(PrimitiveKind::Points);
    ctx.color3f(1.0, 1.0, 1.0);
    ctx.vertex2(2.0, 2.0);
    ctx.end();
    assert_eq!(ctx.get_error(), None);

    let px = pixels(&mut ctx);
    for (i, p) in px.iter().enumerate() {
        let expected = if i == 2 * 4 + 2 { WHITE } else { BLACK };
        assert_eq!(*p, expected, "pixel {i}");
    }
}

#[test]
fn degenerate_triangle_writes_nothing() {
    let mut ctx = ctx(4, 4);
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex2(0.0, 0.0);
    ctx.vertex2(1.0, 1.0);
    ctx.vertex2(3.0, 3.0);
    ctx.end();

    assert_eq!(ctx.get_error(), None);
    assert_eq!(ctx.stats().frags.o, 0);
    assert!(pixels(&mut ctx).iter().all(|p| *p == BLACK));
}

#[test]
fn nearer_triangle_wins_in_either_order() {
    let near = |ctx: &mut Context| {
        ctx.color3f(1.0, 0.0, 0.0);
        big_tri(ctx, 0.5);
    };
    let far = |ctx: &mut Context| {
        ctx.color3f(0.0, 0.0, 1.0);
        big_tri(ctx, -0.5);
    };
    for near_first in [true, false] {
        let mut ctx = ctx(8, 8);
        ctx.enable(Capability::DepthTest);
        if near_first {
            near(&mut ctx);
            far(&mut ctx);
        } else {
            far(&mut ctx);
            near(&mut ctx);
        }
        assert!(pixels(&mut ctx).iter().all(|p| *p == RED));
    }
}

#[test]
fn without_depth_test_last_wins() {
    let mut ctx = ctx(8, 8);
    ctx.color3f(1.0, 0.0, 0.0);
    big_tri(&mut ctx, 0.5);
    ctx.color3f(0.0, 0.0, 1.0);
    big_tri(&mut ctx, -0.5);
    assert!(pixels(&mut ctx).iter().all(|p| *p == BLUE));
    // Depth buffer untouched
    let fb = ctx.framebuf();
    assert!(fb.depth_buf().iter().all(|b| *b == 0xFF));
}

#[test]
fn blend_identities() {
    let mut ctx = ctx(4, 4);
    ctx.color3f(0.0, 0.0, 1.0);
    quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], 0.0);

    ctx.enable(Capability::Blend);
    ctx.blend_func(BlendFactor::One, BlendFactor::Zero);
    ctx.color4f(1.0, 0.0, 0.0, 1.0);
    quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], 0.0);
    assert!(pixels(&mut ctx).iter().all(|p| *p == RED));

    ctx.blend_func(BlendFactor::Zero, BlendFactor::One);
    ctx.color4f(0.0, 1.0, 0.0, 1.0);
    quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], 0.0);
    assert!(pixels(&mut ctx).iter().all(|p| *p == RED));
}

#[test]
fn alpha_blending() {
    let mut ctx = ctx(4, 4);
    ctx.color3f(0.0, 0.0, 1.0);
    quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], 0.0);

    ctx.enable(Capability::Blend);
    ctx.blend_func(0x0302u32, 0x0303u32);
    ctx.color4f(1.0, 0.0, 0.0, 0.5);
    quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], 0.0);
    assert_eq!(ctx.get_error(), None);
    assert!(pixels(&mut ctx).iter().all(|p| *p == [0x80, 0, 0x80, 0xBF]));
}

#[test]
fn identity_transform_maps_ndc_to_viewport() {
    let mut ctx = Context::new(8, 8, Config::default());
    ctx.clear(ClearMask::COLOR);
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex2(-1.0, -1.0);
    ctx.vertex2(1.0, -1.0);
    ctx.vertex2(-1.0, 1.0);
    ctx.end();

    // The triangle spans (0, 0), (8, 0), (0, 8) in window coordinates
    let px = pixels(&mut ctx);
    for y in 0..8 {
        for x in 0..8 {
            let p = px[y * 8 + x];
            if x + y <= 6 {
                assert_eq!(p, WHITE, "({x}, {y})");
            } else if x + y >= 8 {
                assert_eq!(p, BLACK, "({x}, {y})");
            }
        }
    }
}

#[test]
fn projection_offsets_by_viewport() {
    let v = ClipVert {
        pos: vec4(0.5, -0.25, 0.0, 1.0),
        attrib: Varyings::default(),
    };
    let (pos, _) = project(&v, &Rect::new(0, 0, 8, 8));
    assert_approx_eq!(pos.0, [6.0, 3.0, 0.5, 1.0]);

    let (pos, _) = project(&v, &Rect::new(10, 20, 8, 8));
    assert_approx_eq!(pos.0, [16.0, 23.0, 0.5, 1.0]);
}

#[test]
fn viewport_limits_drawing() {
    let mut ctx = ctx(8, 8);
    ctx.viewport(4, 4, 4, 4);
    ctx.color3f(1.0, 0.0, 0.0);
    // Maps to the whole viewport
    quad(&mut ctx, [0.0, 0.0, 8.0, 8.0], 0.0);

    let px = pixels(&mut ctx);
    for y in 0..8 {
        for x in 0..8 {
            let expected = if x >= 4 && y >= 4 { RED } else { BLACK };
            assert_eq!(px[y * 8 + x], expected, "({x}, {y})");
        }
    }
}

#[test]
fn scissor_limits_clear_and_drawing() {
    let mut ctx = ctx(4, 4);
    ctx.scissor(1, 1, 2, 2);
    ctx.enable(Capability::ScissorTest);
    ctx.clear_color(1.0, 1.0, 1.0, 1.0);
    ctx.clear(ClearMask::COLOR);

    let inside =
        |x: usize, y: usize| (1..3).contains(&x) && (1..3).contains(&y);
    let px = pixels(&mut ctx);
    for y in 0..4 {
        for x in 0..4 {
            let expected = if inside(x, y) { WHITE } else { BLACK };
            assert_eq!(px[y * 4 + x], expected, "({x}, {y})");
        }
    }

    ctx.color3f(1.0, 0.0, 0.0);
    // Tilted so that the general polygon path is taken
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex2(-4.0, -4.0);
    ctx.vertex2(12.0, -3.0);
    ctx.vertex2(-3.0, 12.0);
    ctx.end();

    let px = pixels(&mut ctx);
    for y in 0..4 {
        for x in 0..4 {
            let expected = if inside(x, y) { RED } else { BLACK };
            assert_eq!(px[y * 4 + x], expected, "({x}, {y})");
        }
    }
}

#[test]
fn scissor_at_extreme_coordinates_draws_nothing() {
    let mut ctx = ctx(4, 4);
    ctx.viewport(-1, 0, 4, 4);
    ctx.scissor(i32::MAX, 0, 1, 1);
    ctx.enable(Capability::ScissorTest);
    ctx.clear_color(1.0, 1.0, 1.0, 1.0);
    ctx.clear(ClearMask::COLOR);
    big_tri(&mut ctx, 0.0);
    assert_eq!(ctx.get_error(), None);
    assert!(pixels(&mut ctx).iter().all(|&p| p == BLACK));
}

#[test]
fn back_faces_are_culled() {
    let cw = |ctx: &mut Context| {
        ctx.begin(PrimitiveKind::Triangles);
        ctx.vertex2(0.0, 0.0);
        ctx.vertex2(0.0, 4.0);
        ctx.vertex2(4.0, 0.0);
        ctx.end();
    };
    let mut ctx = ctx(4, 4);
    ctx.enable(Capability::CullFace);
    cw(&mut ctx);
    assert!(pixels(&mut ctx).iter().all(|p| *p == BLACK));
    assert_eq!(ctx.stats().prims.i, 1);
    assert_eq!(ctx.stats().prims.o, 0);

    ctx.cull_face(Face::Front);
    cw(&mut ctx);
    assert!(pixels(&mut ctx).iter().any(|p| *p == WHITE));

    // Disabled culling draws both
    ctx.disable(Capability::CullFace);
    ctx.clear(ClearMask::COLOR);
    cw(&mut ctx);
    assert!(pixels(&mut ctx).iter().any(|p| *p == WHITE));
}

#[test]
fn point_polygon_mode_draws_vertices() {
    let mut ctx = ctx(4, 4);
    ctx.polygon_mode(PolygonMode::Point);
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex2(0.5, 0.5);
    ctx.vertex2(2.5, 0.5);
    ctx.vertex2(0.5, 2.5);
    ctx.end();

    let px = pixels(&mut ctx);
    let lit: Vec<_> = (0..16).filter(|&i| px[i] == WHITE).collect();
    assert_eq!(lit, [0, 2, 8]);
}

#[test]
fn horizontal_line() {
    let mut ctx = ctx(4, 4);
    ctx.begin(PrimitiveKind::Lines);
    ctx.vertex2(0.5, 1.5);
    ctx.vertex2(3.5, 1.5);
    ctx.end();

    let px = pixels(&mut ctx);
    assert_eq!(px[4 + 1], WHITE);
    assert_eq!(px[4 + 2], WHITE);
    for y in [0, 2, 3] {
        assert!(px[4 * y..4 * y + 4].iter().all(|p| *p == BLACK));
    }
}

#[test]
fn textured_quad_wraps() {
    #[rustfmt::skip]
    const DATA: [u8; 16] = [
        0xFF, 0, 0, 0xFF,   0, 0xFF, 0, 0xFF,
        0, 0, 0xFF, 0xFF,   0xFF, 0xFF, 0xFF, 0xFF,
    ];
    let draw = |u0: f32| {
        let mut ctx = ctx(4, 4);
        let mut id = [0];
        ctx.gen_textures(&mut id);
        ctx.bind_texture(id[0]);
        let (fmt, ty) = (PixelFormat::Rgba, PixelType::UnsignedByte);
        ctx.tex_image(2, 2, fmt, ty, &DATA, false);
        for p in [TexParam::MinFilter, TexParam::MagFilter] {
            ctx.tex_parameter(p, Filter::Nearest.to_raw());
        }
        ctx.enable(Capability::Texture2D);

        ctx.begin(PrimitiveKind::Quads);
        for (x, y) in [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)] {
            ctx.tex_coord(u0 + x / 4.0, u0 + y / 4.0);
            ctx.vertex2(x, y);
        }
        ctx.end();
        assert_eq!(ctx.get_error(), None);
        pixels(&mut ctx)
    };
    let base = draw(0.0);
    assert_eq!(base[0], RED);
    assert_eq!(base[3], [0, 0xFF, 0, 0xFF]);
    assert_eq!(base[12], BLUE);
    assert_eq!(base[15], WHITE);

    assert_eq!(draw(1.0), base);
    assert_eq!(draw(-2.0), base);
}

#[test]
fn unimaged_texture_samples_white() {
    let mut ctx = ctx(4, 4);
    let mut id = [0];
    ctx.gen_textures(&mut id);
    ctx.bind_texture(id[0]);
    ctx.enable(Capability::Texture2D);
    ctx.color3f(0.0, 0.0, 1.0);
    quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], 0.0);
    assert!(pixels(&mut ctx).iter().all(|p| *p == BLUE));
}

#[test]
fn arrays_match_immediate_mode() {
    let pos = [0.0, 0.0, 0.0, 6.0, 1.0, 0.0, 2.0, 7.0, 0.0];
    let uvs = [0.0; 6];
    let colors = [0xFF, 0, 0, 0xFF, 0, 0xFF, 0, 0xFF, 0, 0, 0xFF, 0xFF];

    let mut immediate = ctx(8, 8);
    immediate.begin(PrimitiveKind::Triangles);
    for i in 0..3 {
        let c = &colors[4 * i..4 * i + 4];
        immediate.color4ub(c[0], c[1], c[2], c[3]);
        immediate.vertex3(pos[3 * i], pos[3 * i + 1], pos[3 * i + 2]);
    }
    immediate.end();

    let mut arrays = ctx(8, 8);
    arrays.bind_array(Array::Position(&pos));
    arrays.bind_array(Array::TexCoord(&uvs));
    arrays.bind_array(Array::Color(&colors));
    arrays.draw_arrays(PrimitiveKind::Triangles, 0, 3);
    assert_eq!(arrays.get_error(), None);

    assert_eq!(pixels(&mut arrays), pixels(&mut immediate));
    assert_eq!(arrays.stats(), immediate.stats());
}

#[test]
fn stats_count_written_fragments() {
    let mut ctx = ctx(4, 4);
    quad(&mut ctx, [0.0, 0.0, 2.0, 4.0], 0.0);
    let stats = *ctx.stats();
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.prims.i, 1);
    assert_eq!(stats.prims.o, 1);
    assert_eq!(stats.verts.i, 4);
    assert_eq!(stats.frags.o, 8);

    ctx.reset_stats();
    assert_eq!(*ctx.stats(), Stats::default());
}

#[test]
fn geometry_behind_viewer_is_clipped() {
    let mut ctx = Context::new(8, 8, Config::default());
    ctx.matrix_mode(MatrixMode::Projection);
    ctx.frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
    ctx.matrix_mode(MatrixMode::Modelview);
    ctx.clear(ClearMask::COLOR);

    // Entirely behind the viewer
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex3(-1.0, -1.0, 2.0);
    ctx.vertex3(1.0, -1.0, 2.0);
    ctx.vertex3(0.0, 1.0, 2.0);
    ctx.end();
    assert_eq!(ctx.stats().prims.o, 0);
    assert_eq!(ctx.get_error(), None);

    // Crossing the near plane
    ctx.begin(PrimitiveKind::Triangles);
    ctx.vertex3(-1.0, -1.0, -2.0);
    ctx.vertex3(1.0, -1.0, -2.0);
    ctx.vertex3(0.0, 3.0, 0.0);
    ctx.end();
    assert_eq!(ctx.stats().prims.o, 1);
    assert!(pixels(&mut ctx).iter().any(|p| *p == WHITE));
}

fn tri(ctx: &mut Context, verts: [(f32, f32); 3], z: f32) {
    ctx.begin(PrimitiveKind::Triangles);
    for (x, y) in verts {
        ctx.vertex3(x, y, z);
    }
    ctx.end();
}

/// Triangles whose upper or lower half is exactly one row tall.
const THIN_HALVES: [([(f32, f32); 3], [usize; 4]); 2] = [
    ([(0.0, 0.0), (4.0, 0.0), (0.0, 1.0)], [0, 1, 0, 0]),
    ([(0.0, 0.0), (4.0, 1.0), (0.0, 2.0)], [0, 1, 4, 5]),
];

#[test]
fn small_triangles_are_filled_with_vertex_color() {
    for (verts, lit) in THIN_HALVES {
        let mut ctx = ctx(4, 4);
        ctx.color3f(1.0, 1.0, 0.0);
        tri(&mut ctx, verts, 0.0);
        assert_eq!(ctx.get_error(), None);

        let px = pixels(&mut ctx);
        for (i, p) in px.iter().enumerate() {
            let expected =
                if lit.contains(&i) { [0xFF, 0xFF, 0, 0xFF] } else { BLACK };
            assert_eq!(*p, expected, "{verts:?}, pixel {i}");
        }
    }
}

#[test]
fn small_triangles_respect_depth_order() {
    for (verts, lit) in THIN_HALVES {
        // Farther triangle over a nearer quad
        let mut near = ctx(4, 4);
        near.enable(Capability::DepthTest);
        near.color3f(1.0, 0.0, 0.0);
        quad(&mut near, [0.0, 0.0, 4.0, 4.0], 0.5);
        near.color3f(0.0, 0.0, 1.0);
        tri(&mut near, verts, -0.9);
        assert!(pixels(&mut near).iter().all(|p| *p == RED), "{verts:?}");

        // Nearer triangle over a farther quad
        let mut ctx = ctx(4, 4);
        ctx.enable(Capability::DepthTest);
        ctx.color3f(0.0, 0.0, 1.0);
        quad(&mut ctx, [0.0, 0.0, 4.0, 4.0], -0.9);
        ctx.color3f(1.0, 0.0, 0.0);
        tri(&mut ctx, verts, 0.5);

        let px = pixels(&mut ctx);
        for (i, p) in px.iter().enumerate() {
            let expected = if lit.contains(&i) { RED } else { BLUE };
            assert_eq!(*p, expected, "{verts:?}, pixel {i}");
        }
        // Depth of the covered pixels is that of the nearer triangle
        let depth = ctx.framebuf().depth_buf();
        let d = |i: usize| u16::from_ne_bytes([depth[2 * i], depth[2 * i + 1]]);
        for i in lit {
            assert!(d(i) < 0x8000, "{verts:?}, pixel {i}: {:#x}", d(i));
        }
    }
}
