//! Triangle Rasterizer
//!
//! The central pipeline: vertex shading, primitive assembly, scan
//! conversion, attribute interpolation, depth testing, and fragment shading,
//! executed synchronously per draw call into a floating-point render target.
//!
//! Coverage uses an edge-inclusive barycentric test refined by a top-left
//! fill rule: a pixel center exactly on an edge belongs to the triangle for
//! which that edge is a top or left edge, so adjacent triangles sharing an
//! edge cover every pixel between them exactly once — no gaps, no double
//! writes.
//!
//! Perspective-correct interpolation divides each barycentric weight by the
//! vertex's clip-space w before use; for orthographic draws (w = 1) this
//! reduces to plain affine weights, so vertex outputs are reproduced exactly
//! at the vertices.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::math3d::{Vec2, Vec4};
use crate::primitive::Primitive;
use crate::shader::Varyings;

/// Triangles with |signed area| below this produce no fragments
const AREA_EPSILON: f32 = 1e-6;

/// Vertices with clip-space w at or below this sit behind the eye; the
/// triangle is skipped whole (near-plane clipping is out of scope)
const W_EPSILON: f32 = 1e-6;

/// NDC-to-pixel mapping, supplied by the caller as part of the render-target
/// configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport covering a full target of the given size
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Floating-point working buffer for one frame: a 4-component linear color
/// accumulation buffer and an optional depth buffer, always the same pixel
/// count.
pub struct RenderTarget {
    width: u32,
    height: u32,
    viewport: Viewport,
    color: Vec<[f32; 4]>,
    depth: Option<Vec<f32>>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32, with_depth: bool) -> Self {
        let pixel_count = (width * height) as usize;
        Self {
            width,
            height,
            viewport: Viewport::full(width, height),
            color: vec![[0.0; 4]; pixel_count],
            depth: with_depth.then(|| vec![f32::INFINITY; pixel_count]),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    /// The color buffer, row-major
    #[inline]
    pub fn color(&self) -> &[[f32; 4]] {
        &self.color
    }

    /// Color at (x, y); caller guarantees in-range coordinates
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> [f32; 4] {
        self.color[(y * self.width + x) as usize]
    }

    /// Depth at (x, y), or None when no depth buffer is attached
    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        self.depth
            .as_ref()
            .map(|d| d[(y * self.width + x) as usize])
    }

    /// Reset the color buffer to `clear_color` and the depth buffer (when
    /// present) to "far"
    pub fn clear(&mut self, clear_color: [f32; 4]) {
        self.color.fill(clear_color);
        if let Some(ref mut d) = self.depth {
            d.fill(f32::INFINITY);
        }
    }
}

/// Per-draw counters, logged at debug level
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles in the index buffer
    pub triangles: usize,
    /// Triangles dropped for zero or near-zero signed area
    pub degenerate: usize,
    /// Triangles skipped because a vertex sits behind the eye
    pub behind_eye: usize,
    /// Fragments that passed coverage and depth and were shaded
    pub fragments: usize,
}

/// One vertex after the vertex stage, cached by vertex index
#[derive(Clone, Copy)]
struct ShadedVertex {
    clip: Vec4,
    output: Varyings,
}

/// Screen-space corner of a triangle ready for scan conversion
#[derive(Clone, Copy)]
struct ScreenVertex {
    pos: Vec2,
    depth: f32,
    inv_w: f32,
    output: Varyings,
}

/// Signed double-area of (a, b, p); positive when p is left of a->b in
/// y-down screen coordinates
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left classification for the fill rule, for triangles wound so the
/// interior has positive edge functions: top edges run rightward along a
/// horizontal, left edges run upward (decreasing y).
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    (a.y == b.y && b.x > a.x) || (b.y < a.y)
}

/// The pipeline executor. Stateless; all per-draw inputs arrive as
/// arguments, so one rasterizer can serve any number of targets.
#[derive(Debug, Default)]
pub struct Rasterizer;

impl Rasterizer {
    pub const fn new() -> Self {
        Self
    }

    /// Execute the full pipeline for one primitive: vertex shading (cached
    /// by vertex index), triple assembly, scan conversion, interpolation,
    /// depth test, fragment shading. Runs to completion before returning.
    pub fn draw(&self, primitive: &Primitive, target: &mut RenderTarget) -> DrawStats {
        debug_assert!(primitive.validate().is_ok(), "malformed primitive");

        let textures = primitive.texture_table();
        let uniforms = primitive.uniforms();
        let vertex_shader = primitive.vertex_shader();
        let fragment_shader = primitive.fragment_shader();
        let viewport = target.viewport();

        let mut stats = DrawStats {
            triangles: primitive.indices().len(),
            ..DrawStats::default()
        };

        // Vertex stage: shade each referenced vertex once. Deduplication is
        // by index, not position — distinct attribute bundles may share a
        // position.
        let mut cache: Vec<Option<ShadedVertex>> = vec![None; primitive.vertices().len()];
        let mut shaded = |cache: &mut Vec<Option<ShadedVertex>>, idx: usize| -> ShadedVertex {
            if let Some(v) = cache[idx] {
                return v;
            }
            let input = primitive.vertex_input(idx);
            let (clip, output) =
                vertex_shader.shade(primitive.vertices()[idx], uniforms, &input);
            let v = ShadedVertex { clip, output };
            cache[idx] = Some(v);
            v
        };

        // Pixel bounds: viewport clamped to the physical target
        let clip_x0 = viewport.x.max(0);
        let clip_y0 = viewport.y.max(0);
        let clip_x1 = (viewport.x + viewport.width as i32).min(target.width as i32);
        let clip_y1 = (viewport.y + viewport.height as i32).min(target.height as i32);

        // Primitive assembly: consecutive index triples, one triangle each
        for tri in primitive.indices() {
            let corners = [
                shaded(&mut cache, tri[0]),
                shaded(&mut cache, tri[1]),
                shaded(&mut cache, tri[2]),
            ];

            if corners.iter().any(|v| v.clip.w <= W_EPSILON) {
                stats.behind_eye += 1;
                continue;
            }

            // Perspective divide and viewport mapping (y flipped: NDC +y is
            // up, screen +y is down)
            let mut screen = corners.map(|v| {
                let ndc = v.clip.perspective_divide();
                ScreenVertex {
                    pos: Vec2::new(
                        viewport.x as f32 + (ndc.x + 1.0) * 0.5 * viewport.width as f32,
                        viewport.y as f32 + (1.0 - ndc.y) * 0.5 * viewport.height as f32,
                    ),
                    depth: ndc.z,
                    inv_w: 1.0 / v.clip.w,
                    output: v.output,
                }
            });

            // Triangle setup
            let mut area = edge(screen[0].pos, screen[1].pos, screen[2].pos);
            if area.abs() < AREA_EPSILON {
                stats.degenerate += 1;
                continue;
            }
            if area < 0.0 {
                // Normalize winding so every edge function is positive inside
                screen.swap(1, 2);
                area = -area;
            }
            let [v0, v1, v2] = screen;

            let accept_zero = [
                is_top_left(v1.pos, v2.pos),
                is_top_left(v2.pos, v0.pos),
                is_top_left(v0.pos, v1.pos),
            ];

            // Bounding box over pixel indices, clamped to the target
            let min_x = v0.pos.x.min(v1.pos.x).min(v2.pos.x).floor() as i32;
            let max_x = v0.pos.x.max(v1.pos.x).max(v2.pos.x).ceil() as i32;
            let min_y = v0.pos.y.min(v1.pos.y).min(v2.pos.y).floor() as i32;
            let max_y = v0.pos.y.max(v1.pos.y).max(v2.pos.y).ceil() as i32;
            let min_x = min_x.max(clip_x0);
            let min_y = min_y.max(clip_y0);
            let max_x = max_x.min(clip_x1 - 1);
            let max_y = max_y.min(clip_y1 - 1);

            let inv_area = 1.0 / area;

            for py in min_y..=max_y {
                for px in min_x..=max_x {
                    let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                    let w0 = edge(v1.pos, v2.pos, p);
                    let w1 = edge(v2.pos, v0.pos, p);
                    let w2 = edge(v0.pos, v1.pos, p);

                    let covered = (w0 > 0.0 || (w0 == 0.0 && accept_zero[0]))
                        && (w1 > 0.0 || (w1 == 0.0 && accept_zero[1]))
                        && (w2 > 0.0 || (w2 == 0.0 && accept_zero[2]));
                    if !covered {
                        continue;
                    }

                    // Affine barycentric weights; screen-space linear, used
                    // directly for depth
                    let b0 = w0 * inv_area;
                    let b1 = w1 * inv_area;
                    let b2 = w2 * inv_area;
                    let depth = b0 * v0.depth + b1 * v1.depth + b2 * v2.depth;

                    let pixel = (py as u32 * target.width + px as u32) as usize;

                    // Depth test before shading: closer wins, ties keep the
                    // incumbent. Triangles are rasterized sequentially, so
                    // each pixel has exactly one writer at a time.
                    if let Some(ref mut depth_buf) = target.depth {
                        if depth < depth_buf[pixel] {
                            depth_buf[pixel] = depth;
                        } else {
                            continue;
                        }
                    }

                    // Perspective-correct weights for attribute interpolation
                    let q0 = b0 * v0.inv_w;
                    let q1 = b1 * v1.inv_w;
                    let q2 = b2 * v2.inv_w;
                    let inv_sum = 1.0 / (q0 + q1 + q2);
                    let interpolated = Varyings::weighted_sum(
                        &v0.output,
                        &v1.output,
                        &v2.output,
                        q0 * inv_sum,
                        q1 * inv_sum,
                        q2 * inv_sum,
                    );

                    let mut color = [0.0f32; 4];
                    fragment_shader.shade(
                        &mut color,
                        vertex_shader,
                        uniforms,
                        &interpolated,
                        &textures,
                    );
                    target.color[pixel] = color;
                    stats.fragments += 1;
                }
            }
        }

        debug!(
            "draw primitive {}: {} triangles, {} degenerate, {} behind eye, {} fragments",
            primitive.id(),
            stats.triangles,
            stats.degenerate,
            stats.behind_eye,
            stats.fragments
        );
        stats
    }
}
