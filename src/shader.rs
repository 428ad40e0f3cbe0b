//! Shader Abstraction
//!
//! Two polymorphic roles with one operation each: a vertex shader maps an
//! object-space position plus its attribute bundle to a clip-space position
//! and an output bundle, and a fragment shader maps the interpolated bundle
//! to a color. Shaders are stateless — all per-draw state arrives as
//! arguments — so one instance can be shared across primitives and invoked
//! in any order (or concurrently) within a stage.
//!
//! The uniform buffer is an opaque blob (`dyn Any`); only the bound shader
//! pair knows its concrete type and downcasts it.

use std::any::Any;
use std::sync::Arc;

use crate::math3d::{Mat4, Vec2, Vec3, Vec4};
use crate::texture::TextureTable;

/// Maximum number of attribute slots carried through the pipeline
pub const MAX_VARYINGS: usize = 8;

/// Conventional attribute slot for UV coordinates (built-in shaders)
pub const SLOT_UV: usize = 0;
/// Conventional attribute slot for normals (built-in shaders)
pub const SLOT_NORMAL: usize = 1;

/// Per-draw, shader-opaque data shared by every vertex and fragment of one
/// primitive
pub type UniformBuffer = Arc<dyn Any + Send + Sync>;

/// A fixed-capacity bundle of per-vertex attributes. 2- and 3-component
/// attributes widen to Vec4 (zero-padded) so the rasterizer can interpolate
/// every slot uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Varyings {
    slots: [Vec4; MAX_VARYINGS],
    len: usize,
}

impl Varyings {
    pub const fn new() -> Self {
        Self {
            slots: [Vec4::zero(); MAX_VARYINGS],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a slot. Panics when the bundle is full (caller bug — the slot
    /// count is known before any draw begins).
    #[inline]
    pub fn push(&mut self, value: Vec4) {
        assert!(self.len < MAX_VARYINGS, "varying bundle overflow");
        self.slots[self.len] = value;
        self.len += 1;
    }

    #[inline]
    pub fn push_vec2(&mut self, v: Vec2) {
        self.push(Vec4::new(v.x, v.y, 0.0, 0.0));
    }

    #[inline]
    pub fn push_vec3(&mut self, v: Vec3) {
        self.push(Vec4::new(v.x, v.y, v.z, 0.0));
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Vec4 {
        debug_assert!(slot < self.len);
        self.slots[slot]
    }

    #[inline]
    pub fn set(&mut self, slot: usize, value: Vec4) {
        debug_assert!(slot < self.len);
        self.slots[slot] = value;
    }

    /// Read a slot as a 2-component attribute
    #[inline]
    pub fn vec2(&self, slot: usize) -> Vec2 {
        let v = self.get(slot);
        Vec2::new(v.x, v.y)
    }

    /// Read a slot as a 3-component attribute
    #[inline]
    pub fn vec3(&self, slot: usize) -> Vec3 {
        self.get(slot).truncate()
    }

    /// Barycentric combination of three bundles. All three must carry the
    /// same slot count (outputs of one vertex shader over one primitive).
    pub fn weighted_sum(a: &Self, b: &Self, c: &Self, wa: f32, wb: f32, wc: f32) -> Self {
        debug_assert!(a.len == b.len && b.len == c.len);
        let mut out = Self::new();
        for i in 0..a.len {
            out.push(a.slots[i] * wa + b.slots[i] * wb + c.slots[i] * wc);
        }
        out
    }
}

impl Default for Varyings {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Shader traits
// ============================================================================

/// Per-vertex shading strategy.
///
/// Must be deterministic and side-effect free: the rasterizer may invoke it
/// in any order and caches results by vertex index.
pub trait VertexShader: Send + Sync {
    /// Map one object-space position and its attribute bundle to a
    /// clip-space position and the bundle to interpolate across the triangle.
    fn shade(
        &self,
        position: Vec3,
        uniforms: &(dyn Any + Send + Sync),
        input: &Varyings,
    ) -> (Vec4, Varyings);
}

/// Per-fragment shading strategy.
///
/// Writes the fragment color in place. Receives the vertex shader bound to
/// the same primitive, so a custom fragment stage can consult its
/// counterpart; the built-ins ignore it. Must not depend on invocation order
/// across fragments of the same draw.
pub trait FragmentShader: Send + Sync {
    fn shade(
        &self,
        output: &mut [f32; 4],
        vertex_shader: &dyn VertexShader,
        uniforms: &(dyn Any + Send + Sync),
        input: &Varyings,
        textures: &TextureTable,
    );
}

// ============================================================================
// Built-in strategies
// ============================================================================

/// Matrix uniforms consumed by the built-in vertex shaders
#[derive(Debug, Clone, Copy)]
pub struct MatrixUniforms {
    /// Combined model-view-projection transform
    pub mvp: Mat4,
    /// Model transform, applied to normals as directions
    pub model: Mat4,
}

impl Default for MatrixUniforms {
    fn default() -> Self {
        Self {
            mvp: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
        }
    }
}

/// Default vertex shader: applies `MatrixUniforms::mvp` to the position and
/// `model` to the normal slot, passes every other attribute through.
/// Without matrix uniforms the position passes through unprojected (w = 1),
/// which treats object space as clip space.
#[derive(Debug, Default)]
pub struct DefaultVertexShader;

impl VertexShader for DefaultVertexShader {
    fn shade(
        &self,
        position: Vec3,
        uniforms: &(dyn Any + Send + Sync),
        input: &Varyings,
    ) -> (Vec4, Varyings) {
        let mut output = *input;
        let clip = match uniforms.downcast_ref::<MatrixUniforms>() {
            Some(m) => {
                if output.len() > SLOT_NORMAL {
                    let n = m.model.transform_direction(output.vec3(SLOT_NORMAL));
                    let n = n.normalize();
                    output.set(SLOT_NORMAL, Vec4::new(n.x, n.y, n.z, 0.0));
                }
                m.mvp.transform_point(position)
            },
            None => position.extend(1.0),
        };
        (clip, output)
    }
}

/// Default fragment shader: samples texture slot 0 at the interpolated UV,
/// or produces solid opaque white when no texture is bound.
#[derive(Debug, Default)]
pub struct DefaultFragmentShader;

impl FragmentShader for DefaultFragmentShader {
    fn shade(
        &self,
        output: &mut [f32; 4],
        _vertex_shader: &dyn VertexShader,
        _uniforms: &(dyn Any + Send + Sync),
        input: &Varyings,
        textures: &TextureTable,
    ) {
        match textures.get(0) {
            Some(tex) if input.len() > SLOT_UV => {
                // Interpolation error can push uv a hair outside [0,1]
                let uv = input.vec2(SLOT_UV);
                *output = tex.sample(uv.x.clamp(0.0, 1.0), uv.y.clamp(0.0, 1.0));
            },
            _ => *output = [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Analysis vertex shader: same projection path as the default shader but
/// always leaves the normal slot untransformed, so the fragment stage sees
/// raw object-space attributes for debugging.
#[derive(Debug, Default)]
pub struct AnalysisVertexShader;

impl VertexShader for AnalysisVertexShader {
    fn shade(
        &self,
        position: Vec3,
        uniforms: &(dyn Any + Send + Sync),
        input: &Varyings,
    ) -> (Vec4, Varyings) {
        let clip = match uniforms.downcast_ref::<MatrixUniforms>() {
            Some(m) => m.mvp.transform_point(position),
            None => position.extend(1.0),
        };
        (clip, *input)
    }
}

/// Analysis fragment shader: visualizes one interpolated attribute slot as a
/// color, remapped from [-1, 1] to [0, 1] per component. The classic
/// normal-visualization debug view.
#[derive(Debug)]
pub struct AnalysisFragmentShader {
    pub slot: usize,
}

impl Default for AnalysisFragmentShader {
    fn default() -> Self {
        Self { slot: SLOT_NORMAL }
    }
}

impl FragmentShader for AnalysisFragmentShader {
    fn shade(
        &self,
        output: &mut [f32; 4],
        _vertex_shader: &dyn VertexShader,
        _uniforms: &(dyn Any + Send + Sync),
        input: &Varyings,
        _textures: &TextureTable,
    ) {
        if self.slot < input.len() {
            let v = input.get(self.slot);
            *output = [
                v.x * 0.5 + 0.5,
                v.y * 0.5 + 0.5,
                v.z * 0.5 + 0.5,
                1.0,
            ];
        } else {
            // Missing slot renders magenta, the traditional "look here" color
            *output = [1.0, 0.0, 1.0, 1.0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varyings_push_and_read() {
        let mut v = Varyings::new();
        v.push_vec2(Vec2::new(0.25, 0.75));
        v.push_vec3(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(v.len(), 2);
        assert_eq!(v.vec2(0), Vec2::new(0.25, 0.75));
        assert_eq!(v.vec3(1), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_weighted_sum_identity_at_vertex() {
        let mut a = Varyings::new();
        a.push(Vec4::new(1.0, 2.0, 3.0, 4.0));
        let mut b = Varyings::new();
        b.push(Vec4::new(5.0, 6.0, 7.0, 8.0));
        let mut c = Varyings::new();
        c.push(Vec4::new(9.0, 10.0, 11.0, 12.0));

        let at_a = Varyings::weighted_sum(&a, &b, &c, 1.0, 0.0, 0.0);
        assert_eq!(at_a.get(0), a.get(0));
    }

    #[test]
    fn test_weighted_sum_constant_attribute() {
        let mut v = Varyings::new();
        v.push(Vec4::new(0.5, 0.5, 0.5, 1.0));
        let mid = Varyings::weighted_sum(&v, &v, &v, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
        assert!(mid.get(0).approx_eq(&v.get(0), 1e-6));
    }

    #[test]
    fn test_default_vertex_shader_is_deterministic() {
        let shader = DefaultVertexShader;
        let uniforms: UniformBuffer = Arc::new(MatrixUniforms::default());
        let mut input = Varyings::new();
        input.push_vec2(Vec2::new(0.5, 0.5));
        let p = Vec3::new(1.0, 2.0, 3.0);
        let (c1, v1) = shader.shade(p, uniforms.as_ref(), &input);
        let (c2, v2) = shader.shade(p, uniforms.as_ref(), &input);
        assert_eq!(c1, c2);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_default_vertex_shader_passthrough_without_uniforms() {
        let shader = DefaultVertexShader;
        let uniforms: UniformBuffer = Arc::new(());
        let (clip, _) = shader.shade(Vec3::new(0.5, -0.5, 0.0), uniforms.as_ref(), &Varyings::new());
        assert_eq!(clip, Vec4::new(0.5, -0.5, 0.0, 1.0));
    }

    #[test]
    fn test_default_fragment_shader_white_without_textures() {
        let shader = DefaultFragmentShader;
        let table = TextureTable::empty();
        let mut color = [0.0f32; 4];
        shader.shade(&mut color, &DefaultVertexShader, &(), &Varyings::new(), &table);
        assert_eq!(color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_analysis_fragment_shader_remaps_normal() {
        let shader = AnalysisFragmentShader::default();
        let mut input = Varyings::new();
        input.push_vec2(Vec2::new(0.0, 0.0)); // uv slot
        input.push_vec3(Vec3::new(0.0, 0.0, 1.0)); // normal slot
        let mut color = [0.0f32; 4];
        shader.shade(
            &mut color,
            &DefaultVertexShader,
            &(),
            &input,
            &TextureTable::empty(),
        );
        assert_eq!(color, [0.5, 0.5, 1.0, 1.0]);
    }
}
