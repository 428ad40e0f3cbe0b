//! Drawable Primitive
//!
//! A `Primitive` aggregates everything one draw call needs: vertex and index
//! buffers, per-vertex attribute buffers, a vertex/fragment shader pair, an
//! opaque uniform buffer, and an ordered list of texture bindings. Shaders
//! and uniforms use shared ownership so several primitives can reference the
//! same instance.
//!
//! Texture bindings carry an explicit ownership tag: `Borrowed` references
//! an externally owned texture (the external owner guarantees it outlives
//! the draw), `Shared` extends the texture's lifetime to the primitive
//! itself. The two are never mixed implicitly — every slot states which one
//! it is.

use std::sync::Arc;

use crate::math3d::{Mesh, Vec2, Vec3, Vec4};
use crate::shader::{
    DefaultFragmentShader, DefaultVertexShader, FragmentShader, UniformBuffer, Varyings,
    VertexShader,
};
use crate::texture::{Texture, TextureTable};

/// A parallel per-vertex attribute array (one entry per vertex)
#[derive(Clone)]
pub enum AttributeBuffer {
    Vec2(Vec<Vec2>),
    Vec3(Vec<Vec3>),
    Vec4(Vec<Vec4>),
}

impl AttributeBuffer {
    pub fn len(&self) -> usize {
        match self {
            Self::Vec2(v) => v.len(),
            Self::Vec3(v) => v.len(),
            Self::Vec4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append this buffer's value for `vertex` to a varying bundle
    #[inline]
    fn push_into(&self, vertex: usize, out: &mut Varyings) {
        match self {
            Self::Vec2(v) => out.push_vec2(v[vertex]),
            Self::Vec3(v) => out.push_vec3(v[vertex]),
            Self::Vec4(v) => out.push(v[vertex]),
        }
    }
}

/// One texture slot with an explicit ownership tag
pub enum TextureBinding<'t> {
    /// Non-owning reference; the external owner keeps it alive for every
    /// draw this primitive participates in
    Borrowed(&'t Texture),
    /// Shared ownership; lifetime extends to the longest holder
    Shared(Arc<Texture>),
}

impl TextureBinding<'_> {
    #[inline]
    fn texture(&self) -> &Texture {
        match self {
            Self::Borrowed(t) => t,
            Self::Shared(t) => t,
        }
    }
}

/// The drawable unit consumed by the rasterizer
pub struct Primitive<'t> {
    id: u32,
    vertices: Vec<Vec3>,
    indices: Vec<[usize; 3]>,
    attributes: Vec<AttributeBuffer>,
    vertex_shader: Arc<dyn VertexShader>,
    fragment_shader: Arc<dyn FragmentShader>,
    uniforms: UniformBuffer,
    textures: Vec<TextureBinding<'t>>,
}

impl<'t> Primitive<'t> {
    /// Create a primitive with the default shader pair and no uniforms
    pub fn new(id: u32, vertices: Vec<Vec3>, indices: Vec<[usize; 3]>) -> Self {
        Self {
            id,
            vertices,
            indices,
            attributes: Vec::new(),
            vertex_shader: Arc::new(DefaultVertexShader),
            fragment_shader: Arc::new(DefaultFragmentShader),
            uniforms: Arc::new(()),
            textures: Vec::new(),
        }
    }

    /// Build a primitive from a mesh. UVs land in attribute slot 0 and
    /// normals in slot 1 when the mesh carries them (the convention the
    /// built-in shaders use).
    pub fn from_mesh(id: u32, mesh: &Mesh) -> Self {
        let mut prim = Self::new(id, mesh.vertices.clone(), mesh.faces.clone());
        if !mesh.uvs.is_empty() {
            prim.push_attribute(AttributeBuffer::Vec2(mesh.uvs.clone()));
        }
        if !mesh.normals.is_empty() {
            prim.push_attribute(AttributeBuffer::Vec3(mesh.normals.clone()));
        }
        prim
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[[usize; 3]] {
        &self.indices
    }

    #[inline]
    pub fn vertex_shader(&self) -> &dyn VertexShader {
        self.vertex_shader.as_ref()
    }

    #[inline]
    pub fn fragment_shader(&self) -> &dyn FragmentShader {
        self.fragment_shader.as_ref()
    }

    #[inline]
    pub fn uniforms(&self) -> &(dyn std::any::Any + Send + Sync) {
        self.uniforms.as_ref()
    }

    /// Bind a shader pair (shared; callers may hand the same Arc to several
    /// primitives)
    pub fn set_shaders(
        &mut self,
        vertex: Arc<dyn VertexShader>,
        fragment: Arc<dyn FragmentShader>,
    ) {
        self.vertex_shader = vertex;
        self.fragment_shader = fragment;
    }

    /// Replace the uniform buffer. The primitive never inspects it.
    pub fn set_uniforms(&mut self, uniforms: UniformBuffer) {
        self.uniforms = uniforms;
    }

    /// Append an attribute buffer, returning its slot index
    pub fn push_attribute(&mut self, buffer: AttributeBuffer) -> usize {
        self.attributes.push(buffer);
        self.attributes.len() - 1
    }

    /// Bind a texture in the next free slot, returning the slot index
    pub fn bind_texture(&mut self, binding: TextureBinding<'t>) -> usize {
        self.textures.push(binding);
        self.textures.len() - 1
    }

    /// Bind a shared (owning) texture reference
    pub fn bind_texture_shared(&mut self, texture: Arc<Texture>) -> usize {
        self.bind_texture(TextureBinding::Shared(texture))
    }

    /// Bind a borrowed (non-owning) texture reference
    pub fn bind_texture_ref(&mut self, texture: &'t Texture) -> usize {
        self.bind_texture(TextureBinding::Borrowed(texture))
    }

    /// Materialize the `slot -> texture` lookup for an in-flight draw
    pub fn texture_table(&self) -> TextureTable<'_> {
        TextureTable::from_slots(self.textures.iter().map(TextureBinding::texture).collect())
    }

    /// Assemble the input attribute bundle for one vertex
    pub fn vertex_input(&self, vertex: usize) -> Varyings {
        let mut input = Varyings::new();
        for attr in &self.attributes {
            attr.push_into(vertex, &mut input);
        }
        input
    }

    /// Check the shape invariants a draw relies on: every index names a
    /// vertex and every attribute buffer is parallel to the vertex buffer.
    /// All shapes are known before a draw begins, so a failure here is a
    /// caller bug, not a runtime condition.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.vertices.len();
        for (i, tri) in self.indices.iter().enumerate() {
            for &idx in tri {
                if idx >= n {
                    return Err(format!(
                        "primitive {}: triangle {} references vertex {} of {}",
                        self.id, i, idx, n
                    ));
                }
            }
        }
        for (slot, attr) in self.attributes.iter().enumerate() {
            if attr.len() != n {
                return Err(format!(
                    "primitive {}: attribute slot {} has {} entries for {} vertices",
                    self.id,
                    slot,
                    attr.len(),
                    n
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<Vec3>, Vec<[usize; 3]>) {
        (
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_validate_accepts_well_formed_primitive() {
        let (v, i) = triangle();
        let mut prim = Primitive::new(1, v, i);
        prim.push_attribute(AttributeBuffer::Vec2(vec![Vec2::default(); 3]));
        assert!(prim.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let (v, _) = triangle();
        let prim = Primitive::new(1, v, vec![[0, 1, 3]]);
        assert!(prim.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_attribute_buffer() {
        let (v, i) = triangle();
        let mut prim = Primitive::new(1, v, i);
        prim.push_attribute(AttributeBuffer::Vec3(vec![Vec3::zero(); 2]));
        assert!(prim.validate().is_err());
    }

    #[test]
    fn test_vertex_input_widens_attributes_in_slot_order() {
        let (v, i) = triangle();
        let mut prim = Primitive::new(1, v, i);
        prim.push_attribute(AttributeBuffer::Vec2(vec![Vec2::new(0.5, 0.25); 3]));
        prim.push_attribute(AttributeBuffer::Vec3(vec![Vec3::new(0.0, 0.0, 1.0); 3]));
        let input = prim.vertex_input(0);
        assert_eq!(input.len(), 2);
        assert_eq!(input.vec2(0), Vec2::new(0.5, 0.25));
        assert_eq!(input.vec3(1), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_texture_table_preserves_slot_order() {
        let (v, i) = triangle();
        let checker = Texture::checkerboard(4, 1, [255, 0, 0], [0, 0, 0]);
        let xor = Arc::new(Texture::xor_pattern(8));

        let mut prim = Primitive::new(1, v, i);
        let slot0 = prim.bind_texture_ref(&checker);
        let slot1 = prim.bind_texture_shared(Arc::clone(&xor));
        assert_eq!((slot0, slot1), (0, 1));

        let table = prim.texture_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().width(), 4);
        assert_eq!(table.get(1).unwrap().width(), 8);
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_from_mesh_carries_uv_and_normal_slots() {
        let mesh = Mesh::quad(2.0, 2.0);
        let prim = Primitive::from_mesh(7, &mesh);
        assert_eq!(prim.id(), 7);
        assert!(prim.validate().is_ok());
        let input = prim.vertex_input(0);
        assert_eq!(input.len(), 2);
    }
}
