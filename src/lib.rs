//! rastral — a CPU triangle rasterization pipeline
//!
//! Every stage runs in software: vertex shading, primitive assembly,
//! scan conversion with a top-left fill rule, perspective-correct attribute
//! interpolation, depth testing and fragment shading, ending in an RGBA
//! byte image ready for whatever presents it. No GPU, no windowing — the
//! crate stops at the pixel bytes.
//!
//! The usual frame loop:
//!
//! 1. [`Display::clear_render_target`] resets color and depth.
//! 2. [`Rasterizer::draw`] executes the pipeline per [`Primitive`].
//! 3. [`Display::update_color_buffer`] converts the floating-point frame
//!    into the presentable [`Image`].

pub mod config;
pub mod display;
pub mod image;
pub mod math3d;
pub mod primitive;
pub mod rasterizer;
pub mod shader;
pub mod texture;

pub use config::PipelineConfig;
pub use display::Display;
pub use image::Image;
pub use math3d::{Mat4, Mesh, Vec2, Vec3, Vec4};
pub use primitive::{AttributeBuffer, Primitive, TextureBinding};
pub use rasterizer::{DrawStats, Rasterizer, RenderTarget, Viewport};
pub use shader::{
    AnalysisFragmentShader, AnalysisVertexShader, DefaultFragmentShader, DefaultVertexShader,
    FragmentShader, MatrixUniforms, UniformBuffer, Varyings, VertexShader,
};
pub use texture::{Texture, TextureTable};
