//! Backend abstraction traits for the rendering system
//!
//! The engine never talks to a graphics API directly. Everything it needs
//! from an immediate-mode backend is expressed by [`DrawApi`]: matrix stack
//! manipulation, clearing, light slots, texture upload, and the
//! compile/replay/release cycle for precompiled command lists.

use bitflags::bitflags;

use crate::assets::ImageData;
use crate::foundation::math::{Color, Vec3, Vec4};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a compiled command list stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle(pub u64);

/// Handle to an uploaded texture stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

bitflags! {
    /// Buffers affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Colour buffer
        const COLOR = 0b01;
        /// Depth buffer
        const DEPTH = 0b10;
    }
}

/// Matrix targeted by subsequent matrix operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixMode {
    /// Projection matrix (camera lens and view)
    Projection,
    /// Model-view matrix (object placement)
    ModelView,
}

/// Fixed-function pipeline features the engine switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Per-vertex lighting from the enabled light slots
    Lighting,
    /// Depth testing
    DepthTest,
    /// Multisample anti-aliasing
    Multisample,
    /// Vertex colour drives the material colour
    ColorMaterial,
}

/// Rasterization mode for front-facing polygons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Filled polygons
    Fill,
    /// Outlines only
    Line,
    /// Vertices only
    Point,
}

/// One of the eight fixed light slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightSlot {
    /// Slot 0
    Light0,
    /// Slot 1
    Light1,
    /// Slot 2
    Light2,
    /// Slot 3
    Light3,
    /// Slot 4
    Light4,
    /// Slot 5
    Light5,
    /// Slot 6
    Light6,
    /// Slot 7
    Light7,
}

impl LightSlot {
    /// All slots in index order
    pub const ALL: [LightSlot; 8] = [
        LightSlot::Light0,
        LightSlot::Light1,
        LightSlot::Light2,
        LightSlot::Light3,
        LightSlot::Light4,
        LightSlot::Light5,
        LightSlot::Light6,
        LightSlot::Light7,
    ];

    /// Zero-based slot index
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single light-slot parameter write
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightParam {
    /// Homogeneous position; `w == 0` means a directional light
    Position(Vec4),
    /// Ambient colour
    Ambient(Color),
    /// Diffuse colour
    Diffuse(Color),
    /// Specular colour
    Specular(Color),
    /// Constant attenuation term
    ConstantAttenuation(f32),
    /// Linear attenuation term
    LinearAttenuation(f32),
    /// Quadratic attenuation term
    QuadraticAttenuation(f32),
    /// Spot cone half-angle in degrees
    SpotCutoff(f32),
    /// Spot intensity falloff exponent
    SpotExponent(f32),
    /// Spot direction
    SpotDirection(Vec3),
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Sampling setup applied when a texture is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureParams {
    /// Minification filter
    pub min_filter: TextureFilter,
    /// Magnification filter
    pub mag_filter: TextureFilter,
    /// Build the full mip chain on upload
    pub generate_mipmaps: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            generate_mipmaps: true,
        }
    }
}

/// One entry of a compiled command list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Counter-clockwise polygons are front-facing
    FrontFaceCcw,
    /// Enable 2D texturing
    EnableTexturing,
    /// Disable 2D texturing
    DisableTexturing,
    /// Start a polygon primitive
    BeginPolygon,
    /// Current normal for following vertices
    Normal([f32; 3]),
    /// Current texture coordinate for following vertices
    TexCoord([f32; 2]),
    /// Emit a vertex position
    Vertex([f32; 3]),
    /// Finish the current polygon
    EndPolygon,
}

/// Immediate-mode drawing capability consumed by the engine
///
/// Implementations wrap whatever graphics API the target provides. Matrix
/// operations follow fixed-function semantics: they post-multiply the matrix
/// selected by [`matrix_mode`](DrawApi::matrix_mode).
pub trait DrawApi {
    /// Set the viewport rectangle in framebuffer pixels
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Clear the selected buffers
    fn clear(&mut self, mask: ClearFlags);

    /// Set the colour used by subsequent colour clears
    fn clear_color(&mut self, color: Color);

    /// Enable a pipeline capability
    fn enable(&mut self, capability: Capability);

    /// Select the matrix affected by subsequent matrix operations
    fn matrix_mode(&mut self, mode: MatrixMode);

    /// Replace the current matrix with the identity
    fn load_identity(&mut self);

    /// Multiply the current matrix by a translation
    fn translate(&mut self, offset: Vec3);

    /// Multiply the current matrix by a rotation of `angle_degrees` around `axis`
    fn rotate(&mut self, angle_degrees: f32, axis: Vec3);

    /// Multiply the current matrix by a non-uniform scale
    fn scale(&mut self, factors: Vec3);

    /// Multiply the current matrix by a perspective frustum
    fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32);

    /// Multiply the current matrix by an orthographic projection
    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32);

    /// Multiply the current matrix by a symmetric perspective projection
    fn perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32);

    /// Multiply the current matrix by a look-at view transform
    fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3);

    /// Rasterization mode for front faces
    fn polygon_mode(&mut self, mode: PolygonMode);

    /// Precompile a command sequence into a replayable list
    fn compile_list(&mut self, commands: &[DrawCommand]) -> BackendResult<ListHandle>;

    /// Replay a compiled list under the current matrices
    fn call_list(&mut self, handle: ListHandle) -> BackendResult<()>;

    /// Release a compiled list
    fn delete_list(&mut self, handle: ListHandle) -> BackendResult<()>;

    /// Upload RGBA pixels into a new texture slot
    fn upload_texture(&mut self, image: &ImageData, params: TextureParams) -> BackendResult<TextureHandle>;

    /// Bind a texture for subsequent draws, or unbind with `None`
    fn bind_texture(&mut self, texture: Option<TextureHandle>) -> BackendResult<()>;

    /// Release an uploaded texture
    fn delete_texture(&mut self, handle: TextureHandle) -> BackendResult<()>;

    /// Write one parameter of a light slot
    fn light(&mut self, slot: LightSlot, param: LightParam);

    /// Switch a light slot on
    fn enable_light(&mut self, slot: LightSlot);

    /// Flush queued commands to the device
    fn flush(&mut self);
}
