//! In-memory reference backend
//!
//! [`RecordingBackend`] implements [`DrawApi`] without a GPU. It keeps the
//! fixed-function state a real immediate-mode driver would (two matrices,
//! light slots, bound texture, enabled capabilities), stores compiled lists
//! and textures in slot maps, and appends every externally visible effect to
//! an event log. Tests inspect the log; the headless demo uses it to report
//! what a frame drew.

use std::collections::HashSet;

use crate::assets::ImageData;
use crate::foundation::collections::{key_from_raw, key_to_raw, HandleMap};
use crate::foundation::math::{Color, Mat4, Mat4Ext, Vec3, Vec4};
use crate::render::api::{
    BackendResult, Capability, ClearFlags, DrawApi, DrawCommand, LightParam, LightSlot, ListHandle,
    MatrixMode, PolygonMode, TextureHandle, TextureParams,
};
use crate::render::RenderError;

/// One externally visible effect recorded by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// Viewport changed
    Viewport {
        /// Left edge
        x: i32,
        /// Bottom edge
        y: i32,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Buffers cleared
    Clear(ClearFlags),
    /// Clear colour changed
    ClearColor(Color),
    /// Capability enabled
    Enable(Capability),
    /// Polygon mode changed
    PolygonMode(PolygonMode),
    /// A compiled list was replayed
    CallList {
        /// Replayed list
        handle: ListHandle,
        /// Projection matrix at replay time
        projection: Mat4,
        /// Model-view matrix at replay time
        model_view: Mat4,
        /// Texture bound at replay time
        texture: Option<TextureHandle>,
    },
    /// Texture bound or unbound
    BindTexture(Option<TextureHandle>),
    /// Light parameter written (positions and directions already in eye space)
    Light {
        /// Target slot
        slot: LightSlot,
        /// Written value
        param: LightParam,
    },
    /// Light slot enabled
    EnableLight(LightSlot),
    /// Command stream flushed
    Flush,
}

/// Per-slot light state, initialised to the fixed-function defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    /// Eye-space position (`w == 0` for directional)
    pub position: Vec4,
    /// Ambient colour
    pub ambient: Color,
    /// Diffuse colour
    pub diffuse: Color,
    /// Specular colour
    pub specular: Color,
    /// Constant attenuation
    pub constant_attenuation: f32,
    /// Linear attenuation
    pub linear_attenuation: f32,
    /// Quadratic attenuation
    pub quadratic_attenuation: f32,
    /// Spot cutoff in degrees (180 = not a spot)
    pub spot_cutoff: f32,
    /// Spot exponent
    pub spot_exponent: f32,
    /// Eye-space spot direction
    pub spot_direction: Vec3,
    /// Whether the slot is switched on
    pub enabled: bool,
}

impl LightState {
    fn defaults(slot: LightSlot) -> Self {
        // Slot 0 is the only one that starts with a white diffuse/specular
        let primary = if slot == LightSlot::Light0 {
            [1.0, 1.0, 1.0, 1.0]
        } else {
            [0.0, 0.0, 0.0, 1.0]
        };
        Self {
            position: Vec4::new(0.0, 0.0, 1.0, 0.0),
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: primary,
            specular: primary,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            spot_cutoff: 180.0,
            spot_exponent: 0.0,
            spot_direction: Vec3::new(0.0, 0.0, -1.0),
            enabled: false,
        }
    }
}

#[derive(Debug)]
struct StoredTexture {
    image: ImageData,
    params: TextureParams,
    mip_levels: Vec<ImageData>,
}

/// Drawing backend that records instead of rasterizing
#[derive(Debug)]
pub struct RecordingBackend {
    matrix_mode: MatrixMode,
    projection: Mat4,
    model_view: Mat4,
    lists: HandleMap<Vec<DrawCommand>>,
    textures: HandleMap<StoredTexture>,
    bound_texture: Option<TextureHandle>,
    capabilities: HashSet<Capability>,
    polygon_mode: PolygonMode,
    clear_color: Color,
    viewport: (i32, i32, u32, u32),
    lights: [LightState; 8],
    events: Vec<DrawEvent>,
    replayed_commands: usize,
    texture_capacity: Option<usize>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Fresh backend with identity matrices and default light state
    pub fn new() -> Self {
        Self {
            matrix_mode: MatrixMode::ModelView,
            projection: Mat4::identity(),
            model_view: Mat4::identity(),
            lists: HandleMap::new(),
            textures: HandleMap::new(),
            bound_texture: None,
            capabilities: HashSet::new(),
            polygon_mode: PolygonMode::Fill,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            viewport: (0, 0, 0, 0),
            lights: LightSlot::ALL.map(LightState::defaults),
            events: Vec::new(),
            replayed_commands: 0,
            texture_capacity: None,
        }
    }

    /// Fail uploads with [`RenderError::UploadFailed`] once `capacity` textures are live
    pub fn with_texture_capacity(mut self, capacity: usize) -> Self {
        self.texture_capacity = Some(capacity);
        self
    }

    /// Recorded events since the last [`take_events`](Self::take_events)
    pub fn events(&self) -> &[DrawEvent] {
        &self.events
    }

    /// Drain the event log
    pub fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.events)
    }

    /// Commands stored under a compiled list
    pub fn compiled_commands(&self, handle: ListHandle) -> Option<&[DrawCommand]> {
        self.lists.get(key_from_raw(handle.0)).map(Vec::as_slice)
    }

    /// Number of live compiled lists
    pub fn compiled_list_count(&self) -> usize {
        self.lists.len()
    }

    /// Number of live textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Upload parameters of a live texture
    pub fn texture_params(&self, handle: TextureHandle) -> Option<TextureParams> {
        self.textures.get(key_from_raw(handle.0)).map(|t| t.params)
    }

    /// Number of generated mip levels below the base image
    pub fn texture_mip_levels(&self, handle: TextureHandle) -> Option<usize> {
        self.textures.get(key_from_raw(handle.0)).map(|t| t.mip_levels.len())
    }

    /// Base image of a live texture
    pub fn texture_image(&self, handle: TextureHandle) -> Option<&ImageData> {
        self.textures.get(key_from_raw(handle.0)).map(|t| &t.image)
    }

    /// Total commands replayed through [`DrawApi::call_list`]
    pub fn replayed_command_count(&self) -> usize {
        self.replayed_commands
    }

    /// Current projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Current model-view matrix
    pub fn model_view(&self) -> &Mat4 {
        &self.model_view
    }

    /// State of a light slot
    pub fn light_state(&self, slot: LightSlot) -> &LightState {
        &self.lights[slot.index()]
    }

    /// Whether a capability has been enabled
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Texture currently bound
    pub fn bound_texture(&self) -> Option<TextureHandle> {
        self.bound_texture
    }

    /// Last clear colour set
    pub fn current_clear_color(&self) -> Color {
        self.clear_color
    }

    /// Last viewport set, as `(x, y, width, height)`
    pub fn current_viewport(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }

    /// Last polygon mode set
    pub fn current_polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    fn current_matrix(&mut self) -> &mut Mat4 {
        match self.matrix_mode {
            MatrixMode::Projection => &mut self.projection,
            MatrixMode::ModelView => &mut self.model_view,
        }
    }

    fn multiply(&mut self, rhs: Mat4) {
        let current = self.current_matrix();
        *current *= rhs;
    }
}

impl DrawApi for RecordingBackend {
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
        self.events.push(DrawEvent::Viewport { x, y, width, height });
    }

    fn clear(&mut self, mask: ClearFlags) {
        self.events.push(DrawEvent::Clear(mask));
    }

    fn clear_color(&mut self, color: Color) {
        self.clear_color = color;
        self.events.push(DrawEvent::ClearColor(color));
    }

    fn enable(&mut self, capability: Capability) {
        self.capabilities.insert(capability);
        self.events.push(DrawEvent::Enable(capability));
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.matrix_mode = mode;
    }

    fn load_identity(&mut self) {
        *self.current_matrix() = Mat4::identity();
    }

    fn translate(&mut self, offset: Vec3) {
        self.multiply(Mat4::new_translation(&offset));
    }

    fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.multiply(Mat4::rotation_degrees(angle_degrees, axis));
    }

    fn scale(&mut self, factors: Vec3) {
        self.multiply(Mat4::new_nonuniform_scaling(&factors));
    }

    fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.multiply(<Mat4 as Mat4Ext>::frustum(left, right, bottom, top, near, far));
    }

    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.multiply(Mat4::orthographic(left, right, bottom, top, near, far));
    }

    fn perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.multiply(Mat4::perspective_degrees(fov_y_degrees, aspect, near, far));
    }

    fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.multiply(<Mat4 as Mat4Ext>::look_at(eye, center, up));
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
        self.events.push(DrawEvent::PolygonMode(mode));
    }

    fn compile_list(&mut self, commands: &[DrawCommand]) -> BackendResult<ListHandle> {
        let key = self.lists.insert(commands.to_vec());
        Ok(ListHandle(key_to_raw(key)))
    }

    fn call_list(&mut self, handle: ListHandle) -> BackendResult<()> {
        let commands = self
            .lists
            .get(key_from_raw(handle.0))
            .ok_or(RenderError::UnknownHandle { kind: "list", id: handle.0 })?;
        self.replayed_commands += commands.len();
        self.events.push(DrawEvent::CallList {
            handle,
            projection: self.projection,
            model_view: self.model_view,
            texture: self.bound_texture,
        });
        Ok(())
    }

    fn delete_list(&mut self, handle: ListHandle) -> BackendResult<()> {
        self.lists
            .remove(key_from_raw(handle.0))
            .map(|_| ())
            .ok_or(RenderError::UnknownHandle { kind: "list", id: handle.0 })
    }

    fn upload_texture(&mut self, image: &ImageData, params: TextureParams) -> BackendResult<TextureHandle> {
        image
            .validate()
            .map_err(|e| RenderError::InvalidImage(e.to_string()))?;
        if let Some(capacity) = self.texture_capacity {
            if self.textures.len() >= capacity {
                return Err(RenderError::UploadFailed(format!(
                    "texture memory exhausted ({} of {} slots in use)",
                    self.textures.len(),
                    capacity
                )));
            }
        }
        let mip_levels = if params.generate_mipmaps {
            image
                .mip_chain()
                .map_err(|e| RenderError::UploadFailed(e.to_string()))?
        } else {
            Vec::new()
        };
        let key = self.textures.insert(StoredTexture {
            image: image.clone(),
            params,
            mip_levels,
        });
        Ok(TextureHandle(key_to_raw(key)))
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) -> BackendResult<()> {
        if let Some(handle) = texture {
            if !self.textures.contains_key(key_from_raw(handle.0)) {
                return Err(RenderError::UnknownHandle { kind: "texture", id: handle.0 });
            }
        }
        self.bound_texture = texture;
        self.events.push(DrawEvent::BindTexture(texture));
        Ok(())
    }

    fn delete_texture(&mut self, handle: TextureHandle) -> BackendResult<()> {
        self.textures
            .remove(key_from_raw(handle.0))
            .ok_or(RenderError::UnknownHandle { kind: "texture", id: handle.0 })?;
        if self.bound_texture == Some(handle) {
            self.bound_texture = None;
        }
        Ok(())
    }

    fn light(&mut self, slot: LightSlot, param: LightParam) {
        // Positions and directions are captured in eye space, like a driver does
        let param = match param {
            LightParam::Position(position) => LightParam::Position(self.model_view * position),
            LightParam::SpotDirection(direction) => {
                LightParam::SpotDirection(self.model_view.transform_vector(&direction))
            }
            other => other,
        };

        let state = &mut self.lights[slot.index()];
        match param {
            LightParam::Position(position) => state.position = position,
            LightParam::Ambient(color) => state.ambient = color,
            LightParam::Diffuse(color) => state.diffuse = color,
            LightParam::Specular(color) => state.specular = color,
            LightParam::ConstantAttenuation(value) => state.constant_attenuation = value,
            LightParam::LinearAttenuation(value) => state.linear_attenuation = value,
            LightParam::QuadraticAttenuation(value) => state.quadratic_attenuation = value,
            LightParam::SpotCutoff(value) => state.spot_cutoff = value,
            LightParam::SpotExponent(value) => state.spot_exponent = value,
            LightParam::SpotDirection(direction) => state.spot_direction = direction,
        }
        self.events.push(DrawEvent::Light { slot, param });
    }

    fn enable_light(&mut self, slot: LightSlot) {
        self.lights[slot.index()].enabled = true;
        self.events.push(DrawEvent::EnableLight(slot));
    }

    fn flush(&mut self) {
        self.events.push(DrawEvent::Flush);
    }
}
