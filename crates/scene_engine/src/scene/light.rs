//! Fixed-function light sources
//!
//! Each light drives one of the eight backend slots. Its colour is used for
//! the ambient, diffuse and specular terms alike. Directional lights send
//! their position with `w = 0`; point and spot lights send `w = 1` and
//! their attenuation terms. Spot lights additionally aim along the
//! transform's forward vector.

use std::fmt;

use crate::engine::EngineError;
use crate::foundation::math::{Color, Vec4};
use crate::render::api::{DrawApi, LightParam, LightSlot, MatrixMode};
use crate::scene::behavior::{BehaviorResult, RenderHook};
use crate::scene::Transform;

/// Largest spot cutoff that still describes a cone
pub const MAX_SPOT_CUTOFF: f32 = 90.0;

/// Spot cutoff that turns the cone off (uniform emission)
pub const UNIFORM_SPOT_CUTOFF: f32 = 180.0;

/// Largest accepted spot exponent
pub const MAX_SPOT_EXPONENT: f32 = 128.0;

/// Distance attenuation terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

impl Attenuation {
    /// Attenuation from its three terms
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        let terms = [self.constant, self.linear, self.quadratic];
        if terms.iter().all(|t| t.is_finite() && *t >= 0.0) {
            Ok(())
        } else {
            Err(EngineError::Configuration(format!(
                "attenuation terms must be finite and non-negative, got {:?}",
                self
            )))
        }
    }
}

/// Light kind with its kind-specific parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Parallel rays along the position vector
    Directional,
    /// Omnidirectional light that fades with distance
    Point {
        /// Distance attenuation
        attenuation: Attenuation,
    },
    /// Cone of light along the transform's forward vector
    Spot {
        /// Distance attenuation
        attenuation: Attenuation,
        /// Cone half-angle in degrees
        cutoff: f32,
        /// Intensity falloff towards the cone edge
        exponent: f32,
    },
}

impl LightKind {
    /// Homogeneous `w` sent with the position
    pub fn position_w(&self) -> f32 {
        match self {
            LightKind::Directional => 0.0,
            LightKind::Point { .. } | LightKind::Spot { .. } => 1.0,
        }
    }
}

/// Light state attached to a scene object
pub struct Light {
    kind: LightKind,
    slot: LightSlot,
    color: Color,
    render_hook: Option<RenderHook>,
}

impl fmt::Debug for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("kind", &self.kind)
            .field("slot", &self.slot)
            .field("color", &self.color)
            .field("has_render_hook", &self.render_hook.is_some())
            .finish()
    }
}

impl Light {
    /// Directional light
    pub fn directional(slot: LightSlot, color: Color) -> Self {
        Self {
            kind: LightKind::Directional,
            slot,
            color,
            render_hook: None,
        }
    }

    /// Point light
    pub fn point(slot: LightSlot, color: Color, attenuation: Attenuation) -> Result<Self, EngineError> {
        attenuation.validate()?;
        Ok(Self {
            kind: LightKind::Point { attenuation },
            slot,
            color,
            render_hook: None,
        })
    }

    /// Spot light
    pub fn spot(
        slot: LightSlot,
        color: Color,
        attenuation: Attenuation,
        cutoff: f32,
        exponent: f32,
    ) -> Result<Self, EngineError> {
        attenuation.validate()?;
        validate_cutoff(cutoff)?;
        validate_exponent(exponent)?;
        Ok(Self {
            kind: LightKind::Spot {
                attenuation,
                cutoff,
                exponent,
            },
            slot,
            color,
            render_hook: None,
        })
    }

    /// Builder: run `hook` after the light's own parameters are pushed
    pub fn with_render_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut dyn DrawApi) -> BehaviorResult + 'static,
    {
        self.render_hook = Some(Box::new(hook));
        self
    }

    /// Kind and its parameters
    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Backend slot
    pub fn slot(&self) -> LightSlot {
        self.slot
    }

    /// Light colour
    pub fn color(&self) -> Color {
        self.color
    }

    /// Replace the light colour
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Attenuation of point and spot lights
    pub fn attenuation(&self) -> Option<Attenuation> {
        match self.kind {
            LightKind::Directional => None,
            LightKind::Point { attenuation } | LightKind::Spot { attenuation, .. } => Some(attenuation),
        }
    }

    /// Replace the attenuation of a point or spot light
    pub fn set_attenuation(&mut self, value: Attenuation) -> Result<(), EngineError> {
        value.validate()?;
        match &mut self.kind {
            LightKind::Point { attenuation } | LightKind::Spot { attenuation, .. } => {
                *attenuation = value;
                Ok(())
            }
            LightKind::Directional => Err(EngineError::Configuration(
                "directional lights have no attenuation".to_string(),
            )),
        }
    }

    /// Cone half-angle of a spot light
    pub fn spot_cutoff(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { cutoff, .. } => Some(cutoff),
            _ => None,
        }
    }

    /// Replace the cone half-angle of a spot light
    pub fn set_spot_cutoff(&mut self, value: f32) -> Result<(), EngineError> {
        validate_cutoff(value)?;
        match &mut self.kind {
            LightKind::Spot { cutoff, .. } => {
                *cutoff = value;
                Ok(())
            }
            _ => Err(EngineError::Configuration("only spot lights have a cutoff".to_string())),
        }
    }

    /// Falloff exponent of a spot light
    pub fn spot_exponent(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { exponent, .. } => Some(exponent),
            _ => None,
        }
    }

    /// Replace the falloff exponent of a spot light
    pub fn set_spot_exponent(&mut self, value: f32) -> Result<(), EngineError> {
        validate_exponent(value)?;
        match &mut self.kind {
            LightKind::Spot { exponent, .. } => {
                *exponent = value;
                Ok(())
            }
            _ => Err(EngineError::Configuration("only spot lights have an exponent".to_string())),
        }
    }

    /// Push this light's parameters to its slot and switch it on
    pub fn render(&mut self, transform: &Transform, api: &mut dyn DrawApi) -> Result<(), EngineError> {
        api.matrix_mode(MatrixMode::ModelView);
        api.load_identity();

        let position = transform.position();
        api.light(
            self.slot,
            LightParam::Position(Vec4::new(position.x, position.y, position.z, self.kind.position_w())),
        );
        api.light(self.slot, LightParam::Ambient(self.color));
        api.light(self.slot, LightParam::Diffuse(self.color));
        api.light(self.slot, LightParam::Specular(self.color));

        match self.kind {
            LightKind::Directional => {}
            LightKind::Point { attenuation } => push_attenuation(api, self.slot, attenuation),
            LightKind::Spot {
                attenuation,
                cutoff,
                exponent,
            } => {
                push_attenuation(api, self.slot, attenuation);
                api.light(self.slot, LightParam::SpotCutoff(cutoff));
                api.light(self.slot, LightParam::SpotExponent(exponent));
                api.light(self.slot, LightParam::SpotDirection(transform.forward()));
            }
        }

        if let Some(hook) = self.render_hook.as_mut() {
            hook(&mut *api)?;
        }

        api.enable_light(self.slot);
        Ok(())
    }
}

fn push_attenuation(api: &mut dyn DrawApi, slot: LightSlot, attenuation: Attenuation) {
    api.light(slot, LightParam::LinearAttenuation(attenuation.linear));
    api.light(slot, LightParam::ConstantAttenuation(attenuation.constant));
    api.light(slot, LightParam::QuadraticAttenuation(attenuation.quadratic));
}

fn validate_cutoff(cutoff: f32) -> Result<(), EngineError> {
    #[allow(clippy::float_cmp)]
    let uniform = cutoff == UNIFORM_SPOT_CUTOFF;
    if (0.0..=MAX_SPOT_CUTOFF).contains(&cutoff) || uniform {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!(
            "spot cutoff must be within [0, {}] or exactly {}, got {}",
            MAX_SPOT_CUTOFF, UNIFORM_SPOT_CUTOFF, cutoff
        )))
    }
}

fn validate_exponent(exponent: f32) -> Result<(), EngineError> {
    if (0.0..=MAX_SPOT_EXPONENT).contains(&exponent) {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!(
            "spot exponent must be within [0, {}], got {}",
            MAX_SPOT_EXPONENT, exponent
        )))
    }
}
