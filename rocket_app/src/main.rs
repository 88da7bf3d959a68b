//! Rocket demo application
//!
//! Loads a textured rocket, lights it with a white directional light and
//! spins it in front of a frustum camera until the window closes.

use scene_engine::prelude::*;
use thiserror::Error;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/rocket.toml");
const ROCKET_MESH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/rocket.obj");
const ROCKET_TEXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/rocket.png");

/// Degrees per second around the rocket's long axis
const SPIN_SPEED: f32 = 45.0;

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] scene_engine::config::ConfigError),
}

fn build_scene(api: &mut dyn DrawApi) -> Result<Scene, EngineError> {
    let camera = SceneObject::camera(
        Transform::from_position(Vec3::new(0.0, 0.0, -1000.0)),
        Camera::frustum(0.01, 5000.0)?,
    );

    let mut mesh = Mesh::new(ObjLoader::load_obj(ROCKET_MESH)?, api)?;
    let texture = match load_texture(api) {
        Ok(texture) => texture,
        Err(e) => {
            mesh.free(api)?;
            return Err(e);
        }
    };

    let mut transform = Transform::default();
    transform.set_scale(Vec3::new(0.01, 0.01, 0.01));
    let rocket = SceneObject::entity(transform, Entity::new(mesh, texture, api)?).with_update(|this, dt| {
        this.transform_mut().rotate(SPIN_SPEED * dt, Vec3::y());
        Ok(())
    });

    let sun = SceneObject::light(Transform::default(), Light::directional(LightSlot::Light0, [1.0; 4]));

    Scene::new([1.0, 1.0, 1.0, 1.0], camera, vec![rocket, sun])
}

/// Upload the rocket texture, or `None` when the image cannot be read
fn load_texture(api: &mut dyn DrawApi) -> Result<Option<Texture>, EngineError> {
    match ImageData::from_file(ROCKET_TEXTURE) {
        Ok(image) => Ok(Some(Texture::upload(api, &image)?)),
        Err(e) => {
            log::warn!("Rocket texture unavailable ({}), using missing-albedo pattern", e);
            Ok(None)
        }
    }
}

#[cfg(feature = "glfw")]
fn run(config: EngineConfig) -> Result<(), EngineError> {
    let window = scene_engine::render::window::GlfwWindow::new(&config.window)?;
    log::warn!("No GL drawing backend is linked: the window opens but nothing is rasterized");
    let mut engine = Engine::new(config, window, RecordingBackend::new())?;
    let mut scene = build_scene(engine.api_mut())?;
    engine.run(&mut scene)
}

#[cfg(not(feature = "glfw"))]
fn run(config: EngineConfig) -> Result<(), EngineError> {
    let window = HeadlessWindow::new(&config.window.title, config.window.width, config.window.height)
        .with_frame_limit(300);
    let mut engine = Engine::new(config, window, RecordingBackend::new())?;
    let mut scene = build_scene(engine.api_mut())?;
    engine.run(&mut scene)?;

    log::info!(
        "Presented {} frames, {} list commands replayed, final title '{}'",
        engine.window().frames_presented(),
        engine.api().replayed_command_count(),
        engine.window().title()
    );
    Ok(())
}

fn main() -> Result<(), AppError> {
    let config = EngineConfig::load_or_default(CONFIG_PATH)?;
    logging::init(&config.logging);

    log::info!("Starting rocket demo...");
    run(config)?;
    log::info!("Rocket demo finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_assets_resolve_from_manifest_dir() {
        let config = EngineConfig::load_from_file(CONFIG_PATH).unwrap();
        assert_eq!(config.window.title, "Rocket");
        assert!(config.validate().is_ok());

        let mesh = ObjLoader::load_obj(ROCKET_MESH).unwrap();
        assert_eq!(mesh.faces.len(), 9);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_scene_builds_with_fallback_texture() {
        let mut api = RecordingBackend::new();
        let scene = build_scene(&mut api).unwrap();

        assert_eq!(scene.len(), 2);
        assert_eq!(api.compiled_list_count(), 1);
        assert_eq!(api.texture_count(), 1);
    }

    #[test]
    fn test_failed_scene_build_frees_mesh() {
        let mut api = RecordingBackend::new().with_texture_capacity(0);

        assert!(build_scene(&mut api).is_err());
        assert_eq!(api.compiled_list_count(), 0);
        assert_eq!(api.texture_count(), 0);
    }
}
