//! Integration tests for the engine frame loop
//!
//! Frame ordering, delta-time measurement, title updates, deferred scene
//! commands and resource release on exit.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::assets::ObjLoader;
use crate::core::config::{EngineConfig, WindowConfig};
use crate::engine::{Engine, EngineError};
use crate::foundation::math::Vec3;
use crate::render::api::{Capability, ClearFlags, LightSlot};
use crate::render::window::HeadlessWindow;
use crate::render::{DrawEvent, Mesh, RecordingBackend, WindowSurface};
use crate::scene::{BehaviorError, Camera, Entity, Light, Scene, SceneObject, Transform};

/// Window whose clock is read from a script and which closes after a fixed
/// number of presented frames
struct ScriptedWindow {
    times: RefCell<VecDeque<f64>>,
    last_time: RefCell<f64>,
    frames_left: u32,
    title: String,
    size: (u32, u32),
}

impl ScriptedWindow {
    fn new(frames: u32, times: &[f64]) -> Self {
        Self {
            times: RefCell::new(times.iter().copied().collect()),
            last_time: RefCell::new(0.0),
            frames_left: frames,
            title: String::new(),
            size: (320, 200),
        }
    }
}

impl WindowSurface for ScriptedWindow {
    fn should_close(&self) -> bool {
        self.frames_left == 0
    }

    fn set_should_close(&mut self, should_close: bool) {
        if should_close {
            self.frames_left = 0;
        }
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn time(&self) -> f64 {
        let next = self.times.borrow_mut().pop_front();
        match next {
            Some(time) => {
                *self.last_time.borrow_mut() = time;
                time
            }
            None => *self.last_time.borrow(),
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn swap_buffers(&mut self) {
        self.frames_left = self.frames_left.saturating_sub(1);
    }

    fn poll_events(&mut self) {}
}

fn config(title: &str) -> EngineConfig {
    EngineConfig::default().with_window(WindowConfig::new(title, 320, 200))
}

fn camera() -> SceneObject {
    SceneObject::camera(
        Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
        Camera::frustum(0.01, 1000.0).unwrap(),
    )
}

fn triangle(api: &mut RecordingBackend) -> SceneObject {
    let data = ObjLoader::parse_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nf 1/1 2/1 3/1\n").unwrap();
    let mesh = Mesh::new(data, api).unwrap();
    let entity = Entity::new(mesh, None, api).unwrap();
    SceneObject::entity(Transform::default(), entity)
}

type Log = Rc<RefCell<Vec<String>>>;

fn logged(name: &'static str, log: &Log, object: SceneObject) -> SceneObject {
    let start_log = log.clone();
    let update_log = log.clone();
    object
        .with_start(move |_| {
            start_log.borrow_mut().push(format!("start {}", name));
            Ok(())
        })
        .with_update(move |_, _| {
            update_log.borrow_mut().push(format!("update {}", name));
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_start_then_update_in_scene_order() {
        let log: Log = Rc::default();
        let mut engine = Engine::new(
            config("order"),
            HeadlessWindow::new("order", 320, 200).with_frame_limit(2),
            RecordingBackend::new(),
        )
        .unwrap();

        let first = logged("a", &log, SceneObject::empty(Transform::default()));
        let second = logged("b", &log, SceneObject::empty(Transform::default()));
        let mut scene = Scene::new([0.0; 4], logged("camera", &log, camera()), vec![first, second]).unwrap();

        engine.run(&mut scene).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "start camera",
                "start a",
                "start b",
                "update camera",
                "update a",
                "update b",
                "update camera",
                "update a",
                "update b",
            ]
        );
        assert_eq!(engine.frame_count(), 2);
    }

    #[test]
    fn test_frame_emits_clear_camera_then_objects() {
        let mut engine = Engine::new(
            config("frame"),
            HeadlessWindow::new("frame", 320, 200).with_frame_limit(1),
            RecordingBackend::new(),
        )
        .unwrap();
        assert!(engine.api().is_enabled(Capability::Lighting));

        let sun = SceneObject::light(Transform::default(), Light::directional(LightSlot::Light0, [1.0; 4]));
        let rocket = triangle(engine.api_mut());
        let mut scene = Scene::new([1.0, 1.0, 1.0, 1.0], camera(), vec![sun, rocket]).unwrap();
        engine.api_mut().take_events();

        engine.run(&mut scene).unwrap();
        let events = engine.api().events().to_vec();

        assert_eq!(
            events[0],
            DrawEvent::Viewport {
                x: 0,
                y: 0,
                width: 320,
                height: 200
            }
        );
        assert_eq!(events[1], DrawEvent::Clear(ClearFlags::COLOR | ClearFlags::DEPTH));
        assert_eq!(events[2], DrawEvent::ClearColor([1.0, 1.0, 1.0, 1.0]));
        // Camera draws nothing visible, then flushes
        assert_eq!(events[3], DrawEvent::Flush);

        let enable_light = events
            .iter()
            .position(|e| *e == DrawEvent::EnableLight(LightSlot::Light0))
            .unwrap();
        let call_list = events
            .iter()
            .position(|e| matches!(e, DrawEvent::CallList { .. }))
            .unwrap();
        assert!(enable_light < call_list);
        assert_eq!(events.iter().filter(|e| **e == DrawEvent::Flush).count(), 3);
        assert_eq!(events.last(), Some(&DrawEvent::Flush));

        match &events[call_list] {
            DrawEvent::CallList { projection, .. } => assert!(projection[(0, 0)] != 0.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_delta_time_is_measured_and_floored() {
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let seen = deltas.clone();
        // Two clock reads per frame: begin and end
        let window = ScriptedWindow::new(3, &[0.0, 0.002, 1.0, 1.010, 2.0, 2.5]);
        let mut engine = Engine::new(config("Demo"), window, RecordingBackend::new()).unwrap();

        let probe = SceneObject::empty(Transform::default()).with_update(move |_, dt| {
            seen.borrow_mut().push(dt);
            Ok(())
        });
        let mut scene = Scene::new([0.0; 4], camera(), vec![probe]).unwrap();
        engine.run(&mut scene).unwrap();

        let deltas = deltas.borrow();
        assert_eq!(deltas.len(), 3);
        assert_relative_eq!(deltas[0], 0.005);
        assert_relative_eq!(deltas[1], 0.005);
        assert_relative_eq!(deltas[2], 0.010, epsilon = 1e-5);

        assert_relative_eq!(engine.delta_time(), 0.5);
        assert_eq!(engine.fps(), 2);
        assert_eq!(engine.window().title, "Demo 2");
    }

    #[test]
    fn test_title_left_alone_when_fps_readout_disabled() {
        let mut config = config("Quiet");
        config.window.show_fps_in_title = false;
        let window = HeadlessWindow::new("Quiet", 320, 200).with_frame_limit(1);
        let mut engine = Engine::new(config, window, RecordingBackend::new()).unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();

        engine.run(&mut scene).unwrap();
        assert_eq!(engine.window().title(), "Quiet");
    }

    #[test]
    fn test_resources_released_on_exit() {
        let mut engine = Engine::new(
            config("exit"),
            HeadlessWindow::new("exit", 320, 200).with_frame_limit(3),
            RecordingBackend::new(),
        )
        .unwrap();
        let objects = vec![triangle(engine.api_mut()), triangle(engine.api_mut())];
        let mut scene = Scene::new([0.0; 4], camera(), objects).unwrap();
        assert_eq!(engine.api().compiled_list_count(), 2);

        engine.run(&mut scene).unwrap();

        assert_eq!(engine.api().compiled_list_count(), 0);
        assert_eq!(engine.api().texture_count(), 0);
        assert_eq!(engine.window().frames_presented(), 3);
    }

    #[test]
    fn test_behaviour_error_stops_loop_and_still_releases() {
        let mut engine = Engine::new(
            config("fail"),
            HeadlessWindow::new("fail", 320, 200).with_frame_limit(10),
            RecordingBackend::new(),
        )
        .unwrap();
        let broken = triangle(engine.api_mut()).with_update(|_, _| Err(BehaviorError::failed("engine stalled")));
        let mut scene = Scene::new([0.0; 4], camera(), vec![broken]).unwrap();

        let err = engine.run(&mut scene).unwrap_err();
        assert!(matches!(err, EngineError::Behavior(BehaviorError::Failed(ref m)) if m == "engine stalled"));
        assert_eq!(engine.window().frames_presented(), 0);
        assert_eq!(engine.api().compiled_list_count(), 0);
        assert_eq!(engine.api().texture_count(), 0);
    }

    #[test]
    fn test_self_destroy_applies_after_frame() {
        let mut engine = Engine::new(
            config("destroy"),
            HeadlessWindow::new("destroy", 320, 200).with_frame_limit(3),
            RecordingBackend::new(),
        )
        .unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();
        let commands = scene.commands();
        let doomed = triangle(engine.api_mut()).with_update(move |this, _| {
            commands.destroy(this.id());
            Ok(())
        });
        scene.instantiate(doomed);
        engine.api_mut().take_events();

        engine.run(&mut scene).unwrap();

        assert!(scene.is_empty());
        let draws = engine
            .api()
            .events()
            .iter()
            .filter(|e| matches!(e, DrawEvent::CallList { .. }))
            .count();
        assert_eq!(draws, 1);
        assert_eq!(engine.api().compiled_list_count(), 0);
    }

    #[test]
    fn test_failing_command_releases_queued_spawns() {
        let mut engine = Engine::new(
            config("queue"),
            HeadlessWindow::new("queue", 320, 200).with_frame_limit(5),
            RecordingBackend::new(),
        )
        .unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();

        let commands = scene.commands();
        let stray = SceneObject::empty(Transform::default()).id();
        let mut spawn = Some(triangle(engine.api_mut()));
        let spawner = SceneObject::empty(Transform::default()).with_update(move |_, _| {
            commands.destroy(stray);
            if let Some(object) = spawn.take() {
                commands.instantiate(object);
            }
            Ok(())
        });
        scene.instantiate(spawner);

        let err = engine.run(&mut scene).unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
        assert_eq!(engine.window().frames_presented(), 1);
        assert_eq!(engine.api().compiled_list_count(), 0);
        assert_eq!(engine.api().texture_count(), 0);
    }

    #[test]
    fn test_frame_error_releases_commands_queued_that_frame() {
        let mut engine = Engine::new(
            config("abort"),
            HeadlessWindow::new("abort", 320, 200).with_frame_limit(5),
            RecordingBackend::new(),
        )
        .unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();

        let commands = scene.commands();
        let mut spawn = Some(triangle(engine.api_mut()));
        let spawner = SceneObject::empty(Transform::default()).with_update(move |_, _| {
            if let Some(object) = spawn.take() {
                commands.instantiate(object);
            }
            Err(BehaviorError::failed("spawner jammed"))
        });
        scene.instantiate(spawner);

        assert!(matches!(engine.run(&mut scene), Err(EngineError::Behavior(_))));
        assert!(scene.commands().is_empty());
        assert_eq!(engine.api().compiled_list_count(), 0);
        assert_eq!(engine.api().texture_count(), 0);
    }

    #[test]
    fn test_objects_spawned_mid_frame_start_before_next_update() {
        let log: Log = Rc::default();
        let mut engine = Engine::new(
            config("spawn"),
            HeadlessWindow::new("spawn", 320, 200).with_frame_limit(2),
            RecordingBackend::new(),
        )
        .unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();

        let commands = scene.commands();
        let child_log = log.clone();
        let mut spawned = false;
        let spawner = SceneObject::empty(Transform::default()).with_update(move |_, _| {
            if !spawned {
                spawned = true;
                commands.instantiate(logged("child", &child_log, SceneObject::empty(Transform::default())));
            }
            Ok(())
        });
        scene.instantiate(spawner);

        engine.run(&mut scene).unwrap();

        assert_eq!(scene.len(), 2);
        assert_eq!(*log.borrow(), vec!["start child", "update child"]);
    }

    #[test]
    fn test_resize_reaches_camera_and_viewport() {
        let mut engine = Engine::new(
            config("resize"),
            HeadlessWindow::new("resize", 320, 200).with_frame_limit(2),
            RecordingBackend::new(),
        )
        .unwrap();
        let mut scene = Scene::new([0.0; 4], camera(), Vec::new()).unwrap();

        engine.step(&mut scene).unwrap();
        engine.window_mut().resize(800, 400);
        engine.step(&mut scene).unwrap();

        assert_eq!(engine.api().current_viewport(), (0, 0, 800, 400));
        let camera = scene.camera_mut().as_camera_mut().unwrap();
        assert_eq!(camera.viewport(), (800, 400));
        assert_relative_eq!(camera.aspect_ratio(), 2.0);
    }
}
