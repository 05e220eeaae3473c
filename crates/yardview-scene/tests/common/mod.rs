#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use yardview_core::{
    Equipment, EquipmentType, EventBus, EventFilter, Result, Rgb, SceneEvent, ShapeParams,
};
use yardview_scene::{Compositor, Frame, ResourceEvent};

pub fn tank(tag: &str, position: [f32; 3]) -> Equipment {
    Equipment::new(
        tag,
        EquipmentType::Tank,
        position,
        ShapeParams::Cylinder {
            radius: 3.0,
            height: 5.0,
        },
        Rgb::from_bytes(0x4F, 0xC3, 0xF7),
    )
}

pub fn building(tag: &str, position: [f32; 3], size: [f32; 3]) -> Equipment {
    Equipment::new(
        tag,
        EquipmentType::Building,
        position,
        ShapeParams::Box { size },
        Rgb::from_bytes(0x90, 0xA4, 0xAE),
    )
}

pub fn valve(tag: &str, position: [f32; 3]) -> Equipment {
    Equipment::new(
        tag,
        EquipmentType::Valve,
        position,
        ShapeParams::Sphere { radius: 0.5 },
        Rgb::from_bytes(0xFF, 0x70, 0x43),
    )
}

/// A small plant: two tanks and a valve on "cooling", one building on "admin".
pub fn plant() -> Vec<Equipment> {
    vec![
        tank("T1", [0.0, 2.5, 0.0]).with_system("cooling"),
        tank("T2", [12.0, 2.5, 0.0]).with_system("cooling"),
        valve("V1", [6.0, 1.0, 4.0]).with_system("cooling"),
        building("B1", [-20.0, 4.0, -10.0], [10.0, 8.0, 6.0]).with_system("admin"),
    ]
}

/// Bus subscriber that keeps every event it sees.
pub fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<SceneEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bus.subscribe(EventFilter::All, move |event| sink.lock().push(event));
    events
}

#[derive(Debug, Default)]
pub struct CompositorLog {
    pub resizes: Vec<((u32, u32), (u32, u32))>,
    pub renders: usize,
    pub draws_last_frame: usize,
    pub resource_events: Vec<ResourceEvent>,
    pub outline_targets_last_frame: usize,
    pub disposed: usize,
}

/// Headless compositor that records what the pipeline asks of it.
pub struct RecordingCompositor {
    log: Arc<Mutex<CompositorLog>>,
    fail_resize: bool,
}

impl RecordingCompositor {
    pub fn new() -> (Self, Arc<Mutex<CompositorLog>>) {
        let log = Arc::new(Mutex::new(CompositorLog::default()));
        (
            Self {
                log: Arc::clone(&log),
                fail_resize: false,
            },
            log,
        )
    }

    pub fn failing_resize() -> (Self, Arc<Mutex<CompositorLog>>) {
        let (mut compositor, log) = Self::new();
        compositor.fail_resize = true;
        (compositor, log)
    }

    pub fn boxed(self) -> Box<dyn Compositor> {
        Box::new(self)
    }
}

impl Compositor for RecordingCompositor {
    fn resize(&mut self, raster: (u32, u32), outline: (u32, u32)) -> Result<()> {
        if self.fail_resize {
            return Err(yardview_core::SceneError::Framebuffer(
                "no framebuffer support".to_string(),
            ));
        }
        self.log.lock().resizes.push((raster, outline));
        Ok(())
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let mut log = self.log.lock();
        log.renders += 1;
        log.draws_last_frame = frame.draws.len();
        log.outline_targets_last_frame = frame.outline.targets.len();
        log.resource_events.extend_from_slice(frame.resource_events);
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.lock().disposed += 1;
    }
}
