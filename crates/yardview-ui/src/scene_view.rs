//! The 3D viewport widget: a GLArea driving the scene pipeline, with the
//! annotation label layer overlaid on top.

use std::cell::Cell;
use std::rc::Rc;

use gtk4::gdk::ModifierType;
use gtk4::prelude::*;
use gtk4::{
    EventController, EventControllerMotion, EventControllerScroll, EventControllerScrollFlags,
    GLArea, GestureClick, GestureDrag, Overlay, TickCallbackId,
};
use yardview_core::{shared, shared_none, SceneError, Shared, SharedVec, UiCallback};
use yardview_scene::{Compositor, GlCompositor, SceneController, Viewport};

use crate::gl_loader::load_gl_func;
use crate::label_layer::LabelLayer;
use crate::pointer::DragTracker;

const MULTI_SELECT_MASK: ModifierType = ModifierType::CONTROL_MASK.union(ModifierType::META_MASK);

fn create_compositor() -> yardview_core::Result<Box<dyn Compositor>> {
    let gl = unsafe { glow::Context::from_loader_function(load_gl_func) };
    let compositor = GlCompositor::new(Rc::new(gl))?;
    Ok(Box::new(compositor))
}

#[derive(Clone)]
pub struct SceneView {
    overlay: Overlay,
    gl_area: GLArea,
    controller: Shared<SceneController>,
    on_interaction: UiCallback,
    input_controllers: SharedVec<EventController>,
}

impl SceneView {
    pub fn new(controller: Shared<SceneController>) -> Self {
        let gl_area = GLArea::builder().hexpand(true).vexpand(true).build();
        gl_area.set_required_version(3, 3);
        gl_area.set_focusable(true);

        let labels = shared(LabelLayer::new());
        let overlay = Overlay::new();
        overlay.set_child(Some(&gl_area));
        overlay.add_overlay(labels.borrow().widget());

        let view = Self {
            overlay,
            gl_area,
            controller,
            on_interaction: shared_none(),
            input_controllers: shared(Vec::new()),
        };
        view.connect_gl(labels);
        view
    }

    pub fn widget(&self) -> &Overlay {
        &self.overlay
    }

    pub fn controller(&self) -> &Shared<SceneController> {
        &self.controller
    }

    pub fn queue_render(&self) {
        self.gl_area.queue_render();
    }

    /// Called after every resolved click, once the controller is no longer
    /// borrowed.
    pub fn connect_interaction<F: Fn() + 'static>(&self, f: F) {
        *self.on_interaction.borrow_mut() = Some(Box::new(f));
    }

    fn connect_gl(&self, labels: Shared<LabelLayer>) {
        let setup_failed = Rc::new(Cell::new(false));

        // Input and the frame tick are attached on every realize and removed
        // on unrealize, so a remounted view comes back fully interactive.
        let tick = shared_none::<TickCallbackId>();
        let controller_realize = self.controller.clone();
        let on_interaction = self.on_interaction.clone();
        let inputs_realize = self.input_controllers.clone();
        let tick_realize = tick.clone();
        let setup_failed_realize = setup_failed.clone();
        self.gl_area.connect_realize(move |area| {
            setup_failed_realize.set(false);
            attach_inputs(area, &controller_realize, &on_interaction, &inputs_realize);
            // Keep frames coming while the widget lives; damping needs them.
            let id = area.add_tick_callback(|area, _clock| {
                area.queue_render();
                glib::ControlFlow::Continue
            });
            if let Some(previous) = tick_realize.borrow_mut().replace(id) {
                previous.remove();
            }
        });

        let controller_render = self.controller.clone();
        let labels_render = labels.clone();
        self.gl_area.connect_render(move |area, _ctx| {
            if let Some(err) = area.error() {
                tracing::error!(error = %err, "GLArea error");
                return glib::Propagation::Stop;
            }

            let mut controller = controller_render.borrow_mut();
            if !controller.pipeline().is_initialized() {
                if setup_failed.get() {
                    return glib::Propagation::Stop;
                }
                let viewport =
                    Viewport::with_scale(area.width(), area.height(), area.scale_factor());
                if controller.setup(create_compositor, viewport).is_err() {
                    setup_failed.set(true);
                    return glib::Propagation::Stop;
                }
            }

            match controller.tick() {
                Ok(_) => {}
                Err(SceneError::NotInitialized) => {}
                Err(e) => tracing::warn!(error = %e, "frame failed"),
            }
            labels_render.borrow_mut().sync(controller.pipeline().labels());
            glib::Propagation::Stop
        });

        let controller_resize = self.controller.clone();
        self.gl_area.connect_resize(move |area, _width, _height| {
            controller_resize
                .borrow_mut()
                .resize(area.width(), area.height(), area.scale_factor());
        });

        // GL objects must be released while the context is still current
        let controller_unrealize = self.controller.clone();
        let input_controllers = self.input_controllers.clone();
        self.gl_area.connect_unrealize(move |area| {
            if let Some(id) = tick.borrow_mut().take() {
                id.remove();
            }
            for input in input_controllers.borrow_mut().drain(..) {
                area.remove_controller(&input);
            }
            area.make_current();
            if let Some(err) = area.error() {
                tracing::warn!(error = %err, "releasing scene without a current GL context");
            }
            controller_unrealize.borrow_mut().teardown();
            labels.borrow_mut().clear();
        });
    }
}

fn add_input(
    area: &GLArea,
    registered: &SharedVec<EventController>,
    input: impl IsA<EventController>,
) {
    area.add_controller(input.clone());
    registered.borrow_mut().push(input.upcast());
}

fn attach_inputs(
    area: &GLArea,
    controller: &Shared<SceneController>,
    on_interaction: &UiCallback,
    registered: &SharedVec<EventController>,
) {
    let tracker = Rc::new(Cell::new(DragTracker::default()));

    // Selection resolves on release, and only when the press did not orbit
    let click = GestureClick::new();
    click.set_button(gtk4::gdk::BUTTON_PRIMARY);
    let controller_click = controller.clone();
    let on_interaction = on_interaction.clone();
    let tracker_click = tracker.clone();
    let gl_area_click = area.clone();
    click.connect_released(move |gesture, n_press, x, y| {
        if n_press != 1 || tracker_click.get().dragged() {
            return;
        }
        gl_area_click.grab_focus();
        let multi_select = gesture.current_event_state().intersects(MULTI_SELECT_MASK);
        let resolution =
            controller_click
                .borrow_mut()
                .pointer_click(x as f32, y as f32, multi_select);
        tracing::debug!(tag = ?resolution.tag, multi_select, "scene click");

        if let Some(ref callback) = *on_interaction.borrow() {
            callback();
        }
        gl_area_click.queue_render();
    });
    add_input(area, registered, click);

    let motion = EventControllerMotion::new();
    let controller_motion = controller.clone();
    let gl_area_motion = area.clone();
    motion.connect_motion(move |_, x, y| {
        if controller_motion
            .borrow_mut()
            .pointer_move(x as f32, y as f32)
        {
            gl_area_motion.queue_render();
        }
    });
    let controller_leave = controller.clone();
    let gl_area_leave = area.clone();
    motion.connect_leave(move |_| {
        if controller_leave.borrow_mut().pointer_leave() {
            gl_area_leave.queue_render();
        }
    });
    add_input(area, registered, motion);

    // Drag orbits; Shift-drag pans.
    let drag = GestureDrag::new();
    let tracker_begin = tracker.clone();
    drag.connect_drag_begin(move |_, _, _| {
        let mut state = tracker_begin.get();
        state.begin();
        tracker_begin.set(state);
    });

    let controller_drag = controller.clone();
    let gl_area_drag = area.clone();
    drag.connect_drag_update(move |gesture, dx, dy| {
        let mut state = tracker.get();
        let (delta_x, delta_y) = state.update(dx, dy);
        tracker.set(state);

        let is_shift = gesture
            .current_event()
            .is_some_and(|event| event.modifier_state().contains(ModifierType::SHIFT_MASK));

        let mut controller = controller_drag.borrow_mut();
        if is_shift {
            controller.pipeline_mut().pan(delta_x, delta_y);
        } else {
            controller
                .pipeline_mut()
                .controls_mut()
                .rotate(delta_x, delta_y);
        }
        gl_area_drag.queue_render();
    });
    add_input(area, registered, drag);

    let scroll = EventControllerScroll::new(EventControllerScrollFlags::VERTICAL);
    let controller_scroll = controller.clone();
    let gl_area_scroll = area.clone();
    scroll.connect_scroll(move |_controller, _dx, dy| {
        controller_scroll
            .borrow_mut()
            .pipeline_mut()
            .controls_mut()
            .zoom(dy as f32);
        gl_area_scroll.queue_render();
        glib::Propagation::Stop
    });
    add_input(area, registered, scroll);
}
