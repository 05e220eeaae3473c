use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::prelude::*;
use gtk4::{
    ApplicationWindow, Box, Button, CheckButton, CssProvider, DropDown, HeaderBar, Label,
    MenuButton, Orientation, Popover,
};
use libadwaita::Application as AdwApplication;
use yardview_core::{shared, EventBus, EventCategory, EventFilter, SceneEvent, Shared};
use yardview_scene::{ColorMode, SceneController};
use yardview_settings::SceneConfig;

use crate::scene_view::SceneView;
use crate::snapshot::SceneSnapshot;

pub const APP_ID: &str = "io.github.yardview.YardView";

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Plant snapshot to show on startup.
    pub snapshot: Option<PathBuf>,
    /// Overrides the per-user config file.
    pub config: Option<PathBuf>,
}

pub fn run(options: AppOptions) -> glib::ExitCode {
    let app = AdwApplication::builder().application_id(APP_ID).build();

    app.connect_startup(|_| {
        load_css();
    });

    app.connect_activate(move |app| {
        build_window(app, &options);
    });

    // Command-line parsing happens in main
    app.run_with_args::<&str>(&[])
}

fn load_config(options: &AppOptions) -> SceneConfig {
    let path = options
        .config
        .clone()
        .or_else(|| match SceneConfig::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "no config directory, using defaults");
                None
            }
        });
    path.map(|p| SceneConfig::load_or_default(&p))
        .unwrap_or_default()
}

fn build_controller(options: &AppOptions) -> SceneController {
    let bus = Arc::new(EventBus::new());
    bus.subscribe(
        EventFilter::Categories(vec![
            EventCategory::Selection,
            EventCategory::Camera,
            EventCategory::Layers,
            EventCategory::Scene,
        ]),
        |event| tracing::debug!(?event, "scene event"),
    );
    bus.subscribe(EventFilter::All, |event| {
        if let SceneEvent::PipelineFailed { message } = event {
            tracing::error!(%message, "3D view unavailable");
        }
    });

    let mut controller = SceneController::new(load_config(options), bus);
    if let Some(path) = options.snapshot.as_deref() {
        match SceneSnapshot::load(path) {
            Ok(snapshot) => {
                if let Some(layers) = snapshot.layers {
                    controller.set_layers(layers);
                }
                controller.set_annotations(snapshot.annotations);
                controller.set_equipment(snapshot.equipment);
            }
            Err(e) => tracing::error!(error = %e, "snapshot not loaded"),
        }
    }
    controller
}

/// Widgets whose state mirrors the controller after every command.
struct Chrome {
    undo: gio::SimpleAction,
    redo: gio::SimpleAction,
    layer_checks: Vec<(String, CheckButton)>,
}

impl Chrome {
    fn refresh(&self, controller: &Shared<SceneController>) {
        let (can_undo, can_redo, layers) = {
            let controller = controller.borrow();
            let layers: Vec<bool> = self
                .layer_checks
                .iter()
                .map(|(id, _)| controller.state().layers().is_visible(id).unwrap_or(false))
                .collect();
            (controller.can_undo(), controller.can_redo(), layers)
        };
        self.undo.set_enabled(can_undo);
        self.redo.set_enabled(can_redo);
        for ((_, check), visible) in self.layer_checks.iter().zip(layers) {
            if check.is_active() != visible {
                check.set_active(visible);
            }
        }
    }
}

fn build_window(app: &AdwApplication, options: &AppOptions) {
    let controller = shared(build_controller(options));
    let view = SceneView::new(controller.clone());

    let window = ApplicationWindow::builder()
        .application(app)
        .title("YardView")
        .default_width(1280)
        .default_height(800)
        .build();

    let header = HeaderBar::new();
    window.set_titlebar(Some(&header));

    let edit_menu = gio::Menu::new();
    edit_menu.append(Some("Undo"), Some("app.edit_undo"));
    edit_menu.append(Some("Redo"), Some("app.edit_redo"));
    let view_menu = gio::Menu::new();
    view_menu.append(Some("Reset View"), Some("app.view_reset"));
    let menu = gio::Menu::new();
    menu.append_section(None, &edit_menu);
    menu.append_section(None, &view_menu);
    let menu_button = MenuButton::builder()
        .icon_name("open-menu-symbolic")
        .menu_model(&menu)
        .build();
    header.pack_end(&menu_button);

    // Color mode
    let mode_labels: Vec<&str> = ColorMode::ALL.iter().map(|m| m.label()).collect();
    let mode_dropdown = DropDown::from_strings(&mode_labels);
    let current_mode = controller.borrow().color_mode();
    if let Some(index) = ColorMode::ALL.iter().position(|m| *m == current_mode) {
        mode_dropdown.set_selected(index as u32);
    }
    mode_dropdown.set_tooltip_text(Some("Color mode"));
    header.pack_start(&mode_dropdown);

    // Layers
    let layer_box = Box::new(Orientation::Vertical, 4);
    layer_box.add_css_class("layer-panel");
    let layer_checks: Vec<(String, CheckButton)> = controller
        .borrow()
        .state()
        .layers()
        .iter()
        .map(|layer| {
            let check = CheckButton::with_label(&layer.name);
            check.set_active(layer.visible);
            layer_box.append(&check);
            (layer.id.clone(), check)
        })
        .collect();
    let layer_popover = Popover::new();
    layer_popover.set_child(Some(&layer_box));
    let layer_button = MenuButton::builder()
        .label("Layers")
        .popover(&layer_popover)
        .build();
    header.pack_start(&layer_button);

    // Focus on a system
    let systems = controller.borrow().systems();
    let system_refs: Vec<&str> = systems.iter().map(String::as_str).collect();
    let system_dropdown = DropDown::from_strings(&system_refs);
    system_dropdown.set_sensitive(!systems.is_empty());
    let focus_button = Button::with_label("Focus");
    focus_button.set_sensitive(!systems.is_empty());
    let focus_box = Box::new(Orientation::Horizontal, 4);
    focus_box.append(&Label::new(Some("System")));
    focus_box.append(&system_dropdown);
    focus_box.append(&focus_button);
    header.pack_end(&focus_box);

    let undo_action = gio::SimpleAction::new("edit_undo", None);
    let redo_action = gio::SimpleAction::new("edit_redo", None);
    let reset_action = gio::SimpleAction::new("view_reset", None);

    let chrome = Rc::new(Chrome {
        undo: undo_action.clone(),
        redo: redo_action.clone(),
        layer_checks,
    });
    chrome.refresh(&controller);

    {
        let chrome = chrome.clone();
        let controller = controller.clone();
        view.connect_interaction(move || chrome.refresh(&controller));
    }

    for (id, check) in &chrome.layer_checks {
        let id = id.clone();
        let controller = controller.clone();
        let chrome_toggle = Rc::downgrade(&chrome);
        let view = view.clone();
        check.connect_toggled(move |check| {
            let changed = {
                let mut controller = controller.borrow_mut();
                let visible = controller.state().layers().is_visible(&id);
                visible != Some(check.is_active()) && controller.toggle_layer(&id)
            };
            if changed {
                if let Some(chrome) = chrome_toggle.upgrade() {
                    chrome.refresh(&controller);
                }
                view.queue_render();
            }
        });
    }

    {
        let controller = controller.clone();
        let view = view.clone();
        mode_dropdown.connect_selected_notify(move |dropdown| {
            let Some(mode) = ColorMode::ALL.get(dropdown.selected() as usize).copied() else {
                return;
            };
            controller.borrow_mut().set_color_mode(mode);
            view.queue_render();
        });
    }

    {
        let controller = controller.clone();
        let chrome = chrome.clone();
        let view = view.clone();
        focus_button.connect_clicked(move |_| {
            let Some(system) = systems.get(system_dropdown.selected() as usize) else {
                return;
            };
            controller.borrow_mut().focus_system(system, |framed| {
                if !framed {
                    tracing::info!(%system, "nothing visible to frame");
                }
            });
            chrome.refresh(&controller);
            view.queue_render();
        });
    }

    {
        let controller = controller.clone();
        let chrome = chrome.clone();
        let view = view.clone();
        undo_action.connect_activate(move |_, _| {
            let undone = controller.borrow_mut().undo();
            if undone {
                chrome.refresh(&controller);
                view.queue_render();
            }
        });
    }
    {
        let controller = controller.clone();
        let chrome = chrome.clone();
        let view = view.clone();
        redo_action.connect_activate(move |_, _| {
            let redone = controller.borrow_mut().redo();
            if redone {
                chrome.refresh(&controller);
                view.queue_render();
            }
        });
    }
    {
        let controller = controller.clone();
        let chrome = chrome.clone();
        let view = view.clone();
        reset_action.connect_activate(move |_, _| {
            let initial = controller.borrow().config().camera.initial;
            if controller.borrow_mut().move_camera(initial) {
                chrome.refresh(&controller);
                view.queue_render();
            }
        });
    }
    app.add_action(&undo_action);
    app.add_action(&redo_action);
    app.add_action(&reset_action);

    app.set_accels_for_action("app.edit_undo", &["<Control>z"]);
    app.set_accels_for_action("app.edit_redo", &["<Control>y", "<Control><Shift>z"]);
    app.set_accels_for_action("app.view_reset", &["Home"]);

    window.set_child(Some(view.widget()));
    window.present();
}

fn load_css() {
    let provider = CssProvider::new();
    provider.load_from_data(include_str!("style.css"));

    match gtk4::gdk::Display::default() {
        Some(display) => gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => tracing::warn!("no display, scene styles not applied"),
    }
}
