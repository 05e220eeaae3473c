//! # YardView UI
//!
//! GTK4/libadwaita shell around the scene engine: the GL viewport with its
//! pointer controls, the annotation label overlay, and the window chrome
//! for layers, color modes, focus and undo/redo.

pub mod app;
mod gl_loader;
pub mod label_layer;
mod pointer;
pub mod scene_view;
pub mod snapshot;

pub use app::{run, AppOptions, APP_ID};
pub use label_layer::LabelLayer;
pub use scene_view::SceneView;
pub use snapshot::SceneSnapshot;
