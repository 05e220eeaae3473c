//! # Event Bus Module
//!
//! Publish/subscribe channel between the scene engine and the rest of the
//! dashboard (sidebars, property panels, toasts).
//!
//! ## Overview
//!
//! - The engine publishes typed [`SceneEvent`]s without knowing who listens
//! - Subscribers filter by [`EventCategory`] and are called synchronously
//! - There is no global instance; the application creates one [`EventBus`]
//!   and shares it with the scene controller
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use yardview_core::event_bus::{EventBus, EventCategory, EventFilter, SceneEvent};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Selection]),
//!     |event| {
//!         if let SceneEvent::SelectionChanged { selection } = event {
//!             tracing::info!(?selection, "selection updated");
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
