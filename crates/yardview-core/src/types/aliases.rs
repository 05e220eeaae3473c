//! Type aliases for the shared handles used across the scene engine.
//!
//! The engine runs entirely on the GTK main thread, so state that several
//! signal closures need (pipeline, controller, render loop) is passed around
//! as explicit `Rc<RefCell<T>>` handles. Naming them keeps closure captures
//! readable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use yardview_core::types::*;
//!
//! let controller: Shared<SceneController> = shared(SceneController::new(config, bus));
//! let on_click: UiCallback = shared_none();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// # Example
/// ```rust,ignore
/// let state: Shared<SceneState> = shared(SceneState::default());
/// state.borrow_mut().selection.clear();
/// ```
pub type Shared<T> = Rc<RefCell<T>>;

/// An optional shared reference, for lazily-installed state such as
/// callbacks registered after a widget is built.
pub type SharedOption<T> = Rc<RefCell<Option<T>>>;

/// A shared vector for single-threaded collection management.
pub type SharedVec<T> = Rc<RefCell<Vec<T>>>;

/// A callback that receives a single parameter.
pub type DataCallback<T> = Box<dyn Fn(T) + Send + Sync>;

/// A UI callback stored in RefCell for GTK signal handlers.
pub type UiCallback = Rc<RefCell<Option<Box<dyn Fn()>>>>;

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Create a new `SharedOption<T>` initialized to `None`.
#[inline]
pub fn shared_none<T>() -> SharedOption<T> {
    Rc::new(RefCell::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_creation() {
        let value: Shared<i32> = shared(42);
        assert_eq!(*value.borrow(), 42);

        *value.borrow_mut() = 100;
        assert_eq!(*value.borrow(), 100);
    }

    #[test]
    fn test_shared_option() {
        let opt: SharedOption<String> = shared_none();
        assert!(opt.borrow().is_none());

        *opt.borrow_mut() = Some("label".to_string());
        assert_eq!(opt.borrow().as_deref(), Some("label"));
        assert_eq!(opt.borrow_mut().take().as_deref(), Some("label"));
        assert!(opt.borrow().is_none());
    }

    #[test]
    fn test_ui_callback() {
        let callback: UiCallback = shared_none();
        let calls: SharedVec<u32> = shared(Vec::new());
        let calls_clone = calls.clone();

        *callback.borrow_mut() = Some(Box::new(move || {
            let n = calls_clone.borrow().len() as u32;
            calls_clone.borrow_mut().push(n);
        }));

        if let Some(ref cb) = *callback.borrow() {
            cb();
            cb();
        }

        assert_eq!(*calls.borrow(), vec![0, 1]);
    }
}
