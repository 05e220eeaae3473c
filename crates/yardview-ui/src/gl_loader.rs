//! GL entry points for glow, resolved through libepoxy (what GTK itself
//! uses) with libGL as a fallback.

use libloading::Library;
use std::ffi::{c_void, CString};
use std::sync::OnceLock;

struct GlLibraries {
    epoxy: Option<Library>,
    gl: Option<Library>,
}

static LIBRARIES: OnceLock<GlLibraries> = OnceLock::new();

fn open_first(names: &[&str]) -> Option<Library> {
    names
        .iter()
        .find_map(|name| unsafe { Library::new(name) }.ok())
}

fn libraries() -> &'static GlLibraries {
    LIBRARIES.get_or_init(|| {
        let libs = GlLibraries {
            epoxy: open_first(&["libepoxy.so.0", "libepoxy.so"]),
            gl: open_first(&["libGL.so.1", "libGL.so"]),
        };
        if libs.epoxy.is_none() && libs.gl.is_none() {
            tracing::error!("neither libepoxy nor libGL could be loaded");
        }
        libs
    })
}

fn symbol(lib: &Library, name: &CString) -> Option<*const c_void> {
    unsafe { lib.get::<*const c_void>(name.as_bytes_with_nul()) }
        .ok()
        .map(|sym| *sym)
        .filter(|ptr| !ptr.is_null())
}

/// Loader function handed to `glow::Context::from_loader_function`.
pub(crate) fn load_gl_func(name: &str) -> *const c_void {
    let Ok(c_name) = CString::new(name) else {
        return std::ptr::null();
    };
    let libs = libraries();

    if let Some(epoxy) = libs.epoxy.as_ref() {
        let get_proc_addr = unsafe {
            epoxy.get::<unsafe extern "C" fn(*const std::ffi::c_char) -> *const c_void>(
                b"epoxy_get_proc_addr\0",
            )
        };
        if let Ok(get_proc_addr) = get_proc_addr {
            let ptr = unsafe { get_proc_addr(c_name.as_ptr()) };
            if !ptr.is_null() {
                return ptr;
            }
        }
        if let Some(ptr) = symbol(epoxy, &c_name) {
            return ptr;
        }
    }

    libs.gl
        .as_ref()
        .and_then(|gl| symbol(gl, &c_name))
        .unwrap_or(std::ptr::null())
}
