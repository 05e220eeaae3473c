//! # YardView
//!
//! A 3D dashboard for industrial terminals. Equipment (tanks, pipes, valves,
//! cranes, buildings) is shown in an orbitable scene with click selection,
//! hover highlighting, layer toggles, color modes and undoable camera moves.
//!
//! ## Architecture
//!
//! 1. **yardview-core** - Equipment/layer data model, errors, event bus
//! 2. **yardview-settings** - Scene configuration loaded from TOML
//! 3. **yardview-scene** - Command history, picking, framing, mesh lifecycle,
//!    outline effect, render pipeline and render loop
//! 4. **yardview-ui** - GTK4/libadwaita window and GL viewport
//! 5. **yardview** - Main binary that wires them together

use std::path::PathBuf;

use anyhow::{bail, Context};

pub use yardview_core::{
    Annotation, CameraState, Equipment, EquipmentType, EventBus, Layer, LayerTable, Result,
    SceneError, SceneEvent,
};
pub use yardview_scene::{ColorMode, SceneController};
pub use yardview_settings::SceneConfig;
pub use yardview_ui::{AppOptions, SceneSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

pub const USAGE: &str = "usage: yardview [--config <file.toml>] [snapshot.json]";

/// Parse command-line arguments (without the program name).
pub fn parse_args<I>(args: I) -> anyhow::Result<AppOptions>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut options = AppOptions::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .with_context(|| format!("{arg} needs a path\n{USAGE}"))?;
                options.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
            _ if options.snapshot.is_some() => bail!("only one snapshot can be opened\n{USAGE}"),
            _ => options.snapshot = Some(PathBuf::from(&arg)),
        }
    }
    Ok(options)
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    // In Windows GUI mode (release builds), log to a file instead of stdout
    #[cfg(all(target_os = "windows", not(debug_assertions)))]
    {
        use std::fs::OpenOptions;

        let log_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("yardview.log"))
        {
            Ok(file) => {
                let fmt_layer = fmt::layer()
                    .with_writer(file)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .pretty();

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .try_init()?;
            }
            Err(_) => {
                tracing_subscriber::registry().with(env_filter).try_init()?;
            }
        }
    }

    #[cfg(not(all(target_os = "windows", not(debug_assertions))))]
    {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
