// On Windows, hide the console window for GUI applications
#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

use yardview::{init_logging, parse_args};

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let options = parse_args(std::env::args().skip(1))?;
    tracing::info!(
        version = yardview::VERSION,
        build_date = yardview::BUILD_DATE,
        "starting YardView"
    );

    let code = yardview_ui::run(options);
    tracing::debug!(?code, "application exited");
    Ok(())
}
