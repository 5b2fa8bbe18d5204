//! Entry point for the tempo-win widget.
//!
//! Windows only: the global listeners and the widget window are Win32
//! constructs, so any other platform fails fast at startup.

#[cfg(not(windows))]
fn main() {
    eprintln!("tempo-win only runs on Windows.");
    std::process::exit(1);
}

#[cfg(windows)]
fn main() {
    env_logger::init();

    let config = tempo_win::config::AppConfig::default();
    let mut controller = match tempo_win::app::AppController::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            log::error!("startup failed: {e}");
            std::process::exit(1);
        }
    };

    controller.run();
}
