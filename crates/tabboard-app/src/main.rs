//! Tabboard desktop entry point.

use tabboard_app::AppConfig;

fn main() -> eframe::Result<()> {
    env_logger::init();
    log::info!("Starting Tabboard");

    tabboard_app::run(AppConfig::from_env())
}
