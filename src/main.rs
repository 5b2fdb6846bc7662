use std::path::PathBuf;

use anyhow::Result;

use logfacade::config::{self, LogConfig};
use logfacade::logging;

fn main() -> Result<()> {
    // Optional first argument: path to a TOML log config
    let config = match std::env::args_os().nth(1) {
        Some(path) => LogConfig::load(&PathBuf::from(path))?,
        None => LogConfig::default(),
    };

    config::init_from_config(&config)?;

    if let Some(directives) = config.tracing.as_deref() {
        logging::install_tracing_bridge(logfacade::logger(), directives)?;
    }

    logfacade::set_field("pid", std::process::id());
    logfacade::info("logger initialized");
    logfacade::debugf!("threshold is {}", logfacade::logger().level());
    logfacade::with_fields(logfacade::fields! { "attempt" => 1, "ok" => true })
        .warn("sample warning with call-site fields");
    tracing::info!(source = "tracing", "event routed through the facade");

    Ok(())
}
