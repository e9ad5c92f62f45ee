// stepper - Log output
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the default log filter.
pub const ENV_LOG: &str = "STEPPER_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. `filter` takes precedence over
/// `STEPPER_LOG`; an unparseable filter falls back to `warn`.
pub fn init_logging(filter: Option<&str>) {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let subscriber = fmt::fmt()
            .with_env_filter(build_filter(filter))
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn build_filter(filter: Option<&str>) -> EnvFilter {
    let directive = filter
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_LOG).ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
