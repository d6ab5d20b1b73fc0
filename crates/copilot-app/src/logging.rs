//! Structured JSON logging, `RUST_LOG`-configurable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = fmt::layer().with_target(true).json();

    tracing_subscriber::registry().with(env_filter).with(formatting_layer).init();
}
