use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "printcalc_backend=debug,tower_http=debug,info",
        Environment::Staging => "printcalc_backend=debug,tower_http=info,info",
        // sqlx logs every statement at info
        Environment::Prod => "printcalc_backend=info,tower_http=info,sqlx=warn,warn",
    }
}

/// Install the global subscriber: pretty output outside production, JSON in production.
pub fn init_logging(env: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    if matches!(env, Environment::Prod) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    tracing::info!(env = ?env, "Logging initialized");
}
