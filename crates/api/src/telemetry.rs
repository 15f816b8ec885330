//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::AppEnv;

/// Default filter when `RUST_LOG` is unset
fn default_directive(env: AppEnv) -> &'static str {
    match env {
        AppEnv::Local | AppEnv::Dev => "debug",
        AppEnv::Prod => "info",
    }
}

/// Install the global subscriber.
/// Local runs get human-readable output; dev and prod emit JSON lines.
pub fn init_tracing(env: AppEnv) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(env)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match env {
        AppEnv::Local => builder.init(),
        AppEnv::Dev | AppEnv::Prod => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_per_env() {
        assert_eq!(default_directive(AppEnv::Local), "debug");
        assert_eq!(default_directive(AppEnv::Dev), "debug");
        assert_eq!(default_directive(AppEnv::Prod), "info");
    }
}
