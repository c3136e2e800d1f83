use once_cell::sync::OnceCell;
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

const DEFAULT_TEST_FILTER: &str = "info,dms_permissions=debug,dms_api=debug";

static INIT: OnceCell<()> = OnceCell::new();

/// The filter for test output. `TEST_LOG` turns output on, and can hold a filter directive
/// itself; otherwise `LOG` or the default applies.
fn test_filter(test_log: &str) -> EnvFilter {
    let directive = test_log.trim();
    if !directive.is_empty() && directive != "1" {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return filter;
        }
    }

    EnvFilter::try_from_env("LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER))
}

fn install(filter: EnvFilter) {
    // Another harness in the same process may have installed a logger first.
    LogTracer::builder()
        .with_max_level(log::LevelFilter::Debug)
        .init()
        .ok();

    let tree = HierarchicalLayer::new(2)
        .with_targets(true)
        .with_bracketed_fields(true);

    let subscriber = Registry::default()
        .with(filter)
        .with(tree)
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Set up tree-formatted tracing for tests when `TEST_LOG` is set. Runs once per process, so
/// every test can call it.
pub fn init() {
    INIT.get_or_init(|| {
        if let Ok(test_log) = std::env::var("TEST_LOG") {
            install(test_filter(&test_log));
        }
    });
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn filter_from_test_log() {
        assert_eq!(test_filter("warn").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            test_filter(" dms_permissions=trace ").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn init_twice() {
        init();
        init();
    }
}
