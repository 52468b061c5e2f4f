// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod bot;
pub mod category;
pub mod config;
pub mod digest;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod rank;
pub mod relevance;
pub mod render;
pub mod scheduler;
pub mod summarize;
pub mod trending;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::category::Category;
pub use crate::config::{AppConfig, ConfigHandle};
pub use crate::digest::{Digest, DigestKind, DigestPipeline};
pub use crate::ingest::types::FeedItem;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Progress events log under short targets (`digest`, `ingest`, ...), so each one is
/// named here next to the crate path.
pub const DEFAULT_LOG_FILTER: &str =
    "tech_news_digest=info,digest=info,ingest=info,summarize=info,notify=info,scheduler=info,warn";

/// Install the global subscriber: `RUST_LOG` (or `DEFAULT_LOG_FILTER`), compact text,
/// JSON lines when `LOG_FORMAT=json`. Safe to call twice; the second call is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_filter_shows_progress_targets() {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(DEFAULT_LOG_FILTER))
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(move || writer.clone()),
            );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "digest", "digest ready");
            tracing::info!(target: "ingest", "category fetched");
            tracing::info!(target: "summarize", "summary cached");
            tracing::info!(target: "notify", "digest delivered");
            tracing::info!(target: "scheduler", "next run scheduled");
            tracing::debug!(target: "relevance", "scored item");
            tracing::info!(target: "hyper", "connection opened");
        });

        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        for line in [
            "digest ready",
            "category fetched",
            "summary cached",
            "digest delivered",
            "next run scheduled",
        ] {
            assert!(text.contains(line), "missing `{line}` in:\n{text}");
        }
        assert!(!text.contains("scored item"));
        assert!(!text.contains("connection opened"));
    }
}
