//! Custom tracing layers
//!
//! [`PlayerContextLayer`] attaches the active [`PlayerContextGuard`] data to
//! every span created while it is in scope.

use tracing::{Subscriber, span};
use tracing_subscriber::{
    layer::{Context, Layer},
    registry::LookupSpan,
};

use crate::config::JsonlConfig;
use crate::context::{PlayerContextData, PlayerContextGuard};

/// Layer that injects player context into spans
pub struct PlayerContextLayer;

impl PlayerContextLayer {
    /// Create a new player context layer
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlayerContextLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct PlayerContextExtension {
    pub data: PlayerContextData,
}

impl<S> Layer<S> for PlayerContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(player_ctx) = PlayerContextGuard::current() {
                span.extensions_mut()
                    .insert(PlayerContextExtension { data: player_ctx });
            }
        }
    }
}

/// JSONL formatting layer writing to `writer`
pub fn jsonl_layer<S, W>(writer: W, config: &JsonlConfig) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer::<S>()
        .json()
        .with_current_span(true)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread_info)
        .with_thread_names(config.include_thread_info)
        .with_writer(writer)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use pokedex_core::PlayerId;
    use tracing_subscriber::{Registry, layer::SubscriberExt};

    use super::*;

    /// Records whether new spans carry a player extension
    struct ExtensionProbe {
        found: Arc<AtomicBool>,
    }

    impl<S> Layer<S> for ExtensionProbe
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id) {
                let has = span
                    .extensions()
                    .get::<PlayerContextExtension>()
                    .is_some_and(|ext| ext.data.player_id == PlayerId(77));
                self.found.store(has, Ordering::SeqCst);
            }
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_span_carries_player_context() {
        let found = Arc::new(AtomicBool::new(false));
        let subscriber = Registry::default()
            .with(PlayerContextLayer::new())
            .with(ExtensionProbe {
                found: found.clone(),
            });

        tracing::subscriber::with_default(subscriber, || {
            let _guard = PlayerContextGuard::new(PlayerId(77));
            let _span = tracing::info_span!("catch").entered();
        });

        assert!(found.load(Ordering::SeqCst));
    }

    #[test]
    fn test_span_without_context() {
        let found = Arc::new(AtomicBool::new(true));
        let subscriber = Registry::default()
            .with(PlayerContextLayer::new())
            .with(ExtensionProbe {
                found: found.clone(),
            });

        tracing::subscriber::with_default(subscriber, || {
            let _span = tracing::info_span!("leaderboard").entered();
        });

        assert!(!found.load(Ordering::SeqCst));
    }

    #[test]
    fn test_jsonl_layer_output() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let config = JsonlConfig {
            include_location: false,
            ..Default::default()
        };
        let subscriber = Registry::default().with(jsonl_layer(move || writer.clone(), &config));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(region = "kanto", "Region completed");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["message"], "Region completed");
        assert_eq!(line["region"], "kanto");
        assert_eq!(line["level"], "INFO");
        assert!(line.get("filename").is_none());
    }

    #[test]
    fn test_player_ids_reach_jsonl_output() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = Registry::default()
            .with(PlayerContextLayer::new())
            .with(jsonl_layer(move || writer.clone(), &JsonlConfig::default()));

        let guard = PlayerContextGuard::new(PlayerId(77));
        let instance_id = guard.data().instance_id.to_string();
        tracing::subscriber::with_default(subscriber, || {
            let _span = guard.span().entered();
            tracing::info!("Applied dex action");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["span"]["name"], "player");
        assert_eq!(line["span"]["player_id"], 77);
        assert_eq!(line["span"]["instance_id"], instance_id.as_str());
    }
}
