//! Player context injection
//!
//! Thread-local storage for the player a request acts on, so every span
//! opened within the scope carries the player id. [`PlayerContextGuard::span`]
//! records the same ids as span fields, which is how they reach formatted
//! output.

use std::cell::RefCell;

use pokedex_core::PlayerId;
use tracing::{Span, info_span};
use uuid::Uuid;

/// Player context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerContextData {
    /// The player's id
    pub player_id: PlayerId,
    /// Unique id for this context scope
    pub instance_id: Uuid,
}

impl PlayerContextData {
    /// Span carrying the player and instance ids as fields
    pub fn span(&self) -> Span {
        info_span!(
            "player",
            player_id = self.player_id.0,
            instance_id = %self.instance_id
        )
    }
}

thread_local! {
    static PLAYER_CONTEXT: RefCell<Option<PlayerContextData>> = const { RefCell::new(None) };
}

/// RAII guard for player context
///
/// When this guard is created, it sets the player context for the current
/// thread. When it's dropped, it restores the previous context (if any).
///
/// The context is thread-local; do not hold the guard across an `.await`
/// on a multi-threaded runtime.
///
/// # Example
///
/// ```ignore
/// use pokedex_logging::context::PlayerContextGuard;
/// use pokedex_core::PlayerId;
///
/// let _guard = PlayerContextGuard::new(PlayerId(42));
///
/// // Spans opened in this scope carry player_id = 42
/// let span = tracing::info_span!("catch");
/// ```
pub struct PlayerContextGuard {
    data: PlayerContextData,
    previous: Option<PlayerContextData>,
}

impl PlayerContextGuard {
    /// Create a new player context guard with a fresh instance id
    pub fn new(player_id: PlayerId) -> Self {
        Self::with_instance_id(player_id, Uuid::new_v4())
    }

    /// Create a guard with a specific instance id
    pub fn with_instance_id(player_id: PlayerId, instance_id: Uuid) -> Self {
        let previous = Self::current();
        let data = PlayerContextData {
            player_id,
            instance_id,
        };

        PLAYER_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(data.clone()));

        Self { data, previous }
    }

    /// The context this guard installed
    pub fn data(&self) -> &PlayerContextData {
        &self.data
    }

    /// Span tagged with this guard's player and instance ids
    pub fn span(&self) -> Span {
        self.data.span()
    }

    /// Get the current player context (if any)
    pub fn current() -> Option<PlayerContextData> {
        PLAYER_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Get the current player id (if set)
    pub fn current_player_id() -> Option<PlayerId> {
        Self::current().map(|ctx| ctx.player_id)
    }
}

impl Drop for PlayerContextGuard {
    fn drop(&mut self) {
        PLAYER_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}

/// Convenience macro to create a player context scope
///
/// # Example
///
/// ```ignore
/// with_player_context!(PlayerId(7), {
///     tracing::info!("Recomputing summary");
/// });
/// ```
#[macro_export]
macro_rules! with_player_context {
    ($player:expr, $body:block) => {{
        let _guard = $crate::context::PlayerContextGuard::new($player);
        $body
    }};
}
