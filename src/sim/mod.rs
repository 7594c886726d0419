//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Game clock advanced explicitly by the host
//! - No rendering or storage dependencies

pub mod board;
pub mod state;
pub mod tick;

pub use board::{Board, Card, PALETTE, Symbol, generate_board, shuffle_symbols};
pub use state::{
    DeferredAction, FlipOutcome, GameEvent, GamePhase, GameSession, GameState, MAX_PENDING_EVENTS,
    ScheduledTask, Selection,
};
pub use tick::{tick, update};
