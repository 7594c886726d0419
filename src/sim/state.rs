//! Game state and the flip/match rules
//!
//! The whole game lives in one owned [`GameState`]. Front-ends feed it
//! events (start, flip, give up, elapsed time) and read it back; they never
//! mutate it directly.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::{Board, Symbol, generate_board};
use crate::error::ValidationError;
use crate::highscores::ScoreRecord;
use crate::platform;
use crate::tuning::Tuning;

/// Events held before the oldest countdown ticks start being dropped
pub const MAX_PENDING_EVENTS: usize = 256;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a player name
    #[default]
    Landing,
    /// A level is dealt and the clock is running
    Playing,
    /// Session ended (timer expired or player gave up)
    GameOver,
}

/// Face-up, unmatched cards (never more than two)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    cards: Vec<usize>,
}

impl Selection {
    pub const MAX: usize = 2;

    pub fn ids(&self) -> &[usize] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= Self::MAX
    }

    pub fn contains(&self, id: usize) -> bool {
        self.cards.contains(&id)
    }

    /// Add a card; refused when already full
    fn push(&mut self, id: usize) -> bool {
        if self.is_full() {
            return false;
        }
        self.cards.push(id);
        true
    }

    fn remove(&mut self, id: usize) {
        self.cards.retain(|&c| c != id);
    }

    fn clear(&mut self) {
        self.cards.clear();
    }
}

/// Per-session progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub player_name: String,
    /// Current level (1-based)
    pub level: u32,
    pub pairs: u32,
    pub time_limit_secs: u32,
    pub time_left_secs: u32,
    /// Highest level fully cleared this session (0 = none)
    pub completed_level: u32,
}

impl GameSession {
    fn new(player_name: String, tuning: &Tuning) -> Self {
        let time_limit_secs = tuning.time_limit_for_level(1);
        Self {
            player_name,
            level: 1,
            pairs: tuning.pairs_for_level(1),
            time_limit_secs,
            time_left_secs: time_limit_secs,
            completed_level: 0,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(String::new(), &Tuning::default())
    }
}

/// Work deferred until after the reveal delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Turn a mismatched pair back face-down
    HideMismatch,
    /// Deal the next level
    AdvanceLevel,
}

/// A deferred action tagged with the board generation it was scheduled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub action: DeferredAction,
    pub generation: u64,
    /// Game clock time at which the task fires
    pub due_ms: u64,
}

/// Result of a card tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Tap had no effect
    Ignored,
    /// Card turned face-up, waiting for a second card
    Flipped,
    /// Face-up card turned back down
    Unflipped,
    /// Two equal cards matched
    Matched,
    /// Final pair matched; next level is scheduled
    LevelComplete,
    /// Two different cards; they hide after the reveal delay
    Mismatched,
}

/// Things that happened, for the front-end (sounds, score submission)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted {
        level: u32,
        pairs: u32,
        time_limit_secs: u32,
    },
    Matched {
        first: usize,
        second: usize,
        symbol: Symbol,
    },
    Mismatched {
        first: usize,
        second: usize,
    },
    SelectionCleared,
    LevelComplete {
        level: u32,
    },
    TimerTick {
        time_left_secs: u32,
    },
    GameOver {
        completed_level: u32,
        record: Option<ScoreRecord>,
    },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    tuning: Tuning,
    phase: GamePhase,
    session: GameSession,
    board: Board,
    selection: Selection,
    /// Bumped on every deal and on game over; stale tasks are dropped
    generation: u64,
    /// Monotonic game clock (ms), advanced by `tick::update`
    pub(super) clock_ms: u64,
    /// When the next countdown tick is due
    pub(super) next_tick_ms: u64,
    pub(super) tasks: Vec<ScheduledTask>,
    events: Vec<GameEvent>,
    /// Wall clock used to timestamp score records (ms since epoch)
    wall_clock: fn() -> f64,
}

impl GameState {
    /// Create a game sitting on the landing screen with the default rules
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Landing,
            session: GameSession::default(),
            board: Board::default(),
            selection: Selection::default(),
            generation: 0,
            clock_ms: 0,
            next_tick_ms: 0,
            tasks: Vec::new(),
            events: Vec::new(),
            wall_clock: platform::now_ms,
        }
    }

    /// Replace the wall clock used for score timestamps
    pub fn with_wall_clock(mut self, clock: fn() -> f64) -> Self {
        self.wall_clock = clock;
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Deferred actions not yet fired
    pub fn pending_tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Matched pairs on the current board
    pub fn matched_pairs(&self) -> u32 {
        self.board.matched_pairs() as u32
    }

    /// Card is showing its symbol (selected or matched)
    pub fn is_face_up(&self, id: usize) -> bool {
        self.selection.contains(id) || self.board.card(id).is_some_and(|c| c.is_matched)
    }

    /// Current wall-clock time (ms since epoch) as seen by this game
    pub fn wall_clock_ms(&self) -> f64 {
        (self.wall_clock)()
    }

    /// Take all events raised since the last call
    ///
    /// Hosts are expected to drain after every `flip_card`/`update` batch.
    /// Undrained events are kept up to [`MAX_PENDING_EVENTS`]; past that the
    /// oldest `TimerTick` is dropped first, then the oldest event of any kind.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events raised and not yet drained
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Begin a new session at level 1
    ///
    /// A blank name leaves the state untouched.
    pub fn start_game(&mut self, player_name: &str) -> Result<(), ValidationError> {
        let name = player_name.trim();
        if name.is_empty() {
            log::warn!("Rejected blank player name");
            return Err(ValidationError::BlankName);
        }

        self.session = GameSession::new(name.to_string(), &self.tuning);
        self.phase = GamePhase::Playing;
        self.deal();
        log::info!("Started game for {} (seed {})", name, self.seed);
        Ok(())
    }

    /// Tap a card
    pub fn flip_card(&mut self, id: usize) -> FlipOutcome {
        if self.phase != GamePhase::Playing {
            return FlipOutcome::Ignored;
        }
        match self.board.card(id) {
            Some(card) if !card.is_matched => {}
            _ => return FlipOutcome::Ignored,
        }
        // A full selection is still resolving
        if self.selection.is_full() {
            return FlipOutcome::Ignored;
        }

        if self.selection.contains(id) {
            self.selection.remove(id);
            return FlipOutcome::Unflipped;
        }

        self.selection.push(id);
        if !self.selection.is_full() {
            return FlipOutcome::Flipped;
        }

        let (first, second) = (self.selection.ids()[0], self.selection.ids()[1]);
        let (Some(a), Some(b)) = (self.board.card(first).copied(), self.board.card(second).copied()) else {
            return FlipOutcome::Ignored;
        };
        let symbol = a.symbol;

        if a.symbol == b.symbol {
            self.board.mark_matched(first);
            self.board.mark_matched(second);
            self.selection.clear();
            self.push_event(GameEvent::Matched {
                first,
                second,
                symbol,
            });
            log::debug!("Matched {:?} ({} / {})", symbol, self.matched_pairs(), self.session.pairs);

            // Compare against the count that includes this match
            if self.matched_pairs() >= self.session.pairs {
                self.session.completed_level = self.session.level;
                self.push_event(GameEvent::LevelComplete {
                    level: self.session.level,
                });
                self.schedule(DeferredAction::AdvanceLevel);
                log::info!("Level {} complete", self.session.level);
                FlipOutcome::LevelComplete
            } else {
                FlipOutcome::Matched
            }
        } else {
            self.push_event(GameEvent::Mismatched { first, second });
            self.schedule(DeferredAction::HideMismatch);
            FlipOutcome::Mismatched
        }
    }

    /// Deal the next level with a fresh clock
    pub fn advance_level(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let level = self.session.level + 1;
        self.session.level = level;
        self.session.pairs = self.tuning.pairs_for_level(level);
        self.session.time_limit_secs = self.tuning.time_limit_for_level(level);
        self.session.time_left_secs = self.session.time_limit_secs;
        self.deal();
        log::info!(
            "Level {}: {} pairs, {}s",
            level,
            self.session.pairs,
            self.session.time_limit_secs
        );
    }

    /// End the session
    ///
    /// Returns the score record when at least one level was cleared.
    pub fn end_game(&mut self) -> Option<ScoreRecord> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.phase = GamePhase::GameOver;
        self.generation += 1;
        self.tasks.clear();
        self.selection.clear();

        let completed_level = self.session.completed_level;
        let record = (completed_level > 0).then(|| ScoreRecord {
            name: self.session.player_name.clone(),
            level: completed_level,
            timestamp: self.wall_clock_ms(),
        });

        log::info!(
            "Game over for {} (completed level {})",
            self.session.player_name,
            completed_level
        );
        self.push_event(GameEvent::GameOver {
            completed_level,
            record: record.clone(),
        });
        record
    }

    /// Back to the landing screen, keeping the player name
    pub fn return_to_landing(&mut self) {
        self.phase = GamePhase::Landing;
        self.generation += 1;
        self.tasks.clear();
        self.selection.clear();
        self.board = Board::default();
    }

    /// Run a deferred action; stale tasks are dropped
    pub fn run_task(&mut self, task: ScheduledTask) {
        self.tasks.retain(|t| *t != task);
        if task.generation != self.generation || self.phase != GamePhase::Playing {
            log::debug!("Dropped stale {:?} (gen {} != {})", task.action, task.generation, self.generation);
            return;
        }
        match task.action {
            DeferredAction::HideMismatch => {
                self.selection.clear();
                self.push_event(GameEvent::SelectionCleared);
            }
            DeferredAction::AdvanceLevel => self.advance_level(),
        }
    }

    fn schedule(&mut self, action: DeferredAction) {
        self.tasks.push(ScheduledTask {
            action,
            generation: self.generation,
            due_ms: self.clock_ms.saturating_add(self.tuning.reveal_delay_ms),
        });
    }

    /// Deal a board for the current session level and restart the clock
    fn deal(&mut self) {
        self.generation += 1;
        self.tasks.clear();
        self.selection.clear();
        self.board = generate_board(self.session.pairs as usize, &mut self.rng);
        self.next_tick_ms = self.clock_ms.saturating_add(self.tuning.timer_period_ms);
        self.push_event(GameEvent::LevelStarted {
            level: self.session.level,
            pairs: self.session.pairs,
            time_limit_secs: self.session.time_limit_secs,
        });
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let oldest = self
                .events
                .iter()
                .position(|e| matches!(e, GameEvent::TimerTick { .. }))
                .unwrap_or(0);
            self.events.remove(oldest);
        }
        self.events.push(event);
    }

    pub(super) fn count_down(&mut self) {
        self.session.time_left_secs = self.session.time_left_secs.saturating_sub(1);
        self.push_event(GameEvent::TimerTick {
            time_left_secs: self.session.time_left_secs,
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixed_clock() -> f64 {
        1_700_000_000_000.0
    }

    /// Ids of the two cards carrying `symbol`
    pub(crate) fn pair_of(state: &GameState, symbol: Symbol) -> (usize, usize) {
        let ids: Vec<usize> = state
            .board()
            .cards()
            .iter()
            .filter(|c| c.symbol == symbol)
            .map(|c| c.id)
            .collect();
        (ids[0], ids[1])
    }

    /// Two ids with different symbols
    pub(crate) fn mismatch_of(state: &GameState) -> (usize, usize) {
        let cards = state.board().cards();
        let first = cards[0];
        let other = cards.iter().find(|c| c.symbol != first.symbol).unwrap();
        (first.id, other.id)
    }

    pub(crate) fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed).with_wall_clock(fixed_clock);
        state.start_game("Ada").unwrap();
        state
    }

    #[test]
    fn test_start_game_resets_session() {
        let state = started(1);
        assert_eq!(state.phase(), GamePhase::Playing);
        let session = state.session();
        assert_eq!(session.player_name, "Ada");
        assert_eq!(session.level, 1);
        assert_eq!(session.pairs, 2);
        assert_eq!(session.time_limit_secs, 12);
        assert_eq!(session.time_left_secs, 12);
        assert_eq!(session.completed_level, 0);
        assert_eq!(state.board().len(), 4);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut state = GameState::new(1);
        assert_eq!(state.start_game(""), Err(ValidationError::BlankName));
        assert_eq!(state.start_game("   \t"), Err(ValidationError::BlankName));
        assert_eq!(state.phase(), GamePhase::Landing);
        assert!(state.board().is_empty());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_name_is_trimmed() {
        let mut state = GameState::new(1);
        state.start_game("  Grace ").unwrap();
        assert_eq!(state.session().player_name, "Grace");
    }

    #[test]
    fn test_flip_same_card_twice_unflips() {
        let mut state = started(5);
        assert_eq!(state.flip_card(0), FlipOutcome::Flipped);
        assert!(state.is_face_up(0));
        assert_eq!(state.flip_card(0), FlipOutcome::Unflipped);
        assert!(state.selection().is_empty());
        assert!(!state.is_face_up(0));
    }

    #[test]
    fn test_match_marks_both_cards() {
        let mut state = GameState::new(8).with_wall_clock(fixed_clock);
        state.start_game("Ada").unwrap();
        state.advance_level();
        let (a, b) = pair_of(&state, Symbol::Star);

        let before = state.matched_pairs();
        state.flip_card(a);
        assert_eq!(state.flip_card(b), FlipOutcome::Matched);
        assert!(state.board().card(a).unwrap().is_matched);
        assert!(state.board().card(b).unwrap().is_matched);
        assert!(state.selection().is_empty());
        assert_eq!(state.matched_pairs(), before + 1);

        // Matched cards ignore taps
        assert_eq!(state.flip_card(a), FlipOutcome::Ignored);
        assert_eq!(state.matched_pairs(), before + 1);
    }

    #[test]
    fn test_final_match_completes_level() {
        let mut state = started(11);
        let (a, b) = pair_of(&state, Symbol::Star);
        let (c, d) = pair_of(&state, Symbol::Balloon);

        state.flip_card(a);
        assert_eq!(state.flip_card(b), FlipOutcome::Matched);
        assert_eq!(state.session().completed_level, 0);
        state.flip_card(c);
        assert_eq!(state.flip_card(d), FlipOutcome::LevelComplete);
        assert_eq!(state.session().completed_level, 1);
        assert!(state.board().is_cleared());

        let pending = state.pending_tasks();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, DeferredAction::AdvanceLevel);
        assert_eq!(pending[0].due_ms, 1000);
        // Still on level 1 until the task runs
        assert_eq!(state.session().level, 1);
    }

    #[test]
    fn test_mismatch_blocks_further_flips() {
        let mut state = started(3);
        let (a, b) = mismatch_of(&state);
        state.flip_card(a);
        assert_eq!(state.flip_card(b), FlipOutcome::Mismatched);
        assert_eq!(state.selection().len(), 2);

        let third = (0..state.board().len()).find(|&i| i != a && i != b).unwrap();
        assert_eq!(state.flip_card(third), FlipOutcome::Ignored);
        assert_eq!(state.flip_card(a), FlipOutcome::Ignored);
        assert_eq!(state.selection().len(), 2);

        let task = state.pending_tasks()[0];
        state.run_task(task);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_advance_level_formulas() {
        let mut state = started(2);
        for level in 2..=6 {
            state.advance_level();
            let session = state.session();
            assert_eq!(session.level, level);
            assert_eq!(session.pairs, 2 + (level - 1));
            assert_eq!(session.time_limit_secs, 12 + (level - 1) * 4);
            assert_eq!(session.time_left_secs, session.time_limit_secs);
            assert_eq!(state.board().len(), (session.pairs * 2) as usize);
            assert!(state.selection().is_empty());
        }
    }

    #[test]
    fn test_stale_task_is_noop() {
        let mut state = started(3);
        let (a, b) = mismatch_of(&state);
        state.flip_card(a);
        state.flip_card(b);
        let stale = state.pending_tasks()[0];

        // New level regenerates the board; the old hide must not touch it
        state.advance_level();
        assert!(state.pending_tasks().is_empty());
        state.flip_card(0);
        state.run_task(stale);
        assert_eq!(state.selection().ids(), &[0]);
    }

    #[test]
    fn test_stale_advance_after_new_session() {
        let mut state = started(4);
        let (a, b) = pair_of(&state, Symbol::Star);
        let (c, d) = pair_of(&state, Symbol::Balloon);
        state.flip_card(a);
        state.flip_card(b);
        state.flip_card(c);
        state.flip_card(d);
        let advance = state.pending_tasks()[0];

        state.end_game();
        state.return_to_landing();
        state.start_game("Ada").unwrap();
        state.run_task(advance);
        assert_eq!(state.session().level, 1);
    }

    #[test]
    fn test_end_game_without_completed_level() {
        let mut state = started(6);
        assert_eq!(state.end_game(), None);
        assert_eq!(state.phase(), GamePhase::GameOver);
        let events = state.drain_events();
        assert!(matches!(
            events.last(),
            Some(GameEvent::GameOver {
                completed_level: 0,
                record: None
            })
        ));
        // Flips ignored once over
        assert_eq!(state.flip_card(0), FlipOutcome::Ignored);
    }

    #[test]
    fn test_end_game_emits_record() {
        let mut state = started(6);
        let (a, b) = pair_of(&state, Symbol::Star);
        let (c, d) = pair_of(&state, Symbol::Balloon);
        state.flip_card(a);
        state.flip_card(b);
        state.flip_card(c);
        state.flip_card(d);

        let record = state.end_game().unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.level, 1);
        assert_eq!(record.timestamp, fixed_clock());
        assert!(state.pending_tasks().is_empty());

        // Only once
        assert_eq!(state.end_game(), None);
    }

    #[test]
    fn test_return_to_landing_keeps_name() {
        let mut state = started(6);
        state.end_game();
        state.return_to_landing();
        assert_eq!(state.phase(), GamePhase::Landing);
        assert_eq!(state.session().player_name, "Ada");
        assert!(state.board().is_empty());
    }

    #[test]
    fn test_huge_time_per_level_saturates() {
        let tuning: Tuning = serde_json::from_str(r#"{"time_per_level_secs": 4000000000}"#).unwrap();
        let mut state = GameState::with_tuning(3, tuning).with_wall_clock(fixed_clock);
        state.start_game("Ada").unwrap();
        state.advance_level();
        assert_eq!(state.session().time_limit_secs, 12 + 4_000_000_000);
        state.advance_level();
        assert_eq!(state.session().level, 3);
        assert_eq!(state.session().time_limit_secs, u32::MAX);
        assert_eq!(state.session().time_left_secs, u32::MAX);
    }

    #[test]
    fn test_huge_delays_do_not_overflow_clock() {
        let tuning = Tuning {
            reveal_delay_ms: u64::MAX,
            timer_period_ms: u64::MAX,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(3, tuning);
        state.start_game("Ada").unwrap();
        let (a, b) = mismatch_of(&state);
        state.flip_card(a);
        assert_eq!(state.flip_card(b), FlipOutcome::Mismatched);
        assert_eq!(state.pending_tasks()[0].due_ms, u64::MAX);
        crate::sim::tick::update(&mut state, 5_000);
        assert_eq!(state.session().time_left_secs, 12);
        assert_eq!(state.selection().len(), 2);
    }

    #[test]
    fn test_undrained_events_are_capped() {
        let tuning = Tuning {
            base_time_limit_secs: 1_000,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(4, tuning).with_wall_clock(fixed_clock);
        state.start_game("Ada").unwrap();
        crate::sim::tick::update(&mut state, 400_000);
        let (a, b) = mismatch_of(&state);
        state.flip_card(a);
        state.flip_card(b);

        let events = state.pending_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        // LevelStarted survives; oldest ticks went first
        assert!(matches!(events[0], GameEvent::LevelStarted { level: 1, .. }));
        assert_eq!(events[1], GameEvent::TimerTick { time_left_secs: 1_000 - 147 });
        assert!(matches!(events.last(), Some(GameEvent::Mismatched { .. })));
        assert_eq!(state.drain_events().len(), MAX_PENDING_EVENTS);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_wall_clock_is_injectable() {
        let state = GameState::new(1).with_wall_clock(fixed_clock);
        assert_eq!(state.wall_clock_ms(), fixed_clock());
    }
}
