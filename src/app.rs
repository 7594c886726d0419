//! Screen flow for a front-end
//!
//! `App` glues the engine, leaderboard and settings together. A front-end
//! forwards [`UiEvent`]s, calls [`App::update`] with elapsed time and renders
//! whatever [`App::snapshot`] returns.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::highscores::{ScoreStore, format_date};
use crate::persistence::KeyValueStore;
use crate::platform;
use crate::settings::{CardBackColor, Settings, Theme, ThemeColors};
use crate::sim::{self, FlipOutcome, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Landing,
    Playing,
    GameOver,
}

impl From<GamePhase> for Screen {
    fn from(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Landing => Screen::Landing,
            GamePhase::Playing => Screen::Playing,
            GamePhase::GameOver => Screen::GameOver,
        }
    }
}

/// Overlay on top of the current screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    Settings,
    HighScores,
    Alert { title: String, message: String },
}

/// Discrete input from the front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    SetName { name: String },
    SubmitName,
    ToggleTheme,
    OpenSettings,
    PickColor { color: CardBackColor },
    ShowHighScores,
    DismissModal,
    TapCard { id: usize },
    GiveUp,
    NewGame,
    ViewHighScores,
}

/// How a card should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: usize,
    pub face: CardFace,
    /// Symbol glyph, only when the card is showing
    pub glyph: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRow {
    /// 1-based position
    pub rank: usize,
    pub name: String,
    pub level: u32,
    pub date: String,
}

/// Read-only view of everything a front-end needs to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSnapshot {
    pub screen: Screen,
    pub modal: Option<Modal>,
    pub theme: Theme,
    pub colors: ThemeColors,
    pub theme_toggle_label: &'static str,
    pub card_back: CardBackColor,
    pub card_back_hex: &'static str,
    /// Glyph colour readable on the card back
    pub card_back_label_hex: &'static str,
    pub name_input: String,
    pub level: u32,
    pub time_left_secs: u32,
    pub completed_level: u32,
    pub cards: Vec<CardView>,
    pub high_scores: Vec<ScoreRow>,
    /// Shown in place of the table while the leaderboard is empty
    pub empty_scores_message: Option<&'static str>,
}

pub const NO_SCORES_MESSAGE: &str = "No scores yet. Be the first!";

/// Application state owned by the front-end
pub struct App<S: KeyValueStore = Box<dyn KeyValueStore>> {
    game: GameState,
    scores: ScoreStore<S>,
    settings: Settings,
    name_input: String,
    modal: Option<Modal>,
}

impl App {
    /// App on the platform's default storage with a random seed
    pub fn with_default_store() -> Self {
        App::new(platform::default_store(), platform::random_seed())
    }
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: S, seed: u64) -> Self {
        Self::with_game(store, GameState::new(seed))
    }

    pub fn with_tuning(store: S, seed: u64, tuning: Tuning) -> Self {
        Self::with_game(store, GameState::with_tuning(seed, tuning))
    }

    /// Build around an existing engine (custom clock or rules)
    pub fn with_game(store: S, game: GameState) -> Self {
        let settings = Settings::load(&store);
        let scores = ScoreStore::open(store);
        Self {
            game,
            scores,
            settings,
            name_input: String::new(),
            modal: None,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn scores(&self) -> &ScoreStore<S> {
        &self.scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn screen(&self) -> Screen {
        self.game.phase().into()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Apply one front-end event
    ///
    /// Only `SubmitName` can fail; the failure is also shown as an alert.
    pub fn handle(&mut self, event: UiEvent) -> Result<(), ValidationError> {
        match event {
            UiEvent::SetName { name } => self.name_input = name,
            UiEvent::SubmitName => return self.start_game(),
            UiEvent::ToggleTheme => {
                self.settings.toggle_theme();
                self.save_settings();
            }
            UiEvent::OpenSettings => self.modal = Some(Modal::Settings),
            UiEvent::PickColor { color } => {
                self.settings.card_back = color;
                self.save_settings();
            }
            UiEvent::ShowHighScores => self.modal = Some(Modal::HighScores),
            UiEvent::DismissModal => self.modal = None,
            UiEvent::TapCard { id } => {
                if self.game.flip_card(id) != FlipOutcome::Ignored {
                    self.process_events();
                }
            }
            UiEvent::GiveUp => {
                self.game.end_game();
                self.process_events();
            }
            UiEvent::NewGame => self.back_to_landing(None),
            UiEvent::ViewHighScores => self.back_to_landing(Some(Modal::HighScores)),
        }
        Ok(())
    }

    /// Advance time by `dt_ms` (timer ticks and reveal delays)
    pub fn update(&mut self, dt_ms: u64) {
        sim::update(&mut self.game, dt_ms);
        self.process_events();
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let now = self.game.wall_clock_ms();
        let session = self.game.session();
        let cards = self
            .game
            .board()
            .cards()
            .iter()
            .map(|card| {
                let face = if card.is_matched {
                    CardFace::Matched
                } else if self.game.selection().contains(card.id) {
                    CardFace::Up
                } else {
                    CardFace::Down
                };
                CardView {
                    id: card.id,
                    face,
                    glyph: (face != CardFace::Down).then(|| card.symbol.glyph()),
                }
            })
            .collect();
        let high_scores: Vec<ScoreRow> = self
            .scores
            .entries()
            .iter()
            .enumerate()
            .map(|(i, record)| ScoreRow {
                rank: i + 1,
                name: record.name.clone(),
                level: record.level,
                date: format_date(record.timestamp, now),
            })
            .collect();

        AppSnapshot {
            screen: self.screen(),
            modal: self.modal.clone(),
            theme: self.settings.theme,
            colors: self.settings.theme.colors(),
            theme_toggle_label: self.settings.theme.toggle_label(),
            card_back: self.settings.card_back,
            card_back_hex: self.settings.card_back.hex(),
            card_back_label_hex: self.settings.card_back.label_hex(),
            name_input: self.name_input.clone(),
            level: session.level,
            time_left_secs: session.time_left_secs,
            completed_level: session.completed_level,
            cards,
            empty_scores_message: high_scores.is_empty().then_some(NO_SCORES_MESSAGE),
            high_scores,
        }
    }

    fn start_game(&mut self) -> Result<(), ValidationError> {
        if self.game.phase() == GamePhase::Playing {
            return Ok(());
        }
        match self.game.start_game(&self.name_input) {
            Ok(()) => {
                self.modal = None;
                self.process_events();
                Ok(())
            }
            Err(e) => {
                self.modal = Some(Modal::Alert {
                    title: "Name Required".to_string(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn back_to_landing(&mut self, modal: Option<Modal>) {
        if self.game.phase() == GamePhase::Playing {
            return;
        }
        self.game.return_to_landing();
        self.modal = modal;
    }

    /// React to engine events; a finished session goes to the leaderboard
    fn process_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::GameOver {
                    record: Some(record),
                    ..
                } => {
                    self.scores.submit(record);
                }
                GameEvent::GameOver { record: None, .. } => {
                    log::info!("No level completed, nothing to record");
                }
                GameEvent::LevelStarted { level, .. } => log::debug!("Dealt level {}", level),
                _ => {}
            }
        }
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(self.scores.store_mut()) {
            log::error!("Error saving settings: {}", e);
        }
    }
}
