//! Countdown and deferred-action scheduling
//!
//! The host calls [`update`] with elapsed wall time. The game clock only
//! moves forward here, firing the 1 second countdown and any reveal-delay
//! tasks in time order.

use super::state::{GamePhase, GameState};

/// Advance the countdown by one second, ending the game at zero
pub fn tick(state: &mut GameState) {
    if state.phase() != GamePhase::Playing {
        return;
    }
    if state.session().time_left_secs > 0 {
        state.count_down();
    }
    if state.session().time_left_secs == 0 {
        log::info!("Time's up on level {}", state.session().level);
        state.end_game();
    }
}

/// Advance the game clock by `dt_ms`, running everything that falls due
pub fn update(state: &mut GameState, dt_ms: u64) {
    let target = state.clock_ms.saturating_add(dt_ms);

    loop {
        let next_task = state
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= target)
            .min_by_key(|(_, t)| t.due_ms)
            .map(|(i, t)| (i, t.due_ms));
        let tick_due = (state.phase() == GamePhase::Playing && state.next_tick_ms <= target)
            .then_some(state.next_tick_ms);

        match (next_task, tick_due) {
            // Deferred tasks win ties with the countdown
            (Some((index, due)), next_tick) if next_tick.is_none_or(|t| due <= t) => {
                let task = state.tasks.remove(index);
                state.clock_ms = state.clock_ms.max(due);
                state.run_task(task);
            }
            (_, Some(due)) => {
                state.clock_ms = due;
                state.next_tick_ms = due.saturating_add(state.tuning().timer_period_ms);
                tick(state);
            }
            _ => break,
        }
    }

    state.clock_ms = target;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::Symbol;
    use crate::sim::state::GameEvent;
    use crate::sim::state::tests::{mismatch_of, pair_of, started};

    fn clear_level(state: &mut GameState) {
        let symbols: Vec<Symbol> = {
            let mut seen = Vec::new();
            for card in state.board().cards() {
                if !seen.contains(&card.symbol) {
                    seen.push(card.symbol);
                }
            }
            seen
        };
        for symbol in symbols {
            let (a, b) = pair_of(state, symbol);
            state.flip_card(a);
            state.flip_card(b);
        }
    }

    #[test]
    fn test_tick_counts_down() {
        let mut state = started(1);
        tick(&mut state);
        assert_eq!(state.session().time_left_secs, 11);
    }

    #[test]
    fn test_update_fires_one_tick_per_second() {
        let mut state = started(1);
        update(&mut state, 999);
        assert_eq!(state.session().time_left_secs, 12);
        update(&mut state, 1);
        assert_eq!(state.session().time_left_secs, 11);
        update(&mut state, 3500);
        assert_eq!(state.session().time_left_secs, 8);
    }

    #[test]
    fn test_timeout_without_completed_level() {
        let mut state = started(1);
        update(&mut state, 12_000);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(state.session().time_left_secs, 0);

        let over = state
            .drain_events()
            .into_iter()
            .find(|e| matches!(e, GameEvent::GameOver { .. }));
        assert_eq!(
            over,
            Some(GameEvent::GameOver {
                completed_level: 0,
                record: None
            })
        );

        // Clock keeps running but nothing else happens
        update(&mut state, 5_000);
        assert_eq!(state.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_mismatch_hides_after_delay() {
        let mut state = started(3);
        let (a, b) = mismatch_of(&state);
        state.flip_card(a);
        state.flip_card(b);

        update(&mut state, 999);
        assert_eq!(state.selection().len(), 2);
        update(&mut state, 1);
        assert!(state.selection().is_empty());
        assert!(state.pending_tasks().is_empty());
    }

    #[test]
    fn test_level_one_scenario_auto_advances() {
        let mut state = started(21);
        let (a, _) = pair_of(&state, Symbol::Star);

        // Flip the same card twice: back to nothing selected
        state.flip_card(a);
        state.flip_card(a);
        assert!(state.selection().is_empty());

        clear_level(&mut state);
        assert_eq!(state.session().completed_level, 1);
        assert_eq!(state.session().level, 1);

        update(&mut state, 1000);
        let session = state.session();
        assert_eq!(session.level, 2);
        assert_eq!(session.pairs, 3);
        assert_eq!(session.time_limit_secs, 16);
        assert_eq!(state.board().len(), 6);
        assert_eq!(state.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_advance_restarts_clock() {
        let mut state = started(21);
        update(&mut state, 2500);
        assert_eq!(state.session().time_left_secs, 10);

        clear_level(&mut state);
        update(&mut state, 1000);
        assert_eq!(state.session().level, 2);
        assert_eq!(state.session().time_left_secs, 16);

        // First countdown tick a full period after the deal
        update(&mut state, 999);
        assert_eq!(state.session().time_left_secs, 16);
        update(&mut state, 1);
        assert_eq!(state.session().time_left_secs, 15);
    }

    #[test]
    fn test_timeout_during_advance_delay_scores_level() {
        let mut state = started(21);
        update(&mut state, 11_500);
        assert_eq!(state.session().time_left_secs, 1);

        clear_level(&mut state);
        // Timer expires before the level advance fires
        update(&mut state, 1000);
        assert_eq!(state.phase(), GamePhase::GameOver);
        let record = state.drain_events().into_iter().find_map(|e| match e {
            GameEvent::GameOver { record, .. } => record,
            _ => None,
        });
        assert_eq!(record.map(|r| r.level), Some(1));
    }

    #[test]
    fn test_no_ticks_on_landing() {
        let mut state = GameState::new(1);
        update(&mut state, 60_000);
        assert_eq!(state.phase(), GamePhase::Landing);
        assert_eq!(state.clock_ms(), 60_000);
    }
}
