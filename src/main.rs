//! Memory Maestro entry point
//!
//! The browser build is driven from JS through `platform::web`. Natively this
//! plays a short scripted session against the save file and prints the
//! leaderboard.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use memory_maestro::{App, CardBackColor, UiEvent, platform};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Memory Maestro (native) starting...");

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Player".to_string());
    let levels: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let card_back = args.next().map(|s| CardBackColor::from_str_or_default(&s));

    let mut app = App::new(platform::default_store(), platform::random_seed());
    if let Some(color) = card_back {
        let _ = app.handle(UiEvent::PickColor { color });
    }
    let _ = app.handle(UiEvent::SetName { name });
    if let Err(e) = app.handle(UiEvent::SubmitName) {
        eprintln!("{}", e);
        return;
    }

    for _ in 0..levels {
        autoplay_level(&mut app);
        // Let the level-complete reveal play out
        app.update(app.game().tuning().reveal_delay_ms);
    }
    let _ = app.handle(UiEvent::GiveUp);

    let snapshot = app.snapshot();
    println!("\nGame Over! Level Reached: {}", snapshot.completed_level);
    println!("\nTop 10 High Scores");
    if let Some(message) = snapshot.empty_scores_message {
        println!("  {}", message);
    }
    for row in &snapshot.high_scores {
        println!("  {:>2}  {:<16} {:>3}  {}", row.rank, row.name, row.level, row.date);
    }
}

/// Match every pair on the current board, one second per pair
#[cfg(not(target_arch = "wasm32"))]
fn autoplay_level(app: &mut memory_maestro::App) {
    use memory_maestro::UiEvent;

    let cards = app.game().board().cards().to_vec();
    for (i, card) in cards.iter().enumerate() {
        let Some(partner) = cards[i + 1..].iter().find(|c| c.symbol == card.symbol) else {
            continue;
        };
        let _ = app.handle(UiEvent::TapCard { id: card.id });
        let _ = app.handle(UiEvent::TapCard { id: partner.id });
        app.update(1000);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
