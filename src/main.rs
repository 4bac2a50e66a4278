/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::input::{Actions, FrameInput};
use sim::game::GameState;
use sim::progress;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "ninja-scrolls.log";

fn main() {
    init_logging(&progress::save_dir());
    let config = GameConfig::load();
    let save_path = progress::save_path(&config.save_file);

    tracing::info!(tick_ms = config.tick_rate_ms, "starting");
    let progress = progress::load(&save_path);
    let mut game = GameState::new(progress, config.tuning.clone(), save_path);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing The Ten Ninja Scrolls!");
    println!("Scrolls recovered: {}/10", game.progress.scrolls_cleared);
}

/// Log to a file in the save directory; the terminal belongs to the renderer.
fn init_logging(dir: &Path) {
    let file = match File::create(dir.join(LOG_FILE)) {
        Ok(f) => f,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ninja_scrolls=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn game_loop(
    game: &mut GameState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();

    // Press edges seen between ticks; a tap shorter than a tick still counts.
    let mut pending = Actions::empty();

    loop {
        kb.drain_events();
        gp.update();
        let sampled = kb.frame_input().merge(gp.frame_input());
        pending |= sampled.pressed;

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput::new(sampled.held, pending);
            pending = Actions::empty();

            let events = game.tick(&input);
            sound::play_events(sound, &events);
            last_tick = Instant::now();
        }

        if game.quit {
            break;
        }

        renderer.render(game)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
