//! Dino Runner entry point
//!
//! Browser builds wire keyboard input, the animation-frame loop, Web Audio and
//! LocalStorage to a `Session`. Native builds run a seeded headless autopilot
//! and log what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use dino_runner::consts::*;
use dino_runner::sim::{GameState, ObstacleKind};

/// Simple look-ahead pilot: jump ground hazards, duck low flyers
///
/// Returns `(jump, duck)` for the next update.
fn autopilot<R: rand::Rng>(state: &GameState<R>) -> (bool, bool) {
    let player = state.player.hitbox();
    let standing_top = state.player.pos.y + HITBOX_INSET;
    let lead = state.run.speed * 4.0;

    let Some(next) = state.field.iter().find(|o| o.hitbox().right() > player.left()) else {
        return (false, false);
    };
    let gap = next.pos.x - player.right();
    match next.kind {
        ObstacleKind::GroundHazard => (gap < lead, false),
        ObstacleKind::Flyer => {
            let low = next.hitbox().bottom() > standing_top;
            (false, low && gap < lead * 2.0)
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use dino_runner::audio::AudioManager;
    use dino_runner::highscores::format_score;
    use dino_runner::persistence::{KvPersistence, LocalStorage, MemoryStorage, Storage};
    use dino_runner::platform::FrameClock;
    use dino_runner::sim::GamePhase;
    use dino_runner::Session;

    type Store = KvPersistence<Box<dyn Storage>>;

    /// Game instance holding all state
    struct Game {
        session: Session<Store>,
        audio: AudioManager,
        clock: FrameClock,
        autopilot: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let storage: Box<dyn Storage> = match LocalStorage::new() {
                Ok(local) => Box::new(local),
                Err(e) => {
                    log::warn!("{} - scores will not persist", e);
                    Box::new(MemoryStorage::new())
                }
            };
            let session = Session::new(seed, KvPersistence::new(storage));
            let audio = AudioManager::new(&session.settings());
            Self {
                session,
                audio,
                clock: FrameClock::new(),
                autopilot: false,
            }
        }

        /// Space / ArrowUp: start, restart or jump depending on phase
        fn primary_action(&mut self) {
            match self.session.phase() {
                GamePhase::Menu => self.session.start_command(),
                GamePhase::GameOver => self.session.restart_command(),
                GamePhase::Playing => self.session.jump_command(),
                GamePhase::Loading | GamePhase::Error => {}
            }
        }

        fn update(&mut self, time: f64) {
            let secs = self.clock.seconds_between(time);
            let dt = self.clock.step(time);

            if self.autopilot {
                let (jump, duck) = super::autopilot(self.session.state());
                if jump {
                    self.session.jump_command();
                }
                self.session.duck_command(duck);
            }

            self.session.update(dt);
            for event in self.session.drain_events() {
                self.audio.handle(&event);
            }
            self.audio.tick(secs);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&format_score(self.session.score())));
            }
            if let Some(el) = document.get_element_by_id("hud-best") {
                el.set_text_content(Some(&format!("HI {}", format_score(self.session.high_score()))));
            }

            let snapshot = self.session.snapshot();
            if let Some(el) = document.get_element_by_id("status") {
                let text = match snapshot.phase {
                    GamePhase::Loading => "Loading...".to_string(),
                    GamePhase::Error => format!(
                        "Failed to load: {}",
                        self.session.state().error.as_deref().unwrap_or("unknown error")
                    ),
                    GamePhase::Menu => "Press SPACE to start".to_string(),
                    GamePhase::Playing => String::new(),
                    GamePhase::GameOver => "GAME OVER - SPACE to retry, ESC for menu".to_string(),
                };
                el.set_text_content(Some(&text));
            }
            if let Some(body) = document.body() {
                let theme = if snapshot.night { "night" } else { "day" };
                let _ = body.set_attribute("data-theme", theme);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Dino Runner starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // The page owns the sprites; a missing document means nothing can draw
        {
            let mut g = game.borrow_mut();
            g.session.begin_loading();
            match window.document() {
                Some(document) => {
                    // Hide loading indicator
                    if let Some(loading) = document.get_element_by_id("loading") {
                        let _ = loading.set_attribute("class", "hidden");
                    }
                    g.session.assets_loaded();
                }
                None => g.session.assets_failed("no document"),
            }
        }

        setup_input_handlers(&window, game.clone());
        setup_visibility_reset(game.clone());
        request_animation_frame(game);

        log::info!("Dino Runner running!");
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "ArrowUp" => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.primary_action();
                        }
                    }
                    "ArrowDown" => {
                        event.prevent_default();
                        g.session.duck_command(true);
                    }
                    "Escape" => g.session.menu_command(),
                    "m" | "M" => g.session.mute_toggle_command(),
                    "a" | "A" => {
                        g.autopilot = !g.autopilot;
                        log::info!("Autopilot: {}", g.autopilot);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up (duck is held)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "ArrowDown" {
                    game.borrow_mut().session.duck_command(false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Hidden tabs stop animation frames; drop the stale timestamp so the
    /// first frame back is not a capped catch-up step
    fn setup_visibility_reset(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                g.clock.reset();
                // The keyup for a held duck is lost while hidden
                g.session.duck_command(false);
                log::info!("Tab hidden, frame clock reset");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run options
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
struct Config {
    seed: u64,
    tuning: Option<std::path::PathBuf>,
    store: Option<std::path::PathBuf>,
    frames: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 42,
            tuning: None,
            store: None,
            frames: 10_000,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_args(args: &[String]) -> Result<Config, String> {
    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("{flag} requires a value"))
    }

    let mut config = Config::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                config.seed = value(args, i, "--seed")?
                    .parse()
                    .map_err(|_| "--seed requires a number".to_string())?;
            }
            "--frames" => {
                i += 1;
                config.frames = value(args, i, "--frames")?
                    .parse()
                    .map_err(|_| "--frames requires a number".to_string())?;
            }
            "--tuning" => {
                i += 1;
                config.tuning = Some(value(args, i, "--tuning")?.into());
            }
            "--store" => {
                i += 1;
                config.store = Some(value(args, i, "--store")?.into());
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(config)
}

#[cfg(not(target_arch = "wasm32"))]
fn print_usage() {
    eprintln!(
        "Dino Runner headless autopilot\n\
         \n\
         Usage: dino-runner [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --seed N        RNG seed (default: 42)\n\
         \x20 --tuning FILE   Balance overrides as JSON\n\
         \x20 --store FILE    Persist high score/settings to a JSON file\n\
         \x20 --frames N      Frames to simulate across runs (default: 10000)\n\
         \x20 --help, -h      Show this help\n\
         \n\
         Set RUST_LOG=debug for per-spawn and per-sound logging."
    );
}

/// Play runs back to back until the frame budget is spent
#[cfg(not(target_arch = "wasm32"))]
fn run_headless<P: dino_runner::persistence::Persistence>(
    mut session: dino_runner::Session<P>,
    frames: u64,
) {
    use dino_runner::audio::AudioManager;
    use dino_runner::highscores::format_score;
    use dino_runner::sim::{GameEvent, GamePhase};

    let mut audio = AudioManager::new(&session.settings());
    let mut runs = Vec::new();

    session.start_command();
    for _ in 0..frames {
        let (jump, duck) = autopilot(session.state());
        if jump {
            session.jump_command();
        }
        session.duck_command(duck);
        session.update(1.0);

        for event in session.drain_events() {
            match event {
                GameEvent::Milestone { score } => log::info!("Milestone {}", score),
                GameEvent::GameOver { score } => runs.push(score),
                GameEvent::NewHighScore { score } => {
                    log::info!("New best {}", format_score(score))
                }
                _ => {}
            }
            audio.handle(&event);
        }
        audio.tick(NOMINAL_FRAME_MS / 1000.0);

        if session.phase() == GamePhase::GameOver {
            session.restart_command();
        }
    }

    let total: u64 = runs.iter().map(|&s| s as u64).sum();
    log::info!(
        "Finished: {} completed runs, mean score {}, current score {}, best {}",
        runs.len(),
        if runs.is_empty() { 0 } else { total / runs.len() as u64 },
        format_score(session.score()),
        format_score(session.high_score())
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dino_runner::persistence::{FileStorage, KvPersistence, MemoryStorage, Storage};
    use dino_runner::{Session, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            std::process::exit(2);
        }
    };

    let tuning = match &config.tuning {
        Some(path) => match Tuning::from_file(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    log::info!(
        "Dino Runner (native) starting: seed {}, {} frames",
        config.seed,
        config.frames
    );

    let storage: Box<dyn Storage> = match &config.store {
        Some(path) => match FileStorage::open(path) {
            Ok(storage) => {
                log::info!("Persisting to {}", storage.path().display());
                Box::new(storage)
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Box::new(MemoryStorage::new()),
    };
    let session = Session::with_tuning(config.seed, tuning, KvPersistence::new(storage));
    match session {
        Ok(session) => run_headless(session, config.frames),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
