//! Session orchestration
//!
//! Owns the `GameState`, the queued input for the next update, and the
//! persistence collaborator. Input handlers only queue intent; persistence is
//! touched on phase transitions (run start, game over) and on mute toggles,
//! never in the middle of a physics step.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::highscores::HighScore;
use crate::persistence::Persistence;
use crate::settings::{Settings, SettingsPatch};
use crate::sim::{GameEvent, GamePhase, GameState, Snapshot, TickInput, tick};
use crate::tuning::{Tuning, TuningError};

pub struct Session<P: Persistence, R: Rng = Pcg32> {
    state: GameState<R>,
    input: TickInput,
    /// Best score as last read from or written to the store
    high_score: HighScore,
    /// Best shown to the player; follows the current run once it passes `high_score`
    live_best: u32,
    settings: Settings,
    store: P,
    last_phase: GamePhase,
}

impl<P: Persistence> Session<P, Pcg32> {
    /// Seeded session with default tuning and the default random source
    pub fn new(seed: u64, store: P) -> Self {
        Self::with_state(GameState::new(seed), store)
    }

    /// Seeded session with custom tuning; invalid tuning is rejected up front
    pub fn with_tuning(seed: u64, tuning: Tuning, store: P) -> Result<Self, TuningError> {
        Ok(Self::with_state(GameState::with_tuning(seed, tuning)?, store))
    }
}

impl<P: Persistence, R: Rng> Session<P, R> {
    /// Wrap an existing state; settings and best score are read once here
    pub fn with_state(state: GameState<R>, mut store: P) -> Self {
        let settings = store.load_settings();
        let high_score = HighScore::new(store.load_high_score());
        log::info!(
            "Session ready (best {}, sound {})",
            high_score.best,
            if settings.sound_on { "on" } else { "off" }
        );
        let last_phase = state.phase;
        Self {
            state,
            input: TickInput::default(),
            live_best: high_score.best,
            high_score,
            settings,
            store,
            last_phase,
        }
    }

    // === Input handlers ===

    pub fn start_command(&mut self) {
        self.input.start = true;
    }

    pub fn restart_command(&mut self) {
        self.input.restart = true;
    }

    pub fn menu_command(&mut self) {
        self.input.menu = true;
    }

    pub fn jump_command(&mut self) {
        self.input.jump = true;
    }

    /// Duck is held state: it stays active until released
    pub fn duck_command(&mut self, active: bool) {
        self.input.duck = active;
    }

    /// Flip sound on/off and persist the change
    pub fn mute_toggle_command(&mut self) {
        let patch = SettingsPatch::sound(!self.settings.sound_on);
        self.settings = self.store.save_settings(&patch);
        let on = self.settings.sound_on;
        log::info!("Sound {}", if on { "on" } else { "off" });
        self.state.events.push(GameEvent::SoundToggled { on });
    }

    // === Asset gate ===

    pub fn begin_loading(&mut self) {
        self.state.begin_loading();
        self.last_phase = self.state.phase;
    }

    pub fn assets_loaded(&mut self) {
        self.state.finish_loading(Ok(()));
        self.last_phase = self.state.phase;
    }

    pub fn assets_failed(&mut self, reason: impl Into<String>) {
        self.state.finish_loading(Err(reason.into()));
        self.last_phase = self.state.phase;
    }

    // === Frame step ===

    /// Apply queued input and advance by `dt` frames
    pub fn update(&mut self, dt: f32) {
        tick(&mut self.state, &self.input, dt);
        self.input.clear_one_shots();
        self.on_phase_change();
        if self.state.phase == GamePhase::Playing {
            self.live_best = self.live_best.max(self.state.run.score);
        }
    }

    fn on_phase_change(&mut self) {
        let phase = self.state.phase;
        if phase == self.last_phase {
            return;
        }
        match phase {
            GamePhase::Playing => {
                self.high_score = HighScore::new(self.store.load_high_score());
                self.live_best = self.high_score.best;
            }
            GamePhase::GameOver => {
                let score = self.state.run.score;
                if self.high_score.record(score) {
                    log::info!("New high score: {}", score);
                    self.store.save_high_score(score);
                    self.state.events.push(GameEvent::NewHighScore { score });
                }
                self.live_best = self.high_score.best;
            }
            _ => {}
        }
        self.last_phase = phase;
    }

    // === Accessors ===

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &GameState<R> {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.run.score
    }

    /// Best score for display, including the run in progress
    pub fn high_score(&self) -> u32 {
        self.live_best
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KvPersistence, MemoryStorage, Storage};

    /// Records every collaborator call
    #[derive(Default)]
    struct RecordingStore {
        best: u32,
        settings: Settings,
        high_score_loads: u32,
        high_score_saves: Vec<u32>,
        settings_saves: Vec<SettingsPatch>,
    }

    impl Persistence for RecordingStore {
        fn load_high_score(&mut self) -> u32 {
            self.high_score_loads += 1;
            self.best
        }

        fn save_high_score(&mut self, score: u32) {
            self.high_score_saves.push(score);
            self.best = score;
        }

        fn load_settings(&mut self) -> Settings {
            self.settings
        }

        fn save_settings(&mut self, patch: &SettingsPatch) -> Settings {
            self.settings_saves.push(*patch);
            self.settings = self.settings.patched(patch);
            self.settings
        }
    }

    fn store_with_best(best: u32) -> RecordingStore {
        RecordingStore {
            best,
            ..Default::default()
        }
    }

    /// Start a run and step with no input until it ends
    fn run_to_game_over<P: Persistence>(session: &mut Session<P>) -> u32 {
        session.start_command();
        let mut frames = 0;
        while frames < 10_000 {
            session.update(1.0);
            frames += 1;
            if session.phase() == GamePhase::GameOver {
                break;
            }
        }
        frames
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let tuning = Tuning {
            milestone_interval: 0,
            ..Default::default()
        };
        let result = Session::with_tuning(1, tuning, RecordingStore::default());
        assert!(matches!(result, Err(TuningError::Invalid(_))));

        let tuning = Tuning {
            flyer_chance: 1.5,
            flyer_min_score: 0,
            ..Default::default()
        };
        let result = Session::with_tuning(1, tuning, RecordingStore::default());
        assert!(matches!(result, Err(TuningError::Invalid(_))));
    }

    #[test]
    fn test_custom_tuning_reaches_the_run() {
        let tuning = Tuning {
            milestone_interval: 10,
            ..Default::default()
        };
        let mut session = Session::with_tuning(2024, tuning, RecordingStore::default()).unwrap();
        run_to_game_over(&mut session);
        let milestones = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Milestone { .. }))
            .count();
        assert_eq!(milestones as u32, session.score() / 10);
    }

    #[test]
    fn test_commands_are_queued_until_update() {
        let mut session = Session::new(1, RecordingStore::default());
        session.start_command();
        assert_eq!(session.phase(), GamePhase::Menu);
        session.update(1.0);
        assert_eq!(session.phase(), GamePhase::Playing);

        // One-shots do not repeat on the next update
        session.jump_command();
        session.update(1.0);
        let jumps = session
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::Jump)
            .count();
        assert_eq!(jumps, 1);
        assert!(!session.state().player.grounded);
    }

    #[test]
    fn test_duck_is_held_across_updates() {
        let mut session = Session::new(1, RecordingStore::default());
        session.start_command();
        session.update(1.0);
        session.duck_command(true);
        session.update(1.0);
        session.update(1.0);
        assert!(session.state().player.ducking);
        session.duck_command(false);
        session.update(1.0);
        assert!(!session.state().player.ducking);
    }

    #[test]
    fn test_best_loaded_on_run_start() {
        let mut session = Session::new(1, store_with_best(3));
        assert_eq!(session.store().high_score_loads, 1);
        session.start_command();
        session.update(1.0);
        assert_eq!(session.store().high_score_loads, 2);
        // Mid-run frames never touch persistence
        for _ in 0..20 {
            session.update(1.0);
        }
        assert_eq!(session.store().high_score_loads, 2);
    }

    #[test]
    fn test_new_best_is_saved_on_game_over() {
        let mut session = Session::new(2024, store_with_best(5));
        run_to_game_over(&mut session);

        let score = session.score();
        assert!(score > 5, "score = {}", score);
        assert_eq!(session.store().high_score_saves, vec![score]);
        assert_eq!(session.high_score(), score);
        assert!(session
            .drain_events()
            .contains(&GameEvent::NewHighScore { score }));
    }

    #[test]
    fn test_high_score_tracks_run_without_saving() {
        let mut session = Session::new(2024, store_with_best(5));
        session.start_command();
        session.update(1.0);
        assert_eq!(session.high_score(), 5);

        while session.score() <= 10 {
            session.update(1.0);
            assert_eq!(session.phase(), GamePhase::Playing);
        }
        assert_eq!(session.high_score(), session.score());
        assert!(session.store().high_score_saves.is_empty());

        while session.phase() == GamePhase::Playing {
            session.update(1.0);
        }
        let score = session.score();
        assert_eq!(session.high_score(), score);
        assert_eq!(session.store().high_score_saves, vec![score]);
    }

    #[test]
    fn test_lower_score_is_not_saved() {
        let mut session = Session::new(2024, store_with_best(5_000));
        run_to_game_over(&mut session);
        assert!(session.store().high_score_saves.is_empty());
        assert_eq!(session.high_score(), 5_000);
        assert!(!session
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::NewHighScore { .. })));
    }

    #[test]
    fn test_equal_score_is_not_saved() {
        // Same seed, same run: the second run only ties the first
        let mut session = Session::new(2024, RecordingStore::default());
        run_to_game_over(&mut session);
        let first = session.score();
        assert_eq!(session.store().high_score_saves, vec![first]);

        let mut replay = Session::new(2024, store_with_best(first));
        run_to_game_over(&mut replay);
        assert_eq!(replay.score(), first);
        assert!(replay.store().high_score_saves.is_empty());
    }

    #[test]
    fn test_end_to_end_with_key_value_store() {
        let mut storage = MemoryStorage::new();
        storage.set_item("dino_highscore", "2").unwrap();
        let mut session = Session::new(2024, KvPersistence::new(storage));

        let frames = run_to_game_over(&mut session);
        assert_eq!(frames, 103);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::Collision { obstacle_id: 1 }));

        let stored = session
            .store()
            .storage()
            .get_item("dino_highscore")
            .unwrap()
            .unwrap();
        assert_eq!(stored, session.score().to_string());
    }

    #[test]
    fn test_restart_and_menu_after_game_over() {
        let mut session = Session::new(2024, RecordingStore::default());
        run_to_game_over(&mut session);

        session.menu_command();
        session.update(1.0);
        assert_eq!(session.phase(), GamePhase::Menu);
        assert_eq!(session.score(), 0);

        run_to_game_over(&mut session);
        session.restart_command();
        session.update(1.0);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.state().runs_started, 3);
    }

    #[test]
    fn test_mute_toggle_persists_patch() {
        let mut session = Session::new(1, RecordingStore::default());
        assert!(session.settings().sound_on);

        session.mute_toggle_command();
        assert!(!session.settings().sound_on);
        session.mute_toggle_command();
        assert!(session.settings().sound_on);

        assert_eq!(
            session.store().settings_saves,
            vec![SettingsPatch::sound(false), SettingsPatch::sound(true)]
        );
        assert_eq!(
            session.drain_events(),
            vec![
                GameEvent::SoundToggled { on: false },
                GameEvent::SoundToggled { on: true }
            ]
        );
    }

    #[test]
    fn test_failed_assets_block_start() {
        let mut session = Session::new(1, RecordingStore::default());
        session.begin_loading();
        session.start_command();
        session.update(1.0);
        assert_eq!(session.phase(), GamePhase::Loading);

        session.assets_failed("atlas missing");
        session.start_command();
        session.update(1.0);
        assert_eq!(session.phase(), GamePhase::Error);
        assert_eq!(session.state().error.as_deref(), Some("atlas missing"));
    }

    #[test]
    fn test_loaded_assets_open_menu() {
        let mut session = Session::new(1, RecordingStore::default());
        session.begin_loading();
        session.assets_loaded();
        session.start_command();
        session.update(1.0);
        assert_eq!(session.phase(), GamePhase::Playing);
    }
}
