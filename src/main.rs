mod controls;
mod present;
#[cfg(feature = "audio")]
mod sound;

use crate::controls::Controls;
use crate::present::View;
use macroquad::prelude::*;
use noize_voice::cassette::Track;
use noize_voice::level::LevelCatalog;
use noize_voice::minigame::MiniGameKind;
use noize_voice::rules::{load_rules, save_rules, DEFAULT_RULES_PATH};
use noize_voice::save::{JsonFileStore, SaveSystem};
use noize_voice::session::{GameSession, Mode, SessionEvent};
use noize_voice::AudioSink;
#[cfg(not(feature = "audio"))]
use noize_voice::HeadlessAudio;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const RESOLUTIONS: &[(f32, f32)] = &[
    (800.0, 600.0),
    (1280.0, 720.0),
    (1600.0, 900.0),
    (1920.0, 1080.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    MainMenu,
    LevelSelect,
    Extras,
    Playing,
    Paused,
    Finished,
}

#[macroquad::main("Noize Voice")]
async fn main() {
    init_tracing();

    let mut rules = load_rules(DEFAULT_RULES_PATH);
    let index = rules.resolution_index.min(RESOLUTIONS.len() - 1);
    let (w, h) = RESOLUTIONS[index];
    request_new_screen_size(w, h);

    let controls = Controls::from_rules(&rules);
    let levels = LevelCatalog::load_or_builtin(rules.level_catalog_path.as_deref());
    #[cfg(feature = "audio")]
    let audio: Box<dyn AudioSink> =
        Box::new(sound::MacroquadAudio::load(rules.rhythm_track_length).await);
    #[cfg(not(feature = "audio"))]
    let audio: Box<dyn AudioSink> = Box::new(HeadlessAudio::new(rules.rhythm_track_length));
    let mut saves = SaveSystem::new(JsonFileStore::open_or_empty(&rules.save_path));
    let mut session = GameSession::new(rules.clone(), levels, audio);

    let mut screen = Screen::MainMenu;
    let mut menu_index = 0usize;
    let mut select_index = 0usize;
    let mut extras_index = 0usize;
    let mut pause_index = 0usize;

    loop {
        let dt = get_frame_time();
        let up = is_key_pressed(KeyCode::Up);
        let down = is_key_pressed(KeyCode::Down);
        let confirm = is_key_pressed(KeyCode::Enter);
        let back = is_key_pressed(controls.pause);

        match screen {
            Screen::MainMenu => {
                let count = main_menu_options(&saves).len();
                menu_index = step_index(menu_index, count, up, down);
                if confirm {
                    match menu_index {
                        0 => {
                            session.new_game();
                            if session.start_level(noize_voice::level::FIRST_LEVEL) {
                                screen = Screen::Playing;
                            }
                        }
                        1 => match session.load_from(&saves) {
                            Ok(()) => {
                                select_index = 0;
                                screen = Screen::LevelSelect;
                            }
                            Err(e) => warn!(error = %e, "continue_failed"),
                        },
                        2 => {
                            select_index = 0;
                            screen = Screen::LevelSelect;
                        }
                        3 => {
                            extras_index = 0;
                            screen = Screen::Extras;
                        }
                        _ => break,
                    }
                }
            }
            Screen::LevelSelect => {
                let ids = unlocked_levels(&session);
                select_index = step_index(select_index, ids.len(), up, down);
                if back {
                    screen = Screen::MainMenu;
                } else if confirm {
                    if let Some(id) = ids.get(select_index) {
                        if session.start_level(id) {
                            screen = Screen::Playing;
                        }
                    }
                }
            }
            Screen::Extras => {
                let entries = extras(&session);
                extras_index = step_index(extras_index, entries.len(), up, down);
                if back {
                    screen = Screen::MainMenu;
                } else if confirm {
                    let started = match entries.get(extras_index) {
                        Some(Extra::Rhythm(track)) => session.start_rhythm_battle(track.id()),
                        Some(Extra::MiniGame(kind)) => session.start_mini_game(*kind),
                        None => false,
                    };
                    if started {
                        screen = Screen::Playing;
                    }
                }
            }
            Screen::Playing => {
                let modal = session.dialogue().is_active()
                    || match session.mode() {
                        Mode::Rhythm(_) | Mode::MiniGame(_) => true,
                        Mode::Boss(encounter) => encounter.rhythm().is_active(),
                        _ => false,
                    };
                if back && modal {
                    session.cancel_modal();
                } else if back {
                    session.set_paused(true);
                    pause_index = 0;
                    screen = Screen::Paused;
                }

                if screen == Screen::Playing {
                    let input = controls.poll();
                    for event in session.advance(dt, &input) {
                        match event {
                            SessionEvent::LevelCompleted { level_id, .. } => {
                                info!(level = %level_id, "autosave_after_level");
                                if let Err(e) = saves.auto_save(session.progress(), now_millis()) {
                                    error!(error = %e, "autosave_failed");
                                }
                            }
                            SessionEvent::GameCompleted => screen = Screen::Finished,
                            _ => {}
                        }
                    }
                    if screen == Screen::Playing
                        && matches!(session.mode(), Mode::Idle)
                        && !session.dialogue().is_active()
                    {
                        screen = Screen::MainMenu;
                    }
                }
            }
            Screen::Paused => {
                pause_index = step_index(pause_index, PAUSE_OPTIONS.len(), up, down);
                if back {
                    session.set_paused(false);
                    screen = Screen::Playing;
                } else if confirm {
                    match pause_index {
                        0 => {
                            session.set_paused(false);
                            screen = Screen::Playing;
                        }
                        1 => {
                            if let Err(e) = session.save_to(&mut saves, now_millis()) {
                                error!(error = %e, "save_failed");
                            }
                        }
                        2 => {
                            let audio = session.audio_mut();
                            audio.toggle_music();
                            rules.music_enabled = audio.music_enabled();
                            if let Err(e) = save_rules(DEFAULT_RULES_PATH, &rules) {
                                warn!(error = %e, "rules_save_failed");
                            }
                        }
                        _ => {
                            session.set_paused(false);
                            session.leave_level();
                            screen = Screen::MainMenu;
                        }
                    }
                }
            }
            Screen::Finished => {
                if confirm || back {
                    screen = Screen::MainMenu;
                }
            }
        }

        clear_background(Color::new(0.05, 0.04, 0.08, 1.0));
        let view = View::fit();

        match screen {
            Screen::MainMenu => {
                present::draw_menu("NOIZE VOICE", &main_menu_options(&saves), menu_index);
            }
            Screen::LevelSelect => {
                let names: Vec<String> = unlocked_levels(&session)
                    .iter()
                    .filter_map(|id| session.levels().level(id))
                    .map(|def| {
                        let done = if session.progress().is_level_completed(&def.id) { " *" } else { "" };
                        format!("Act {} - {}{}", def.act, def.name, done)
                    })
                    .collect();
                present::draw_menu("Choose a level", &names, select_index);
            }
            Screen::Extras => {
                let names: Vec<String> = extras(&session).iter().map(Extra::label).collect();
                present::draw_menu("Extras", &names, extras_index);
            }
            Screen::Playing | Screen::Paused => {
                match session.mode() {
                    Mode::Level(run) => present::draw_level(&view, run),
                    Mode::Boss(encounter) => present::draw_boss(&view, encounter),
                    Mode::Rhythm(battle) => present::draw_rhythm(&view, battle),
                    Mode::MiniGame(game) => present::draw_mini_game(game),
                    Mode::Idle => {}
                }
                present::draw_particles(&view, session.particles());
                if matches!(session.mode(), Mode::Level(_) | Mode::Boss(_)) {
                    present::draw_hud(session.progress());
                }
                present::draw_dialogue(session.dialogue());
                present::draw_notices(session.notices());

                if screen == Screen::Paused {
                    draw_rectangle(
                        0.0,
                        0.0,
                        screen_width(),
                        screen_height(),
                        Color::new(0.0, 0.0, 0.0, 0.6),
                    );
                    let options: Vec<String> = PAUSE_OPTIONS.iter().map(|s| s.to_string()).collect();
                    present::draw_menu("Paused", &options, pause_index);
                }
            }
            Screen::Finished => {
                let progress = session.progress();
                let lines = vec![
                    format!("Cassettes: {}", progress.cassette_count()),
                    format!("Memories: {}", progress.memory_count()),
                    format!("Play time: {:.0}s", progress.play_time()),
                    "Enter: back to menu".to_string(),
                ];
                present::draw_menu("The voice is back", &lines, lines.len() - 1);
            }
        }

        if session.rules().show_fps {
            draw_text(
                &format!("FPS: {}", get_fps()),
                screen_width() - 140.0,
                screen_height() - 16.0,
                20.0,
                GREEN,
            );
        }

        next_frame().await;
    }
}

const PAUSE_OPTIONS: [&str; 4] = ["Resume", "Save", "Toggle music", "Quit to menu"];

enum Extra {
    Rhythm(Track),
    MiniGame(MiniGameKind),
}

impl Extra {
    fn label(&self) -> String {
        match self {
            Extra::Rhythm(track) => format!("Rhythm battle: {}", track.display_name()),
            Extra::MiniGame(kind) => format!("Mini-game: {}", kind.title()),
        }
    }
}

/// Rhythm battles for every collected track, then the mini-games.
fn extras(session: &GameSession) -> Vec<Extra> {
    Track::ALL
        .into_iter()
        .filter(|t| session.progress().has_cassette(t.id()))
        .map(Extra::Rhythm)
        .chain(MiniGameKind::ALL.into_iter().map(Extra::MiniGame))
        .collect()
}

fn unlocked_levels(session: &GameSession) -> Vec<String> {
    session
        .levels()
        .levels()
        .iter()
        .filter(|def| session.levels().is_level_unlocked(&def.id, session.progress()))
        .map(|def| def.id.clone())
        .collect()
}

fn main_menu_options(saves: &SaveSystem<JsonFileStore>) -> Vec<String> {
    let continue_label = match saves.save_info() {
        Some(info) => format!(
            "Continue (act {}, {} cassettes)",
            info.current_act, info.cassettes
        ),
        None => "Continue (no save)".to_string(),
    };
    vec![
        "New game".to_string(),
        continue_label,
        "Level select".to_string(),
        "Extras".to_string(),
        "Quit".to_string(),
    ]
}

fn step_index(index: usize, len: usize, up: bool, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    let index = index.min(len - 1);
    if up {
        (index + len - 1) % len
    } else if down {
        (index + 1) % len
    } else {
        index
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
