pub mod ability;
pub mod audio;
pub mod boss;
pub mod cassette;
pub mod dialogue;
pub mod enemy;
pub mod kinematics;
pub mod level;
pub mod level_run;
pub mod minigame;
pub mod particles;
pub mod player;
pub mod progression;
pub mod quest;
pub mod rhythm;
pub mod rules;
pub mod save;
pub mod session;

pub use ability::Ability;
pub use audio::{AudioSink, HeadlessAudio};
pub use progression::{ProgressEvent, Progression};
pub use session::GameSession;
