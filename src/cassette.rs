use crate::kinematics::Aabb;
use crate::progression::Progression;
use macroquad::math::{vec2, Vec2};

pub const CASSETTE_SIZE: Vec2 = Vec2::new(40.0, 25.0);
const BOB_SPEED: f32 = 2.0;
const BOB_HEIGHT: f32 = 10.0;

/// Known soundtrack entries. The first four are the story tracks whose
/// cassettes grant abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    MakeSomeNoize,
    Vidihay,
    Vselennaya,
    IgraSlov,
    MoeMore,
    Mercedes,
}

impl Track {
    pub const ALL: [Track; 6] = [
        Track::MakeSomeNoize,
        Track::Vidihay,
        Track::Vselennaya,
        Track::IgraSlov,
        Track::MoeMore,
        Track::Mercedes,
    ];

    pub const STORY: [Track; 4] = [
        Track::MakeSomeNoize,
        Track::Vidihay,
        Track::Vselennaya,
        Track::IgraSlov,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Track::MakeSomeNoize => "make_some_noize",
            Track::Vidihay => "vidihay",
            Track::Vselennaya => "vselennaya",
            Track::IgraSlov => "igra_slov",
            Track::MoeMore => "moe_more",
            Track::Mercedes => "mercedes",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Track::MakeSomeNoize => "Make Some Noize",
            Track::Vidihay => "Vidihay",
            Track::Vselennaya => "Vselennaya",
            Track::IgraSlov => "Igra Slov",
            Track::MoeMore => "Moe More",
            Track::Mercedes => "Mercedes",
        }
    }
}

pub fn track_display_name(id: &str) -> &str {
    Track::from_id(id).map(Track::display_name).unwrap_or(id)
}

#[derive(Debug, Clone)]
pub struct Cassette {
    pub track_id: String,
    pub position: Vec2,
    pub collected: bool,
    origin_y: f32,
    bob_time: f32,
}

impl Cassette {
    pub fn new(track_id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            track_id: track_id.into(),
            position: vec2(x, y),
            collected: false,
            origin_y: y,
            bob_time: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.collected {
            return;
        }
        self.bob_time += dt;
        self.position.y = self.origin_y + (self.bob_time * BOB_SPEED).sin() * BOB_HEIGHT;
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::at(self.position, CASSETTE_SIZE)
    }

    /// Picks the cassette up once. Returns false if it was already taken.
    pub fn collect(&mut self, progress: &mut Progression) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        progress.collect_cassette(&self.track_id);
        true
    }
}
