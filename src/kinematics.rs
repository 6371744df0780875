use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};

pub const WORLD_WIDTH: f32 = 1920.0;
pub const WORLD_HEIGHT: f32 = 1080.0;
pub const FLOOR_Y: f32 = 100.0;

/// Axis-aligned box anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn at(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open overlap test: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub gravity: f32,
    pub flying: bool,
    pub grounded: bool,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2, gravity: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            gravity,
            flying: false,
            grounded: false,
        }
    }

    pub fn flyer(position: Vec2, size: Vec2) -> Self {
        Self {
            flying: true,
            ..Self::new(position, size, 0.0)
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::at(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    pub fn step(&mut self, dt: f32, floor_y: f32) {
        if !self.flying {
            self.velocity.y -= self.gravity * dt;
        }

        self.position += self.velocity * dt;

        if !self.flying {
            self.clamp_to_floor(floor_y);
        }
    }

    /// Like [`Body::step`], but a falling body also lands on the top face of
    /// any platform its feet crossed during the step. Platforms are one-way:
    /// bodies pass through them from below.
    pub fn step_on(&mut self, dt: f32, floor_y: f32, platforms: &[Aabb]) {
        let previous_bottom = self.position.y;
        self.step(dt, floor_y);
        if self.flying || self.grounded || self.velocity.y > 0.0 {
            return;
        }

        let left = self.position.x;
        let right = self.position.x + self.size.x;
        let landing = platforms.iter().find(|p| {
            left < p.right() && p.x < right && previous_bottom >= p.top() && self.position.y < p.top()
        });
        if let Some(platform) = landing {
            self.position.y = platform.top();
            self.velocity.y = 0.0;
            self.grounded = true;
        }
    }

    pub fn clamp_to_floor(&mut self, floor_y: f32) {
        if self.position.y <= floor_y {
            self.position.y = floor_y;
            self.velocity.y = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    pub fn clamp_to_width(&mut self, world_width: f32) {
        let max_x = (world_width - self.size.x).max(0.0);
        self.position.x = self.position.x.clamp(0.0, max_x);
    }
}
