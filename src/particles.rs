use macroquad::math::{vec2, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    SoundWave,
    MusicNote,
    EnergySpark,
    CassetteGlow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub lifetime: f32,
    pub max_lifetime: f32,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 0.0;
        }
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }
}

/// Purely cosmetic. Nothing in the simulation reads particle state.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Ring of particles pushed out evenly between two angles.
    fn emit_ring(
        &mut self,
        kind: ParticleKind,
        origin: Vec2,
        count: u32,
        angle_start: f32,
        angle_end: f32,
        speed: f32,
        size: f32,
        lifetime: f32,
    ) {
        if count == 0 {
            return;
        }
        let delta = (angle_end - angle_start) / count as f32;
        for i in 0..count {
            let angle = angle_start + delta * i as f32;
            self.particles.push(Particle {
                kind,
                position: origin,
                velocity: vec2(angle.cos(), angle.sin()) * speed,
                size,
                lifetime,
                max_lifetime: lifetime,
            });
        }
    }

    pub fn sound_wave(&mut self, origin: Vec2) {
        self.emit_ring(ParticleKind::SoundWave, origin, 12, 0.0, TAU, 220.0, 6.0, 0.6);
    }

    pub fn music_notes(&mut self, origin: Vec2, rng: &mut impl Rng) {
        for _ in 0..6 {
            let lifetime = rng.gen_range(0.8..1.4);
            self.particles.push(Particle {
                kind: ParticleKind::MusicNote,
                position: origin + vec2(rng.gen_range(-20.0..20.0), 0.0),
                velocity: vec2(rng.gen_range(-40.0..40.0), rng.gen_range(60.0..120.0)),
                size: 10.0,
                lifetime,
                max_lifetime: lifetime,
            });
        }
    }

    pub fn energy_burst(&mut self, origin: Vec2, rng: &mut impl Rng) {
        for _ in 0..16 {
            let angle = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(80.0..260.0);
            self.particles.push(Particle {
                kind: ParticleKind::EnergySpark,
                position: origin,
                velocity: vec2(angle.cos(), angle.sin()) * speed,
                size: 4.0,
                lifetime: 0.5,
                max_lifetime: 0.5,
            });
        }
    }

    pub fn cassette_glow(&mut self, origin: Vec2) {
        self.emit_ring(ParticleKind::CassetteGlow, origin, 8, 0.0, TAU, 40.0, 8.0, 0.8);
    }

    pub fn update(&mut self, dt: f32) {
        for p in self.particles.iter_mut() {
            match p.kind {
                ParticleKind::SoundWave => {
                    p.size += 30.0 * dt;
                }
                ParticleKind::MusicNote => {
                    p.velocity.y += 100.0 * dt;
                }
                ParticleKind::EnergySpark => {
                    p.velocity *= (1.0 - 3.0 * dt).max(0.0);
                }
                ParticleKind::CassetteGlow => {
                    p.size += 20.0 * dt;
                }
            }
            p.position += p.velocity * dt;
            p.lifetime -= dt;
        }
        self.particles.retain(|p| p.lifetime > 0.0);
    }
}
