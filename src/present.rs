use macroquad::prelude::*;
use noize_voice::boss::{BossEncounter, BOSS_MAX_HEALTH};
use noize_voice::dialogue::{DialogueSystem, NoticeBoard};
use noize_voice::enemy::{Enemy, EnemyKind};
use noize_voice::kinematics::{Aabb, FLOOR_Y, WORLD_HEIGHT, WORLD_WIDTH};
use noize_voice::level_run::LevelRun;
use noize_voice::minigame::MiniGame;
use noize_voice::particles::{ParticleKind, ParticleSystem};
use noize_voice::player::{Player, PlayerState};
use noize_voice::progression::{Progression, MAX_ENERGY, MAX_HEALTH, TOTAL_CASSETTES};
use noize_voice::rhythm::{lane_x, RhythmBattle, HIT_ZONE_Y, LANES};

/// Maps the y-up world onto the letterboxed window.
#[derive(Debug, Clone, Copy)]
pub struct View {
    scale: f32,
    offset: Vec2,
}

impl View {
    pub fn fit() -> Self {
        let (sw, sh) = (screen_width(), screen_height());
        let scale = (sw / WORLD_WIDTH).min(sh / WORLD_HEIGHT);
        let offset = vec2(
            (sw - WORLD_WIDTH * scale) * 0.5,
            (sh - WORLD_HEIGHT * scale) * 0.5,
        );
        Self { scale, offset }
    }

    pub fn point(&self, p: Vec2) -> Vec2 {
        vec2(
            self.offset.x + p.x * self.scale,
            self.offset.y + (WORLD_HEIGHT - p.y) * self.scale,
        )
    }

    pub fn rect(&self, b: &Aabb) -> Rect {
        let top_left = self.point(vec2(b.x, b.top()));
        Rect::new(top_left.x, top_left.y, b.w * self.scale, b.h * self.scale)
    }

    fn fill(&self, b: &Aabb, color: Color) {
        let r = self.rect(b);
        draw_rectangle(r.x, r.y, r.w, r.h, color);
    }
}

fn draw_ground(view: &View, platforms: &[Aabb]) {
    let floor = Aabb::new(0.0, 0.0, WORLD_WIDTH, FLOOR_Y);
    view.fill(&floor, Color::new(0.15, 0.12, 0.18, 1.0));
    for platform in platforms {
        view.fill(platform, Color::new(0.35, 0.3, 0.4, 1.0));
    }
}

fn draw_player(view: &View, player: &Player, flashing: bool) {
    let mut color = match player.state {
        PlayerState::Attacking => ORANGE,
        PlayerState::UsingAbility => SKYBLUE,
        PlayerState::Stealth => Color::new(0.6, 0.6, 0.9, 0.4),
        _ => WHITE,
    };
    if flashing && (get_time() * 10.0) as i64 % 2 == 0 {
        color.a *= 0.3;
    }
    view.fill(&player.hitbox(), color);

    let r = view.rect(&player.hitbox());
    let eye_x = if player.facing_right { r.x + r.w * 0.7 } else { r.x + r.w * 0.2 };
    draw_rectangle(eye_x, r.y + r.h * 0.15, r.w * 0.1, r.h * 0.08, BLACK);
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::NoiseMaker => RED,
        EnemyKind::Silencer => DARKGRAY,
        EnemyKind::Critic => PURPLE,
        EnemyKind::MediaSpammer => ORANGE,
        EnemyKind::CensorDrone => GRAY,
        EnemyKind::FanaticPhantom => Color::new(0.8, 0.8, 1.0, 0.6),
    }
}

fn draw_enemy(view: &View, enemy: &Enemy) {
    if enemy.defeated {
        return;
    }
    view.fill(&enemy.hitbox(), enemy_color(enemy.kind));

    let stats = enemy.kind.stats();
    let r = view.rect(&enemy.hitbox());
    let frac = enemy.health as f32 / stats.max_health.max(1) as f32;
    draw_rectangle(r.x, r.y - 8.0, r.w, 4.0, DARKGRAY);
    draw_rectangle(r.x, r.y - 8.0, r.w * frac, 4.0, GREEN);
}

pub fn draw_level(view: &View, run: &LevelRun) {
    draw_ground(view, run.platforms());

    for secret in run.secrets().iter().filter(|s| !s.found) {
        view.fill(&secret.hitbox(), Color::new(1.0, 0.9, 0.4, 0.35));
    }
    for cassette in run.cassettes().iter().filter(|c| !c.collected) {
        view.fill(&cassette.hitbox(), GOLD);
    }
    for enemy in run.enemies() {
        draw_enemy(view, enemy);
    }
    draw_player(view, &run.player, run.player_invincible());
}

pub fn draw_boss(view: &View, encounter: &BossEncounter) {
    draw_ground(view, encounter.platforms());

    let boss_color = if encounter.is_defeated() { DARKGRAY } else { MAROON };
    view.fill(&encounter.boss_hitbox(), boss_color);

    for wave in encounter.waves() {
        let c = view.point(wave.position);
        draw_circle_lines(c.x, c.y, wave.radius * view.scale, 3.0, PINK);
    }
    draw_player(view, &encounter.player, false);

    let bar_w = screen_width() * 0.5;
    let x = screen_width() * 0.25;
    let frac = encounter.boss_health as f32 / BOSS_MAX_HEALTH as f32;
    draw_rectangle(x, 16.0, bar_w, 14.0, DARKGRAY);
    draw_rectangle(x, 16.0, bar_w * frac, 14.0, RED);
    draw_text(
        &format!("Barkov - {:?}", encounter.phase()),
        x,
        48.0,
        24.0,
        WHITE,
    );

    if encounter.rhythm().is_active() {
        draw_rhythm(view, encounter.rhythm());
    }
}

pub fn draw_rhythm(view: &View, battle: &RhythmBattle) {
    for lane in 0..LANES {
        let top = view.point(vec2(lane_x(lane), WORLD_HEIGHT));
        let bottom = view.point(vec2(lane_x(lane), 0.0));
        draw_line(top.x, top.y, bottom.x, bottom.y, 2.0, Color::new(1.0, 1.0, 1.0, 0.2));
    }
    let left = view.point(vec2(lane_x(0) - 40.0, HIT_ZONE_Y));
    let right = view.point(vec2(lane_x(LANES - 1) + 40.0, HIT_ZONE_Y));
    draw_line(left.x, left.y, right.x, right.y, 4.0, YELLOW);

    for note in battle.notes() {
        let c = view.point(vec2(lane_x(note.lane), note.y));
        let mut color = if note.hit { GREEN } else { SKYBLUE };
        color.a = note.alpha();
        draw_circle(c.x, c.y, 20.0 * view.scale, color);
    }

    draw_text(
        &format!("Score {}  Combo {}  BPM {:.0}", battle.score(), battle.combo(), battle.bpm()),
        16.0,
        screen_height() - 24.0,
        24.0,
        WHITE,
    );
}

pub fn draw_mini_game(game: &MiniGame) {
    let cx = screen_width() * 0.5;
    let cy = screen_height() * 0.5;
    draw_rectangle(cx - 320.0, cy - 120.0, 640.0, 240.0, Color::new(0.0, 0.0, 0.0, 0.8));
    draw_text(game.kind().title(), cx - 300.0, cy - 80.0, 30.0, YELLOW);
    draw_text(game.prompt(), cx - 300.0, cy - 40.0, 24.0, WHITE);
    draw_text(&format!("> {}_", game.input()), cx - 300.0, cy + 10.0, 28.0, GREEN);
    draw_text(
        &format!("Time: {:.0}s   Enter: submit   Esc: give up", game.time_left()),
        cx - 300.0,
        cy + 80.0,
        20.0,
        GRAY,
    );
}

pub fn draw_particles(view: &View, particles: &ParticleSystem) {
    for p in particles.particles() {
        let c = view.point(p.position);
        let mut color = match p.kind {
            ParticleKind::SoundWave => SKYBLUE,
            ParticleKind::MusicNote => PINK,
            ParticleKind::EnergySpark => YELLOW,
            ParticleKind::CassetteGlow => GOLD,
        };
        color.a = p.alpha();
        draw_circle(c.x, c.y, p.size * view.scale, color);
    }
}

pub fn draw_hud(progress: &Progression) {
    let bar = |y: f32, value: u32, max: u32, color: Color| {
        draw_rectangle(16.0, y, 200.0, 12.0, DARKGRAY);
        draw_rectangle(16.0, y, 200.0 * value as f32 / max as f32, 12.0, color);
    };
    bar(16.0, progress.health(), MAX_HEALTH, RED);
    bar(34.0, progress.energy(), MAX_ENERGY, SKYBLUE);

    let abilities: Vec<&str> = progress
        .unlocked_abilities()
        .iter()
        .map(|a| a.display_name())
        .collect();
    draw_text(
        &format!(
            "Cassettes: {}/{}  Act {}",
            progress.cassette_count(),
            TOTAL_CASSETTES,
            progress.current_act
        ),
        232.0,
        28.0,
        22.0,
        WHITE,
    );
    if !abilities.is_empty() {
        draw_text(&abilities.join(" | "), 232.0, 48.0, 18.0, GRAY);
    }
}

pub fn draw_dialogue(dialogue: &DialogueSystem) {
    let Some(line) = dialogue.current_line() else {
        return;
    };
    let (sw, sh) = (screen_width(), screen_height());
    draw_rectangle(32.0, sh - 180.0, sw - 64.0, 150.0, Color::new(0.0, 0.0, 0.0, 0.85));
    if !line.speaker.is_empty() {
        draw_text(&line.speaker, 48.0, sh - 148.0, 26.0, YELLOW);
    }
    draw_text(dialogue.visible_text(), 48.0, sh - 108.0, 24.0, WHITE);
    if dialogue.line_fully_shown() {
        draw_text("Enter: next   Tab: skip", sw - 300.0, sh - 44.0, 18.0, GRAY);
    }
}

pub fn draw_notices(notices: &NoticeBoard) {
    let mut y = 96.0;
    for notice in notices.iter() {
        let w = measure_text(&notice.text, None, 24, 1.0).width;
        draw_text(&notice.text, screen_width() - w - 24.0, y, 24.0, GOLD);
        y += 28.0;
    }
}

/// Centered vertical menu with the selected entry highlighted.
pub fn draw_menu(title: &str, options: &[String], selected: usize) {
    let cx = screen_width() * 0.5;
    let cy = screen_height() * 0.5;
    draw_text(title, cx - 220.0, cy - 100.0, 40.0, YELLOW);
    for (i, option) in options.iter().enumerate() {
        let color = if i == selected { GREEN } else { GRAY };
        draw_text(option, cx - 200.0, cy - 40.0 + i as f32 * 36.0, 30.0, color);
    }
}
