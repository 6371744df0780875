use macroquad::prelude::*;
use noize_voice::rhythm::LANES;
use noize_voice::rules::{GameRules, KeyBindings};
use noize_voice::session::FrameInput;
use noize_voice::Ability;
use tracing::warn;

/// Key bindings resolved against macroquad key codes.
pub struct Controls {
    left: Vec<KeyCode>,
    right: Vec<KeyCode>,
    jump: Vec<KeyCode>,
    attack: Vec<KeyCode>,
    abilities: Vec<(KeyCode, Ability)>,
    lanes: [KeyCode; LANES],
    pub pause: KeyCode,
}

impl Controls {
    pub fn from_rules(rules: &GameRules) -> Self {
        let keys = &rules.keys;
        let defaults = KeyBindings::default();
        let (left, right, jump) = match rules.control_scheme.to_lowercase().as_str() {
            "wasd" => (
                vec![KeyCode::A],
                vec![KeyCode::D],
                vec![KeyCode::Space, KeyCode::W],
            ),
            "arrows" => (vec![KeyCode::Left], vec![KeyCode::Right], vec![KeyCode::Up]),
            "custom" => (
                parse_keys(&keys.left, &defaults.left),
                parse_keys(&keys.right, &defaults.right),
                parse_keys(&keys.jump, &defaults.jump),
            ),
            _ => (
                vec![KeyCode::A, KeyCode::Left],
                vec![KeyCode::D, KeyCode::Right],
                vec![KeyCode::Space, KeyCode::W],
            ),
        };

        let abilities = [
            (&keys.ability_make_some_noize, Ability::MakeSomeNoize),
            (&keys.ability_vidihay, Ability::Vidihay),
            (&keys.ability_vselennaya, Ability::Vselennaya),
            (&keys.ability_igra_slov, Ability::IgraSlov),
            (&keys.ultimate, Ability::UltimateCombo),
        ]
        .into_iter()
        .filter_map(|(name, ability)| match parse_key(name) {
            Some(code) => Some((code, ability)),
            None => {
                warn!(key = %name, ability = ability.id(), "unknown_key_binding");
                None
            }
        })
        .collect();

        let fallback_lanes = [KeyCode::A, KeyCode::S, KeyCode::D, KeyCode::F];
        let mut lanes = fallback_lanes;
        for (slot, name) in lanes.iter_mut().zip(keys.rhythm_lanes.iter()) {
            if let Some(code) = parse_key(name) {
                *slot = code;
            }
        }

        Self {
            left,
            right,
            jump,
            attack: parse_keys(&keys.attack, &defaults.attack),
            abilities,
            lanes,
            pause: parse_key(&keys.pause).unwrap_or(KeyCode::Escape),
        }
    }

    /// Polls macroquad for this frame's input.
    pub fn poll(&self) -> FrameInput {
        let held = |codes: &[KeyCode]| codes.iter().any(|k| is_key_down(*k));
        let pressed = |codes: &[KeyCode]| codes.iter().any(|k| is_key_pressed(*k));

        let mut input = FrameInput::default();
        input.player.left = held(&self.left);
        input.player.right = held(&self.right);
        input.player.jump = pressed(&self.jump);
        input.player.attack = pressed(&self.attack);
        input.player.ability = self
            .abilities
            .iter()
            .find(|(code, _)| is_key_pressed(*code))
            .map(|(_, ability)| *ability);
        for (lane, code) in self.lanes.iter().enumerate() {
            input.lanes[lane] = is_key_pressed(*code);
        }
        input.advance_dialogue = is_key_pressed(KeyCode::Enter);
        input.skip_dialogue = is_key_pressed(KeyCode::Tab);
        input.backspace = is_key_pressed(KeyCode::Backspace);
        input.submit = is_key_pressed(KeyCode::Enter);
        while let Some(c) = get_char_pressed() {
            if !c.is_control() {
                input.typed.push(c);
            }
        }
        input
    }
}

fn parse_keys(names: &[String], fallback: &[String]) -> Vec<KeyCode> {
    let codes: Vec<KeyCode> = names.iter().filter_map(|n| parse_key(n)).collect();
    if codes.is_empty() {
        fallback.iter().filter_map(|n| parse_key(n)).collect()
    } else {
        codes
    }
}

pub fn parse_key(name: &str) -> Option<KeyCode> {
    let s = name.trim();
    let single = if s.chars().count() == 1 { s.chars().next() } else { None };
    if let Some(c) = single {
        return match c.to_ascii_uppercase() {
            'A' => Some(KeyCode::A),
            'B' => Some(KeyCode::B),
            'C' => Some(KeyCode::C),
            'D' => Some(KeyCode::D),
            'E' => Some(KeyCode::E),
            'F' => Some(KeyCode::F),
            'G' => Some(KeyCode::G),
            'H' => Some(KeyCode::H),
            'I' => Some(KeyCode::I),
            'J' => Some(KeyCode::J),
            'K' => Some(KeyCode::K),
            'L' => Some(KeyCode::L),
            'M' => Some(KeyCode::M),
            'N' => Some(KeyCode::N),
            'O' => Some(KeyCode::O),
            'P' => Some(KeyCode::P),
            'Q' => Some(KeyCode::Q),
            'R' => Some(KeyCode::R),
            'S' => Some(KeyCode::S),
            'T' => Some(KeyCode::T),
            'U' => Some(KeyCode::U),
            'V' => Some(KeyCode::V),
            'W' => Some(KeyCode::W),
            'X' => Some(KeyCode::X),
            'Y' => Some(KeyCode::Y),
            'Z' => Some(KeyCode::Z),
            '1' => Some(KeyCode::Key1),
            '2' => Some(KeyCode::Key2),
            '3' => Some(KeyCode::Key3),
            '4' => Some(KeyCode::Key4),
            _ => None,
        };
    }

    match s.to_ascii_uppercase().as_str() {
        "LEFT" => Some(KeyCode::Left),
        "RIGHT" => Some(KeyCode::Right),
        "UP" => Some(KeyCode::Up),
        "DOWN" => Some(KeyCode::Down),
        "SPACE" | "SPACEBAR" => Some(KeyCode::Space),
        "ESC" | "ESCAPE" => Some(KeyCode::Escape),
        "ENTER" | "RETURN" => Some(KeyCode::Enter),
        "TAB" => Some(KeyCode::Tab),
        "LSHIFT" | "SHIFT" => Some(KeyCode::LeftShift),
        _ => None,
    }
}
