use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ability {
    MakeSomeNoize,
    Vidihay,
    Vselennaya,
    IgraSlov,
    UltimateCombo,
    RhythmMaster,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::MakeSomeNoize,
        Ability::Vidihay,
        Ability::Vselennaya,
        Ability::IgraSlov,
        Ability::UltimateCombo,
        Ability::RhythmMaster,
    ];

    /// Persisted identifier.
    pub fn id(self) -> &'static str {
        match self {
            Ability::MakeSomeNoize => "MAKE_SOME_NOIZE",
            Ability::Vidihay => "VIDIHAY",
            Ability::Vselennaya => "VSELENNAYA",
            Ability::IgraSlov => "IGRA_SLOV",
            Ability::UltimateCombo => "ULTIMATE_COMBO",
            Ability::RhythmMaster => "RHYTHM_MASTER",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id.trim())
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Ability::MakeSomeNoize => "Make Some Noize",
            Ability::Vidihay => "Vidihay",
            Ability::Vselennaya => "Vselennaya",
            Ability::IgraSlov => "Igra Slov",
            Ability::UltimateCombo => "Ultimate Combo",
            Ability::RhythmMaster => "Rhythm Master",
        }
    }

    /// Energy spent on activation. Passive abilities have no cost and
    /// cannot be activated.
    pub fn energy_cost(self) -> Option<u32> {
        match self {
            Ability::MakeSomeNoize => Some(20),
            Ability::Vidihay => Some(30),
            Ability::Vselennaya => Some(40),
            Ability::IgraSlov => Some(25),
            Ability::UltimateCombo => Some(80),
            Ability::RhythmMaster => None,
        }
    }

    pub fn is_passive(self) -> bool {
        self.energy_cost().is_none()
    }

    /// Ability granted by collecting the given track's cassette.
    pub fn unlocked_by_track(track_id: &str) -> Option<Self> {
        match track_id {
            "make_some_noize" => Some(Ability::MakeSomeNoize),
            "vidihay" => Some(Ability::Vidihay),
            "vselennaya" => Some(Ability::Vselennaya),
            "igra_slov" => Some(Ability::IgraSlov),
            _ => None,
        }
    }
}
