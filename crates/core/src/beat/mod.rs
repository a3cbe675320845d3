//! Beatmap grammar.
//!
//! A beatmap is a string with one character per beat slot of a track. Each
//! character names the visual transition fired on that beat.

use serde::{Deserialize, Serialize};

/// Transition cue for a single beat slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatEvent {
    /// `x`
    VerticalBlur,
    /// `o`
    HorizontalBlur,
    /// `-`
    NoBlur,
    /// `+`
    Blackout,
    /// `|`
    ShortBlackout,
    /// `:`
    ColorOnly,
    /// `*`
    ImageOnly,
    /// `.` and every character outside the grammar.
    NoTransition,
}

impl BeatEvent {
    /// Classifies a beatmap character.
    ///
    /// Total over `char`: characters outside the grammar map to
    /// [`BeatEvent::NoTransition`] so packs written for newer players still
    /// load.
    pub fn from_char(beat: char) -> Self {
        match beat {
            'x' => Self::VerticalBlur,
            'o' => Self::HorizontalBlur,
            '-' => Self::NoBlur,
            '+' => Self::Blackout,
            '|' => Self::ShortBlackout,
            ':' => Self::ColorOnly,
            '*' => Self::ImageOnly,
            '.' => Self::NoTransition,
            _ => Self::NoTransition,
        }
    }

    /// Canonical beatmap character for this event.
    pub fn symbol(self) -> char {
        match self {
            Self::VerticalBlur => 'x',
            Self::HorizontalBlur => 'o',
            Self::NoBlur => '-',
            Self::Blackout => '+',
            Self::ShortBlackout => '|',
            Self::ColorOnly => ':',
            Self::ImageOnly => '*',
            Self::NoTransition => '.',
        }
    }

    /// Whether this beat changes anything on screen.
    pub fn is_transition(self) -> bool {
        self != Self::NoTransition
    }
}

impl From<char> for BeatEvent {
    fn from(value: char) -> Self {
        Self::from_char(value)
    }
}

/// Classifies every slot of a beatmap, in order.
pub fn parse_beatmap(beatmap: &str) -> Vec<BeatEvent> {
    beatmap.chars().map(BeatEvent::from_char).collect()
}
