use std::fmt;

use serde::{Deserialize, Serialize};

const DAY_BITS: u32 = 9;
const DAY_MASK: u32 = (1 << DAY_BITS) - 1;

/// Largest turn that fits beside the day bits.
pub const MAX_TURN: u32 = u32::MAX >> DAY_BITS;

pub const DAYS_PER_TURN: u32 = 365;

/// Game-time instant used to stamp offers, answers and journal events.
///
/// One turn is one game year. Bit layout: `[turn:23][day_of_turn:9]`, so
/// natural `u32` ordering equals chronological ordering.
///
/// The ledger never derives this from the wall clock; the turn-advancement
/// layer hands it in through [`Ledger::set_time`](crate::Ledger::set_time).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "GameTimeRepr", try_from = "GameTimeRepr")]
pub struct GameTime(u32);

#[derive(Serialize, Deserialize)]
struct GameTimeRepr {
    turn: u32,
    day: u32,
}

impl From<GameTime> for GameTimeRepr {
    fn from(t: GameTime) -> Self {
        GameTimeRepr {
            turn: t.turn(),
            day: t.day(),
        }
    }
}

impl TryFrom<GameTimeRepr> for GameTime {
    type Error = String;

    fn try_from(repr: GameTimeRepr) -> Result<Self, Self::Error> {
        if !(1..=DAYS_PER_TURN).contains(&repr.day) {
            return Err(format!("day out of range: {}", repr.day));
        }
        if repr.turn > MAX_TURN {
            return Err(format!("turn out of range: {}", repr.turn));
        }
        Ok(GameTime::new(repr.turn, repr.day))
    }
}

impl GameTime {
    /// Create a time from a turn (up to [`MAX_TURN`]) and a day within it (1–365).
    pub fn new(turn: u32, day: u32) -> Self {
        assert!(turn <= MAX_TURN, "turn out of range: {turn}");
        assert!(
            (1..=DAYS_PER_TURN).contains(&day),
            "day out of range: {day}"
        );
        Self((turn << DAY_BITS) | day)
    }

    /// The first day of a turn.
    pub fn from_turn(turn: u32) -> Self {
        Self::new(turn, 1)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn turn(self) -> u32 {
        self.0 >> DAY_BITS
    }

    pub fn day(self) -> u32 {
        self.0 & DAY_MASK
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for GameTime {
    fn default() -> Self {
        Self::from_turn(0)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}.D{}", self.turn(), self.day())
    }
}
