use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What kind of interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    /// Only completed work sessions count toward progress statistics.
    pub fn is_work(self) -> bool {
        self == Mode::Work
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Work",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Text shown when a session of this mode runs out.
    pub fn completion_message(self) -> &'static str {
        match self {
            Mode::Work => "Work session complete! Time for a break!",
            Mode::ShortBreak => "Break over! Ready to work?",
            Mode::LongBreak => "Long break complete! Let's get productive!",
        }
    }

    pub fn default_minutes(self) -> u64 {
        match self {
            Mode::Work => 25,
            Mode::ShortBreak => 5,
            Mode::LongBreak => 15,
        }
    }

    pub fn default_duration_secs(self) -> u64 {
        self.default_minutes().saturating_mul(60)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "work" | "focus" => Ok(Mode::Work),
            "short_break" | "short" => Ok(Mode::ShortBreak),
            "long_break" | "long" => Ok(Mode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected work, short-break or long-break)"
            )),
        }
    }
}
