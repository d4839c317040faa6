//! Display modes of the particle swarm

use crate::{FlurryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The formation the swarm is currently arranged into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Greeting,
    Tree,
    Scatter,
    Text,
    Image,
    Wish,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Greeting,
        Mode::Tree,
        Mode::Scatter,
        Mode::Text,
        Mode::Image,
        Mode::Wish,
    ];

    /// Next mode in the auto-advance cycle
    /// Greeting → Image → Text → Tree → Wish → Greeting.
    /// Scatter is outside the cycle and returns to Greeting.
    pub fn next(self) -> Mode {
        match self {
            Mode::Greeting => Mode::Image,
            Mode::Image => Mode::Text,
            Mode::Text => Mode::Tree,
            Mode::Tree => Mode::Wish,
            Mode::Wish => Mode::Greeting,
            Mode::Scatter => Mode::Greeting,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Greeting => "greeting",
            Mode::Tree => "tree",
            Mode::Scatter => "scatter",
            Mode::Text => "text",
            Mode::Image => "image",
            Mode::Wish => "wish",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = FlurryError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| FlurryError::InvalidMode {
                value: s.to_string(),
                allowed: Mode::ALL.iter().map(|m| m.name().to_string()).collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_visits_five_modes() {
        let mut m = Mode::Greeting;
        let mut seen = Vec::new();
        for _ in 0..5 {
            m = m.next();
            seen.push(m);
        }
        assert_eq!(
            seen,
            vec![Mode::Image, Mode::Text, Mode::Tree, Mode::Wish, Mode::Greeting]
        );
    }

    #[test]
    fn scatter_returns_to_greeting() {
        assert_eq!(Mode::Scatter.next(), Mode::Greeting);
    }

    #[test]
    fn parse_names() {
        assert_eq!("Tree".parse::<Mode>().unwrap(), Mode::Tree);
        assert_eq!(" wish ".parse::<Mode>().unwrap(), Mode::Wish);
        assert!("sleigh".parse::<Mode>().is_err());
    }
}
