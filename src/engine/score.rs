use std::fmt;

/// One judge's mark for a participant.
///
/// `Unset` means "not judged yet" and is kept distinct from an entered zero
/// until the save boundary collapses it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Score {
    #[default]
    Unset,
    Numeric(f64),
}

impl Score {
    /// Map a stored mark (JSON number or null) onto a score
    pub fn from_stored(value: Option<f64>) -> Self {
        match value {
            Some(v) => Score::Numeric(v),
            None => Score::Unset,
        }
    }

    /// Parse operator input. Blank input clears the score.
    ///
    /// Accepts any finite number; the 0-100 range shown to judges is advisory.
    pub fn parse(input: &str) -> Result<Self, ScoreParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Score::Unset);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Score::Numeric(v)),
            _ => Err(ScoreParseError(trimmed.to_string())),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Score::Numeric(_))
    }

    pub fn value_or_zero(&self) -> f64 {
        match self {
            Score::Numeric(v) => *v,
            Score::Unset => 0.0,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Unset => Ok(()),
            Score::Numeric(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError(pub String);

impl fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a number", self.0)
    }
}

impl std::error::Error for ScoreParseError {}

/// Which of the three judges a score belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JudgeSlot {
    First,
    Second,
    Third,
}

impl JudgeSlot {
    pub const ALL: [JudgeSlot; 3] = [JudgeSlot::First, JudgeSlot::Second, JudgeSlot::Third];

    pub fn index(self) -> usize {
        match self {
            JudgeSlot::First => 0,
            JudgeSlot::Second => 1,
            JudgeSlot::Third => 2,
        }
    }

    /// 1-based judge number, as printed on score sheets
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl TryFrom<u8> for JudgeSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(JudgeSlot::First),
            2 => Ok(JudgeSlot::Second),
            3 => Ok(JudgeSlot::Third),
            other => Err(format!("judge slot must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl fmt::Display for JudgeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Judge {}", self.number())
    }
}

/// Round half-up at two decimals, so sums like 0.1 + 0.2 group as 0.3.
///
/// Values such as 1.005 are stored a hair below the half, so the scaled
/// value is nudged by a relative tolerance before flooring.
pub fn round_half_up(value: f64) -> f64 {
    let scaled = value * 100.0;
    let nudge = scaled.abs().max(1.0) * 1e-9;
    (scaled + 0.5 + nudge).floor() / 100.0
}
