use serde::{Deserialize, Serialize};
use std::fmt;

/// A decimal digit, 0 through 9
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    pub const ALL: [Digit; 10] = [
        Digit(0),
        Digit(1),
        Digit(2),
        Digit(3),
        Digit(4),
        Digit(5),
        Digit(6),
        Digit(7),
        Digit(8),
        Digit(9),
    ];

    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    /// Parse an ASCII digit character
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self(d as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Digit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Digit::new(value).ok_or_else(|| format!("digit out of range: {}", value))
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognized label, or the sentinel for "no confident answer"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Digit(Digit),
    Unrecognized,
}

impl Label {
    pub fn digit(self) -> Option<Digit> {
        match self {
            Label::Digit(d) => Some(d),
            Label::Unrecognized => None,
        }
    }

    pub fn is_unrecognized(self) -> bool {
        matches!(self, Label::Unrecognized)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Digit(d) => write!(f, "{}", d),
            Label::Unrecognized => write!(f, "?"),
        }
    }
}

/// One ranked alternative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub digit: Digit,
    pub score: f32,
}

impl Candidate {
    pub fn new(digit: Digit, score: f32) -> Self {
        Self {
            digit,
            score: clamp_unit(score),
        }
    }
}

/// Result of a single `recognize` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    label: Label,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    alternatives: Vec<Candidate>,
}

impl Classification {
    pub fn new(label: Label, confidence: Option<f32>) -> Self {
        Self {
            label,
            confidence: confidence.map(clamp_unit),
            alternatives: Vec::new(),
        }
    }

    pub fn digit(digit: Digit, confidence: f32) -> Self {
        Self::new(Label::Digit(digit), Some(confidence))
    }

    pub fn unrecognized(confidence: f32) -> Self {
        Self::new(Label::Unrecognized, Some(confidence))
    }

    /// Attach ranked alternatives; they are sorted by descending score, ties by digit
    pub fn with_alternatives(mut self, mut alternatives: Vec<Candidate>) -> Self {
        alternatives.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.digit.cmp(&b.digit)));
        self.alternatives = alternatives;
        self
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    pub fn alternatives(&self) -> &[Candidate] {
        &self.alternatives
    }

    pub fn is_unrecognized(&self) -> bool {
        self.label.is_unrecognized()
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
