use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Written lowercase. Read with the same leniency as [`FromStr`], since the
/// server stores whatever direction string it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// Whether `rate` has crossed `threshold` in this direction. Touching the threshold counts.
    pub fn is_triggered(&self, threshold: f64, rate: f64) -> bool {
        match self {
            Direction::Above => rate >= threshold,
            Direction::Below => rate <= threshold,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Above => "above",
                Direction::Below => "below",
            }
        )
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" | "up" => Ok(Direction::Above),
            "below" | "down" => Ok(Direction::Below),
            _ => Err(anyhow::anyhow!("Invalid alert direction: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub currency: String,
    pub direction: Direction,
    pub threshold: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Request body for `POST /alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub currency: String,
    pub direction: Direction,
    pub threshold: f64,
}

impl NewAlert {
    pub fn new(currency: &str, direction: Direction, threshold: f64) -> Self {
        Self {
            currency: currency.to_uppercase(),
            direction,
            threshold,
        }
    }
}
