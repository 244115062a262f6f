//! Domain types: positions, development traits, player attributes and results

use crate::error::{Result, ValuationError};
use crate::pick_table::{NearestPick, DRAFT_ROUNDS};
use crate::settings::GravitySettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roster position codes; deserialization goes through `FromStr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Position {
    QB,
    HB,
    FB,
    WR,
    TE,
    LT,
    LG,
    C,
    RG,
    RT,
    LE,
    RE,
    DT,
    LOLB,
    MLB,
    ROLB,
    CB,
    FS,
    SS,
    K,
    P,
    LS,
}

impl Position {
    /// Every position, offense first
    pub const ALL: [Position; 22] = [
        Position::QB,
        Position::HB,
        Position::FB,
        Position::WR,
        Position::TE,
        Position::LT,
        Position::LG,
        Position::C,
        Position::RG,
        Position::RT,
        Position::LE,
        Position::RE,
        Position::DT,
        Position::LOLB,
        Position::MLB,
        Position::ROLB,
        Position::CB,
        Position::FS,
        Position::SS,
        Position::K,
        Position::P,
        Position::LS,
    ];

    /// The position whose rating curve anchors the value scale
    pub const REFERENCE: Position = Position::QB;

    pub fn code(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::HB => "HB",
            Position::FB => "FB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::LT => "LT",
            Position::LG => "LG",
            Position::C => "C",
            Position::RG => "RG",
            Position::RT => "RT",
            Position::LE => "LE",
            Position::RE => "RE",
            Position::DT => "DT",
            Position::LOLB => "LOLB",
            Position::MLB => "MLB",
            Position::ROLB => "ROLB",
            Position::CB => "CB",
            Position::FS => "FS",
            Position::SS => "SS",
            Position::K => "K",
            Position::P => "P",
            Position::LS => "LS",
        }
    }

    pub fn is_offensive_line(&self) -> bool {
        matches!(self, Position::LT | Position::LG | Position::C | Position::RG | Position::RT)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        if code == "RB" {
            return Ok(Position::HB);
        }
        Position::ALL
            .iter()
            .copied()
            .find(|p| p.code() == code)
            .ok_or_else(|| ValuationError::invalid_input(format!("unknown position '{}'", s)))
    }
}

impl TryFrom<String> for Position {
    type Error = ValuationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Development trait tiers; deserialization goes through `FromStr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum DevTrait {
    Normal,
    Star,
    Superstar,
    #[serde(rename = "X-Factor")]
    XFactor,
}

impl DevTrait {
    /// Superstar and X-Factor players carry ability slots
    pub fn has_ability_slots(&self) -> bool {
        matches!(self, DevTrait::Superstar | DevTrait::XFactor)
    }
}

impl fmt::Display for DevTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DevTrait::Normal => "Normal",
            DevTrait::Star => "Star",
            DevTrait::Superstar => "Superstar",
            DevTrait::XFactor => "X-Factor",
        };
        f.write_str(name)
    }
}

impl FromStr for DevTrait {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "normal" => Ok(DevTrait::Normal),
            "star" => Ok(DevTrait::Star),
            "superstar" => Ok(DevTrait::Superstar),
            "xfactor" => Ok(DevTrait::XFactor),
            _ => Err(ValuationError::invalid_input(format!("unknown development trait '{}'", s))),
        }
    }
}

impl TryFrom<String> for DevTrait {
    type Error = ValuationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Optional physical ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalAttributes {
    #[serde(default)]
    pub speed: Option<i32>,
    #[serde(default)]
    pub throw_power: Option<i32>,
    /// Height in inches
    #[serde(default)]
    pub height_in: Option<i32>,
    #[serde(default)]
    pub ability_slots: Option<u32>,
}

/// Everything the pipeline needs to know about a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerAttributes {
    /// Overall rating, calibrated over 60..=99
    pub overall: i32,
    pub age: i32,
    pub position: Position,
    pub dev_trait: DevTrait,
    #[serde(default)]
    pub physical: PhysicalAttributes,
}

impl PlayerAttributes {
    pub fn new(overall: i32, age: i32, position: Position, dev_trait: DevTrait) -> Self {
        Self { overall, age, position, dev_trait, physical: PhysicalAttributes::default() }
    }

    pub fn with_physical(mut self, physical: PhysicalAttributes) -> Self {
        self.physical = physical;
        self
    }

    /// Parse attributes from a JSON request body
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| ValuationError::invalid_input(format!("player attributes: {}", e)))
    }
}

/// Every intermediate factor of a player valuation, in composition order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationTrace {
    /// Reference-position value for the rating
    pub anchor_value: f64,
    /// Position multiplier of the reference position
    pub reference_multiplier: f64,
    /// Anchor value with the reference multiplier divided out
    pub base_value: f64,
    pub position: f64,
    pub age: f64,
    pub youth: f64,
    pub dev_trait: f64,
    pub speed: Option<f64>,
    pub throw_power: Option<f64>,
    pub height: Option<f64>,
    pub ability_slot: Option<f64>,
    /// Value after every multiplier, before the soft cap
    pub composed_value: f64,
    /// Soft cap parameters, when one was applied
    pub gravity: Option<GravitySettings>,
}

/// Result of a player valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub value: f64,
    pub nearest_pick: NearestPick,
    pub trace: ValuationTrace,
}

/// Maximum years a future pick may lie ahead
pub const MAX_YEARS_OUT: u32 = 2;

/// A draft pick, current or future
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PickDescriptor {
    pub round: u32,
    #[serde(default)]
    pub years_out: u32,
    #[serde(default)]
    pub projected_pick: Option<i32>,
}

impl PickDescriptor {
    /// Create a validated pick descriptor
    pub fn new(round: i64, years_out: i64, projected_pick: Option<i32>) -> Result<Self> {
        if !(1..=DRAFT_ROUNDS as i64).contains(&round) {
            return Err(ValuationError::invalid_input(format!(
                "round {} outside 1..={}",
                round, DRAFT_ROUNDS
            )));
        }
        if !(0..=MAX_YEARS_OUT as i64).contains(&years_out) {
            return Err(ValuationError::invalid_input(format!(
                "years_out {} outside 0..={}",
                years_out, MAX_YEARS_OUT
            )));
        }
        Ok(Self { round: round as u32, years_out: years_out as u32, projected_pick })
    }

    /// Re-check a descriptor built by deserialization
    pub fn validate(&self) -> Result<()> {
        Self::new(self.round as i64, self.years_out as i64, self.projected_pick).map(|_| ())
    }
}
