use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown(u64),
}

impl Gender {
    pub const MALE_RAW: u64 = 4096;
    pub const FEMALE_RAW: u64 = 8192;

    pub fn from_raw(raw: u64) -> Self {
        match raw {
            Self::MALE_RAW => Self::Male,
            Self::FEMALE_RAW => Self::Female,
            other => Self::Unknown(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "Unknown ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Life-stage bracket. The raw encoding is bitmask-style; 64 and 128 are two
/// historically distinct encodings that both display as Elder, and that
/// collapsing is deliberate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBracket {
    Baby,
    Toddler,
    Child,
    Teen,
    YoungAdult,
    Adult,
    Elder,
    Unknown,
}

impl AgeBracket {
    pub fn from_raw(raw: u64) -> Self {
        match raw {
            1 => Self::Baby,
            2 => Self::Toddler,
            4 => Self::Child,
            8 => Self::Teen,
            16 => Self::YoungAdult,
            32 => Self::Adult,
            64 | 128 => Self::Elder,
            _ => Self::Unknown,
        }
    }

    pub fn is_adult(&self) -> bool {
        matches!(self, Self::YoungAdult | Self::Adult | Self::Elder)
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Baby => "Baby",
            Self::Toddler => "Toddler",
            Self::Child => "Child",
            Self::Teen => "Teen",
            Self::YoungAdult => "Young Adult",
            Self::Adult => "Adult",
            Self::Elder => "Elder",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkinTone {
    VeryLight,
    Light,
    Medium,
    Dark,
}

impl SkinTone {
    /// Bucket the strongest tone weight of a sim into one of four bands.
    pub fn from_max_weight(weight: f32) -> Self {
        if weight > 0.5 {
            Self::Dark
        } else if weight > 0.2 {
            Self::Medium
        } else if weight > 0.0 {
            Self::Light
        } else {
            Self::VeryLight
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::VeryLight => "Very Light",
            Self::Light => "Light",
            Self::Medium => "Medium",
            Self::Dark => "Dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyRole {
    Loner,
    Parent,
    Partner,
    Sibling,
    Roommate,
    Child,
}

impl FamilyRole {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Loner => "Loner",
            Self::Parent => "Parent",
            Self::Partner => "Partner",
            Self::Sibling => "Sibling",
            Self::Roommate => "Roommate",
            Self::Child => "Child",
        }
    }
}

impl fmt::Display for FamilyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub xp: f32,
    pub is_mod_skill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedEntry {
    pub name: String,
    pub value: f32,
    pub emoji: String,
    pub percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub value: f32,
    pub label: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub name: String,
    pub role: FamilyRole,
}

/// One extracted sim. Built in a single pass over the zone data and then
/// annotated by the family-role post-pass (`family_role`, `family_members`,
/// `relationship_label`); nothing else mutates it after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    pub sim_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub age: AgeBracket,
    pub occult: bool,
    pub partner_name: String,
    pub household: String,
    pub world: String,
    pub family_role: Option<FamilyRole>,
    pub family_members: Vec<FamilyMember>,
    pub relationship_count: u32,
    pub relationship_label: String,
    pub skin_tone: SkinTone,
    pub trait_count: usize,
    pub skills: Vec<SkillEntry>,
    pub needs: Vec<NeedEntry>,
    pub mood: Option<MoodSummary>,
    pub age_days: u64,
    pub is_played: bool,
    pub index: usize,
}

impl SimRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub sim_count: usize,
    pub household_count: usize,
    pub played_household_count: usize,
    pub world_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveAnalysis {
    pub sims: Vec<SimRecord>,
    pub households: BTreeMap<String, Vec<String>>,
    pub played_households: Vec<String>,
    pub worlds: Vec<String>,
    pub stats: AnalysisStats,
}
