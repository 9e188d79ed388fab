//! Static catalogs for sim extraction: skill names and XP curves, need
//! definitions, mood thresholds, and the region/world tables.

use super::types::MoodSummary;

// --- Skills ---

pub(crate) const SKILL_NAMES: &[(u64, &str)] = &[
    (16654, "Writing"),
    (16659, "Fitness"),
    (16667, "Handiness"),
    (16695, "Gardening"),
    (16698, "Mischief"),
    (16699, "Charisma"),
    (16700, "Gourmet Cooking"),
    (16701, "Guitar"),
    (16702, "Logic"),
    (16703, "Piano"),
    (16704, "Violin"),
    (16705, "Cooking"),
    (16706, "Painting"),
    (16707, "Rocket Science"),
    (16708, "Video Gaming"),
    (16709, "Programming"),
    (16718, "Creativity"),
    (16719, "Mental"),
    (16720, "Motor"),
    (16721, "Social"),
    (39397, "Mixology"),
    (104198, "Photography"),
    (117858, "Bowling"),
    (140170, "Baking"),
    (160504, "Singing"),
    (161190, "Wellness"),
    (174687, "Selvadoradian Culture"),
];

/// Five-level adult skills.
pub(crate) const MINOR_SKILL_IDS: &[u64] = &[104198, 117858, 174687];

/// Child life-stage skills use their own ten-level curve.
pub(crate) const CHILD_SKILL_IDS: &[u64] = &[16718, 16719, 16720, 16721];

/// Cumulative XP thresholds per level; level N is reached once XP meets
/// threshold N-1. Indexed from level 1, so the first entry is always 0.
pub(crate) const MAJOR_SKILL_CURVE: &[u32] = &[
    0, 100, 550, 1_325, 2_500, 4_150, 6_350, 9_300, 13_100, 18_100,
];
pub(crate) const CHILD_SKILL_CURVE: &[u32] = &[
    0, 75, 375, 900, 1_700, 2_800, 4_300, 6_300, 8_900, 12_200,
];
pub(crate) const MINOR_SKILL_CURVE: &[u32] = &[0, 100, 600, 1_700, 3_500];

pub(crate) fn skill_name(id: u64) -> Option<&'static str> {
    SKILL_NAMES
        .iter()
        .find(|(skill_id, _)| *skill_id == id)
        .map(|(_, name)| *name)
}

pub(crate) fn xp_curve(id: u64) -> &'static [u32] {
    if MINOR_SKILL_IDS.contains(&id) {
        MINOR_SKILL_CURVE
    } else if CHILD_SKILL_IDS.contains(&id) {
        CHILD_SKILL_CURVE
    } else {
        MAJOR_SKILL_CURVE
    }
}

/// Level for an XP value on a curve: the number of thresholds not exceeding
/// it, at least 1 and capped at the curve length.
pub(crate) fn level_for_xp(curve: &[u32], xp: f32) -> u32 {
    let reached = curve.iter().filter(|&&t| t as f32 <= xp).count() as u32;
    reached.clamp(1, curve.len() as u32)
}

// --- Needs ---

pub(crate) struct Need {
    pub id: u64,
    pub name: &'static str,
    pub emoji: &'static str,
}

pub(crate) const NEEDS: &[Need] = &[
    Need {
        id: 16650,
        name: "Bladder",
        emoji: "🚽",
    },
    Need {
        id: 16651,
        name: "Energy",
        emoji: "⚡",
    },
    Need {
        id: 16652,
        name: "Fun",
        emoji: "🎉",
    },
    Need {
        id: 16653,
        name: "Hunger",
        emoji: "🍗",
    },
    Need {
        id: 16656,
        name: "Hygiene",
        emoji: "🧼",
    },
    Need {
        id: 16657,
        name: "Social",
        emoji: "💬",
    },
];

pub(crate) fn need_for(id: u64) -> Option<&'static Need> {
    NEEDS.iter().find(|need| need.id == id)
}

/// Raw commodity values nominally sit in -100..=100; out-of-range values
/// from mods still clamp into a displayable percentage.
pub(crate) fn need_percent(value: f32) -> f32 {
    ((value + 100.0) / 2.0).clamp(0.0, 100.0)
}

// --- Mood ---

pub(crate) fn mood_summary(value: f32) -> MoodSummary {
    let (label, emoji) = if value > 30.0 {
        ("Very Happy", "😄")
    } else if value > 10.0 {
        ("Happy", "🙂")
    } else if value > -10.0 {
        ("Neutral", "😐")
    } else if value > -30.0 {
        ("Sad", "😟")
    } else {
        ("Very Sad", "😢")
    };
    MoodSummary {
        value,
        label: label.to_string(),
        emoji: emoji.to_string(),
    }
}

// --- Worlds ---

/// Stable region id to world name, for neighborhood records that carry no
/// display name (newer content packs).
pub(crate) const REGION_WORLDS: &[(u64, &str)] = &[
    (104067, "Willow Creek"),
    (104068, "Oasis Springs"),
    (118314, "Newcrest"),
    (123129, "Magnolia Promenade"),
    (123130, "Windenburg"),
    (132124, "San Myshuno"),
    (136824, "Forgotten Hollow"),
    (144609, "Brindleton Bay"),
    (152529, "Del Sol Valley"),
    (158684, "StrangerVille"),
    (164436, "Sulani"),
    (172316, "Britechester"),
    (173604, "Glimmerbrook"),
    (176964, "Evergreen Harbor"),
    (186594, "Mt. Komorebi"),
    (195493, "Henford-on-Bagley"),
    (208308, "Tartosa"),
    (215968, "Moonwood Mill"),
    (222281, "Copperdale"),
    (228200, "San Sequoia"),
    (235560, "Chestnut Ridge"),
    (244383, "Tomarang"),
    (253661, "Ciudad Enamorada"),
];

pub(crate) fn region_world(region_id: u64) -> Option<&'static str> {
    REGION_WORLDS
        .iter()
        .find(|(id, _)| *id == region_id)
        .map(|(_, name)| *name)
}

/// ASCII keyword to world name, for the coarse byte-search world pass.
pub(crate) const WORLD_KEYWORDS: &[(&str, &str)] = &[
    ("Willow", "Willow Creek"),
    ("Oasis", "Oasis Springs"),
    ("Newcrest", "Newcrest"),
    ("Magnolia", "Magnolia Promenade"),
    ("Windenburg", "Windenburg"),
    ("Myshuno", "San Myshuno"),
    ("Forgotten", "Forgotten Hollow"),
    ("Brindleton", "Brindleton Bay"),
    ("Del Sol", "Del Sol Valley"),
    ("Stranger", "StrangerVille"),
    ("Sulani", "Sulani"),
    ("Britechester", "Britechester"),
    ("Glimmerbrook", "Glimmerbrook"),
    ("Evergreen", "Evergreen Harbor"),
    ("Komorebi", "Mt. Komorebi"),
    ("Henford", "Henford-on-Bagley"),
    ("Tartosa", "Tartosa"),
    ("Moonwood", "Moonwood Mill"),
    ("Copperdale", "Copperdale"),
    ("Sequoia", "San Sequoia"),
    ("Chestnut", "Chestnut Ridge"),
    ("Tomarang", "Tomarang"),
];
