//! Dimension classifiers. Every function is total: whatever goes in, a member
//! of the closed category set comes out.
//!
//! Country and platform are keyword heuristics over free-text campaign names.
//! The first matching set wins and India is tested before US, Android before
//! iOS, so a name carrying keywords from both sets resolves to the first.

use serde::{Deserialize, Serialize};

/// A closed set of categories a classifier maps into.
pub trait Category: Copy + Sized + 'static {
    /// Every member, in display order.
    const ALL: &'static [Self];

    /// Bucket key used in grouped output.
    fn key(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    India,
    Us,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Android,
    Ios,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "13-17")]
    From13To17,
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55-64")]
    From55To64,
    #[serde(rename = "65+")]
    Over65,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePlatform {
    Desktop,
    MobileApp,
    MobileWeb,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Category for Country {
    const ALL: &'static [Self] = &[Self::India, Self::Us, Self::Unknown];

    fn key(&self) -> &'static str {
        match self {
            Self::India => "india",
            Self::Us => "us",
            Self::Unknown => "unknown",
        }
    }
}

impl Category for Platform {
    const ALL: &'static [Self] = &[Self::Android, Self::Ios, Self::Unknown];

    fn key(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Unknown => "unknown",
        }
    }
}

impl Category for AgeBracket {
    const ALL: &'static [Self] = &[
        Self::From13To17,
        Self::From18To24,
        Self::From25To34,
        Self::From35To44,
        Self::From45To54,
        Self::From55To64,
        Self::Over65,
        Self::Unknown,
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::From13To17 => "13-17",
            Self::From18To24 => "18-24",
            Self::From25To34 => "25-34",
            Self::From35To44 => "35-44",
            Self::From45To54 => "45-54",
            Self::From55To64 => "55-64",
            Self::Over65 => "65+",
            Self::Unknown => "unknown",
        }
    }
}

impl Category for DevicePlatform {
    const ALL: &'static [Self] = &[Self::Desktop, Self::MobileApp, Self::MobileWeb, Self::Unknown];

    fn key(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::MobileApp => "mobile_app",
            Self::MobileWeb => "mobile_web",
            Self::Unknown => "unknown",
        }
    }
}

impl Category for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female, Self::Unknown];

    fn key(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

// ─── Keyword matching ───────────────────────────────────────────────────────

/// How a keyword must sit inside a lower-cased campaign name.
#[derive(Debug, Clone, Copy)]
enum Keyword {
    /// Anywhere in the name.
    Contains(&'static str),
    /// At the start of a word.
    Prefix(&'static str),
    /// As a whole word.
    Word(&'static str),
}

const INDIA_KEYWORDS: &[Keyword] = &[
    Keyword::Contains("india"),
    Keyword::Word("ind"),
    Keyword::Prefix("in_"),
    Keyword::Contains("mumbai"),
    Keyword::Contains("delhi"),
    Keyword::Contains("bangalore"),
    Keyword::Contains("bengaluru"),
    Keyword::Contains("hyderabad"),
    Keyword::Contains("chennai"),
    Keyword::Contains("kolkata"),
    Keyword::Prefix("pune"),
];

const US_KEYWORDS: &[Keyword] = &[
    Keyword::Word("us"),
    Keyword::Word("usa"),
    Keyword::Prefix("us_"),
    Keyword::Contains("united states"),
    Keyword::Word("nyc"),
    Keyword::Contains("new york"),
    Keyword::Contains("los angeles"),
    Keyword::Contains("san francisco"),
    Keyword::Contains("chicago"),
    Keyword::Contains("houston"),
    Keyword::Contains("seattle"),
    Keyword::Contains("miami"),
    Keyword::Contains("dallas"),
    Keyword::Contains("boston"),
];

const ANDROID_KEYWORDS: &[Keyword] = &[
    Keyword::Contains("android"),
    Keyword::Contains("google play"),
    Keyword::Contains("playstore"),
    Keyword::Contains("play store"),
    Keyword::Prefix("gp_"),
    Keyword::Word("gp"),
    Keyword::Word("aos"),
];

const IOS_KEYWORDS: &[Keyword] = &[
    Keyword::Prefix("ios"),
    Keyword::Contains("iphone"),
    Keyword::Contains("ipad"),
    Keyword::Contains("app store"),
    Keyword::Contains("appstore"),
    Keyword::Prefix("apple"),
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

fn matches_keyword(name: &str, keyword: Keyword) -> bool {
    let (needle, at_start, at_end) = match keyword {
        Keyword::Contains(k) => (k, false, false),
        Keyword::Prefix(k) => (k, true, false),
        Keyword::Word(k) => (k, true, true),
    };

    name.match_indices(needle).any(|(start, _)| {
        let starts_word = !at_start
            || name[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !is_word_char(c));
        let ends_word = !at_end
            || name[start + needle.len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));
        starts_word && ends_word
    })
}

fn matches_any(name: &str, keywords: &[Keyword]) -> bool {
    keywords.iter().any(|&keyword| matches_keyword(name, keyword))
}

// ─── Classifiers ────────────────────────────────────────────────────────────

pub fn classify_country(campaign_name: Option<&str>) -> Country {
    let name = campaign_name.unwrap_or_default().to_lowercase();
    if matches_any(&name, INDIA_KEYWORDS) {
        Country::India
    } else if matches_any(&name, US_KEYWORDS) {
        Country::Us
    } else {
        Country::Unknown
    }
}

pub fn classify_platform(campaign_name: Option<&str>) -> Platform {
    let name = campaign_name.unwrap_or_default().to_lowercase();
    if matches_any(&name, ANDROID_KEYWORDS) {
        Platform::Android
    } else if matches_any(&name, IOS_KEYWORDS) {
        Platform::Ios
    } else {
        Platform::Unknown
    }
}

/// Exact match against the bracket labels the reporting API emits. Only the
/// `unknown` label has letters, so it alone is matched case-insensitively.
pub fn classify_age_bracket(raw_age: Option<&str>) -> AgeBracket {
    let raw = raw_age.unwrap_or_default();
    AgeBracket::ALL
        .iter()
        .copied()
        .find(|bracket| bracket.key().eq_ignore_ascii_case(raw))
        .unwrap_or(AgeBracket::Unknown)
}

pub fn classify_device_platform(raw_device: Option<&str>) -> DevicePlatform {
    exact_category(raw_device).unwrap_or(DevicePlatform::Unknown)
}

pub fn classify_gender(raw_gender: Option<&str>) -> Gender {
    exact_category(raw_gender).unwrap_or(Gender::Unknown)
}

fn exact_category<C: Category>(raw: Option<&str>) -> Option<C> {
    let raw = raw?.trim();
    C::ALL
        .iter()
        .copied()
        .find(|category| category.key().eq_ignore_ascii_case(raw))
}
