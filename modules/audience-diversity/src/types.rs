use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Topic ID for texts the topic model could not place in any cluster.
pub const NO_TOPIC: i64 = -1;

// --- Platform ---

/// Social platform a batch of posts comes from. Decides where the candidate
/// URL is read from and how the text is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Twitter,
    Reddit,
    Other,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::Reddit => write!(f, "reddit"),
            Platform::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "twitter" => Ok(Platform::Twitter),
            "reddit" => Ok(Platform::Reddit),
            "other" => Ok(Platform::Other),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

// --- Post ---

/// The fields of a social media post that scoring reads. Posts from
/// upstream exports are loosely typed: a `text` that is a number, NaN or null
/// deserializes to `None` rather than failing the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "string_or_none")]
    pub text: Option<String>,

    /// Reddit submission title.
    #[serde(default, deserialize_with = "string_or_none")]
    pub title: Option<String>,

    /// Twitter: URLs attached to the tweet.
    #[serde(default, deserialize_with = "strings_or_empty")]
    pub embedded_urls: Vec<String>,

    /// Twitter: expanded form of the tweet's link.
    #[serde(default, deserialize_with = "string_or_none")]
    pub expanded_url: Option<String>,
}

impl Post {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn strings_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

// --- Scores ---

/// Where a post's score came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreSource {
    /// Linked domain found in the audience diversity table.
    Domain { domain: String },
    /// Text classified into a topic with a known diversity value.
    Topic { topic: i64 },
    /// Neither signal available; population mean.
    Default,
}

/// Final standardized score for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostScore {
    pub score: f64,
    pub source: ScoreSource,
}
