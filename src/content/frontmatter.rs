//! Front-matter parsing

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Errors raised while splitting or decoding a front-matter block
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("missing front-matter block (expected a leading `---` fence)")]
    Missing,

    #[error("front-matter block is not closed by a `---` line")]
    Unterminated,

    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A date read from front-matter.
///
/// Keeps the text exactly as written so it serializes back unchanged, and
/// compares by the instant it denotes. The authored offset is kept for
/// display; values without an offset are `+00:00`.
#[derive(Debug, Clone)]
pub struct PostDate {
    raw: String,
    value: DateTime<FixedOffset>,
}

impl PostDate {
    /// Parse an ISO 8601 date or date-time
    pub fn parse(s: &str) -> Option<Self> {
        let raw = s.trim();
        parse_value(raw).map(|value| Self {
            raw: raw.to_string(),
            value,
        })
    }

    /// Build a bare calendar date (`YYYY-MM-DD`)
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            raw: date.format("%Y-%m-%d").to_string(),
            value: date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset(),
        }
    }

    /// Original text from the source file
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The point in time, used for ordering
    pub fn instant(&self) -> DateTime<Utc> {
        self.value.with_timezone(&Utc)
    }

    /// Wall-clock date and time in the offset it was written with
    pub fn local(&self) -> DateTime<FixedOffset> {
        self.value
    }
}

fn parse_value(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())
}

impl PartialEq for PostDate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PostDate {}

impl PartialOrd for PostDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PostDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant()
            .cmp(&other.instant())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for PostDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for PostDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PostDate::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ISO 8601 date: {:?}", s))
        })
    }
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_set<'de, D>(deserializer: D) -> Result<IndexSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};

    struct StringOrSet;

    impl<'de> Visitor<'de> for StringOrSet {
        type Value = IndexSet<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::from([value.to_string()]))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value.to_string())
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut set = IndexSet::new();
            while let Some(item) = seq.next_element::<String>()? {
                set.insert(item);
            }
            Ok(set)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::new())
        }
    }

    deserializer.deserialize_any(StringOrSet)
}

/// Front-matter of a post. Every field except `categories` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: String,
    pub created_date: PostDate,
    pub last_updated_date: PostDate,
    #[serde(deserialize_with = "string_or_set", default)]
    pub categories: IndexSet<String>,
    pub author: String,
    pub estimated_reading_time_in_mins: u32,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (yaml, body) = Self::split(content)?;
        let fm = serde_yaml::from_str::<FrontMatter>(yaml)?;
        Ok((fm, body))
    }

    /// Split a source file into its YAML block and the Markdown body
    pub fn split(content: &str) -> Result<(&str, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let rest = content
            .strip_prefix("---")
            .ok_or(FrontMatterError::Missing)?;
        // The opening fence must be alone on its line
        let rest = match rest.find('\n') {
            Some(pos) if rest[..pos].trim().is_empty() => &rest[pos + 1..],
            _ => return Err(FrontMatterError::Missing),
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == "---" {
                let yaml = &rest[..offset];
                let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
                return Ok((yaml, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unterminated)
    }

    /// Render this front-matter as a fenced YAML block
    pub fn to_block(&self) -> Result<String, FrontMatterError> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("---\n{}---\n", yaml))
    }
}
