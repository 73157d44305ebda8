use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// A field that accepts either a single value or an array of values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum AmountSpec {
    #[schemars(description = "A fixed amount printed on every firing")]
    Fixed(f64),

    #[schemars(
        description = "[low, high] or [low, high, mode]. A triangular draw is taken on every firing; the mode defaults to the midpoint."
    )]
    Range(Vec<f64>),
}

/// One posting line. Serialized as `[account]` or `[account, amount]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum PostingSpec {
    #[schemars(description = "Account only; the ledger tool balances the entry against it")]
    Balancing((String,)),

    #[schemars(description = "Account followed by a fixed amount, an amount range, or null")]
    WithAmount((String, Option<AmountSpec>)),
}

impl PostingSpec {
    pub fn account(&self) -> &str {
        match self {
            PostingSpec::Balancing((account,)) => account,
            PostingSpec::WithAmount((account, _)) => account,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EntryDefinitionSpec {
    #[schemars(
        description = "Payee name, or a list of alternatives of which one is chosen uniformly at random per firing"
    )]
    pub payee: OneOrMany<String>,

    #[serde(default)]
    #[schemars(description = "First date (inclusive, YYYY/MM/DD) on which the entry may fire")]
    pub start: Option<String>,

    #[serde(default)]
    #[schemars(description = "Last date (inclusive, YYYY/MM/DD) on which the entry may fire")]
    pub end: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_marker",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(
        description = "When present with any value, the entry fires on the first eligible date of the run and its day/dow triggers apply afterwards"
    )]
    pub once: Option<serde_json::Value>,

    #[serde(default)]
    #[schemars(description = "Day(s) of month (1-31) on which the entry fires")]
    pub day: Option<OneOrMany<u32>>,

    #[serde(default)]
    #[schemars(description = "Day(s) of week on which the entry fires, 0 = Monday through 6 = Sunday")]
    pub dow: Option<OneOrMany<u32>>,

    #[serde(default)]
    #[schemars(
        description = "Chance (0.0-1.0) that the entry is eligible on any given date. Omitted means always eligible."
    )]
    pub probability: Option<f64>,

    #[schemars(description = "Posting lines in output order")]
    pub postings: Vec<PostingSpec>,
}

/// Keeps a present key as `Some`, even when its value is `null`.
fn deserialize_marker<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl EntryDefinitionSpec {
    /// The `once` key arms the trigger whatever its value; only its absence leaves it off.
    pub fn once_armed(&self) -> bool {
        self.once.is_some()
    }
}

/// Top-level input: an array of entry definitions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DefinitionsDocument {
    pub entries: Vec<EntryDefinitionSpec>,
}

impl DefinitionsDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DefinitionsDocument)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
