use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Field of a fetched record that holds the string-encoded idea collection.
pub const IDEAS_FIELD: &str = "ideas";

/// One candidate product idea. Serialized as `{title: description}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdeaUnit {
    pub title: String,
    pub description: String,
}

impl IdeaUnit {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// The unit as a standalone JSON object, ready to be enriched with scores.
    pub fn to_object(&self) -> Map<String, Value> {
        let mut object = Map::with_capacity(1);
        object.insert(self.title.clone(), Value::String(self.description.clone()));
        object
    }
}

impl Serialize for IdeaUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.title, &self.description)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for IdeaUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdeaUnitVisitor;

        impl<'de> Visitor<'de> for IdeaUnitVisitor {
            type Value = IdeaUnit;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a single-entry map of title to description")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<IdeaUnit, A::Error> {
                let (title, description): (String, String) = access
                    .next_entry()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if access.next_key::<String>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(IdeaUnit { title, description })
            }
        }

        deserializer.deserialize_map(IdeaUnitVisitor)
    }
}

/// Full payload fetched for one generated identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaRecord(pub Map<String, Value>);

impl IdeaRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl From<Map<String, Value>> for IdeaRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// What the cache knows about a keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordCacheEntry {
    /// Written as soon as an identifier has been generated.
    Identifier { id: String },
    /// Written once the record for the identifier has been fetched.
    Record(IdeaRecord),
}

impl KeywordCacheEntry {
    pub fn id(&self) -> Option<&str> {
        match self {
            KeywordCacheEntry::Identifier { id } => Some(id),
            KeywordCacheEntry::Record(record) => record.id(),
        }
    }
}

/// Accumulated ideas for one acquisition, unique by (title, description) and
/// never larger than its limit.
#[derive(Debug, Clone)]
pub struct IdeaSet {
    units: HashSet<IdeaUnit>,
    limit: usize,
}

impl IdeaSet {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            units: HashSet::with_capacity(limit),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_full(&self) -> bool {
        self.units.len() >= self.limit
    }

    pub fn contains(&self, unit: &IdeaUnit) -> bool {
        self.units.contains(unit)
    }

    /// Returns false for duplicates and once the limit is reached.
    pub fn insert(&mut self, unit: IdeaUnit) -> bool {
        if self.is_full() {
            return false;
        }
        self.units.insert(unit)
    }

    /// Inserts units in order until the set is full or the units run out.
    /// Returns how many new units were added.
    pub fn extend_until_full<I>(&mut self, units: I) -> usize
    where
        I: IntoIterator<Item = IdeaUnit>,
    {
        let mut added = 0;
        for unit in units {
            if self.is_full() {
                break;
            }
            if self.units.insert(unit) {
                added += 1;
            }
        }
        added
    }

    /// Order is whatever the underlying set yields.
    pub fn into_vec(self) -> Vec<IdeaUnit> {
        self.units.into_iter().collect()
    }
}

/// An idea merged with the scoring attributes returned by the LLM.
pub type ScoredIdea = Map<String, Value>;
