use serde::Serialize;
use std::fmt;

/// Entity category as tagged by the model.
///
/// Records keep the raw label string; this is only used to group and
/// describe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    GeoPolitical,
    Facility,
    Time,
    Event,
    Other,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Person => write!(f, "PERSON"),
            EntityType::Organization => write!(f, "ORGANIZATION"),
            EntityType::Location => write!(f, "LOCATION"),
            EntityType::GeoPolitical => write!(f, "GEOPOLITICAL"),
            EntityType::Facility => write!(f, "FACILITY"),
            EntityType::Time => write!(f, "TIME"),
            EntityType::Event => write!(f, "EVENT"),
            EntityType::Other => write!(f, "OTHER"),
        }
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PER" | "PERSON" => EntityType::Person,
            "ORG" | "ORGANIZATION" => EntityType::Organization,
            "LOC" | "LOCATION" => EntityType::Location,
            "GPE" => EntityType::GeoPolitical,
            "FAC" | "FACILITY" => EntityType::Facility,
            "TIMEX" | "TIME" | "DATE" => EntityType::Time,
            "EVE" | "EVENT" => EntityType::Event,
            _ => EntityType::Other,
        }
    }
}

/// One recognized entity occurrence within a prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    // Surface text as it appears in the sentence
    pub phrase: String,

    // Category tag, e.g. PER, ORG, LOC, TIMEX
    pub label: String,
}

impl EntitySpan {
    pub fn new(phrase: &str, label: &str) -> Self {
        EntitySpan {
            phrase: phrase.to_string(),
            label: label.to_string(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        EntityType::from(self.label.as_str())
    }
}

/// Model output for one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub text: String,
    pub entities: Vec<EntitySpan>,
}

impl Prediction {
    pub fn new(text: &str) -> Self {
        Prediction {
            text: text.to_string(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntitySpan) -> Self {
        self.entities.push(entity);
        self
    }
}

/// Flat output row, one per entity span
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    #[serde(rename = "Original Sentence")]
    pub original_sentence: String,

    #[serde(rename = "Entity Text")]
    pub entity_text: String,

    #[serde(rename = "Entity Type")]
    pub entity_type: String,
}

impl ExtractedRecord {
    pub fn new(original_sentence: &str, span: &EntitySpan) -> Self {
        ExtractedRecord {
            original_sentence: original_sentence.to_string(),
            entity_text: span.phrase.clone(),
            entity_type: span.label.clone(),
        }
    }
}
