use crate::entity::types::{EntitySpan, ExtractedRecord, Prediction};
use anyhow::Result;
use serde_json::Value;
use tracing::{debug, error};

use super::TARGET_ENTITY;

/// Describe a JSON value's kind for error messages
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Prediction {
    /// Validate an engine payload for a single-sentence call.
    ///
    /// The payload must be an array holding exactly one prediction object.
    pub fn from_payload(payload: &Value) -> Result<Prediction> {
        let items = match payload.as_array() {
            Some(items) => items,
            None => {
                error!(
                    target: TARGET_ENTITY,
                    "Engine payload is not an array. Actual type: {}",
                    json_type(payload)
                );
                return Err(anyhow::anyhow!(
                    "Engine payload is not an array (got {})",
                    json_type(payload)
                ));
            }
        };

        match items.as_slice() {
            [item] => parse_prediction_object(item),
            _ => Err(anyhow::anyhow!(
                "Expected exactly one prediction, got {}",
                items.len()
            )),
        }
    }
}

/// Parse one `{"text": ..., "ner_entities": [...]}` object
fn parse_prediction_object(value: &Value) -> Result<Prediction> {
    let obj = value.as_object().ok_or_else(|| {
        anyhow::anyhow!("Prediction is not an object (got {})", json_type(value))
    })?;

    let text = obj
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Prediction has no string 'text' field"))?;

    let mut prediction = Prediction::new(text);

    match obj.get("ner_entities") {
        None | Some(Value::Null) => {}
        Some(Value::Array(entities)) => {
            for (i, entity_value) in entities.iter().enumerate() {
                let entity = parse_entity_object(entity_value)
                    .ok_or_else(|| anyhow::anyhow!("Entity {} lacks string 'phrase'/'label'", i))?;
                prediction = prediction.with_entity(entity);
            }
        }
        Some(other) => {
            return Err(anyhow::anyhow!(
                "The 'ner_entities' field is not an array (got {})",
                json_type(other)
            ));
        }
    }

    debug!(
        target: TARGET_ENTITY,
        "Parsed {} entities from prediction",
        prediction.entities.len()
    );

    Ok(prediction)
}

/// Parse individual entity from JSON object
fn parse_entity_object(entity_value: &Value) -> Option<EntitySpan> {
    let phrase = entity_value.get("phrase")?.as_str()?;
    let label = entity_value.get("label")?.as_str()?;
    Some(EntitySpan::new(phrase, label))
}

/// Flatten a prediction into one record per entity span.
///
/// A prediction without entities yields no records.
pub fn extract_records(prediction: &Prediction) -> Vec<ExtractedRecord> {
    prediction
        .entities
        .iter()
        .map(|span| ExtractedRecord::new(&prediction.text, span))
        .collect()
}
