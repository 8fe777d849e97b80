//! Patient Care Report narrative generation.
//!
//! A PCR's clinical detail lives in the free-form `full_form` JSON object.
//! Two things are derived from it here: the prompt sent to the local language
//! model, and the rule-based narrative used when no model is reachable.

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Ensure the submitted form is a JSON object.
pub fn validate_full_form(full_form: &Value) -> Result<&Map<String, Value>, CoreError> {
    full_form
        .as_object()
        .ok_or_else(|| CoreError::Validation("full_form must be a JSON object".into()))
}

/// Read a field as display text. Numbers and booleans are stringified;
/// blank strings count as missing.
fn text(form: &Map<String, Value>, key: &str) -> Option<String> {
    match form.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        _ => None,
    }
}

/// First non-empty field among `keys`.
fn first_text(form: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| text(form, k))
}

/// A list field, accepting either a JSON array or a comma-separated string.
fn list(form: &Map<String, Value>, key: &str) -> Vec<String> {
    match form.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Vital signs rendered as `label value` pairs in a fixed order.
fn vitals(form: &Map<String, Value>) -> Vec<String> {
    const LABELS: &[(&str, &str)] = &[
        ("bp", "BP"),
        ("blood_pressure", "BP"),
        ("pulse", "PR"),
        ("pulse_rate", "PR"),
        ("resp_rate", "RR"),
        ("respiratory_rate", "RR"),
        ("temp", "Temp"),
        ("temperature", "Temp"),
        ("spo2", "SpO2"),
        ("gcs", "GCS"),
    ];

    let source = match form.get("vital_signs").and_then(Value::as_object) {
        Some(nested) => nested,
        None => form,
    };

    let mut seen = Vec::new();
    let mut out = Vec::new();
    for (key, label) in LABELS {
        if seen.contains(label) {
            continue;
        }
        if let Some(value) = text(source, key) {
            seen.push(*label);
            out.push(format!("{label} {value}"));
        }
    }
    out
}

/// Build the rule-based narrative for a PCR form.
///
/// Sentences whose source fields are missing are omitted, so a sparse form
/// still yields readable text.
pub fn template_narrative(form: &Map<String, Value>) -> String {
    let mut sentences = Vec::new();

    let patient = text(form, "patient_name").unwrap_or_else(|| "The patient".to_string());
    let mut descriptor = Vec::new();
    if let Some(age) = text(form, "age") {
        descriptor.push(format!("{age}-year-old"));
    }
    if let Some(sex) = first_text(form, &["sex", "gender"]) {
        descriptor.push(sex.to_lowercase());
    }

    let mut opening = if descriptor.is_empty() {
        patient
    } else {
        format!("{patient}, a {},", descriptor.join(" "))
    };
    opening.push_str(" was attended to");
    if let Some(location) = first_text(form, &["location", "incident_location"]) {
        opening.push_str(&format!(" at {location}"));
    }
    if let Some(date) = text(form, "date") {
        opening.push_str(&format!(" on {date}"));
    }
    if let Some(time) = first_text(form, &["time_of_call", "time"]) {
        opening.push_str(&format!(" ({time})"));
    }
    opening.push('.');
    sentences.push(opening);

    if let Some(incident) = first_text(form, &["incident_type", "nature_of_call"]) {
        sentences.push(format!("The call was for a {} incident.", incident.to_lowercase()));
    }
    if let Some(complaint) = text(form, "chief_complaint") {
        sentences.push(format!("Chief complaint: {complaint}."));
    }

    let vitals = vitals(form);
    if !vitals.is_empty() {
        sentences.push(format!("Vital signs on assessment: {}.", vitals.join(", ")));
    }

    if let Some(assessment) = first_text(form, &["assessment", "findings"]) {
        sentences.push(format!("Assessment findings: {assessment}."));
    }

    let interventions = list(form, "interventions");
    if !interventions.is_empty() {
        sentences.push(format!("Interventions performed: {}.", interventions.join(", ")));
    }
    let medications = list(form, "medications");
    if !medications.is_empty() {
        sentences.push(format!("Medications given: {}.", medications.join(", ")));
    }

    match first_text(form, &["hospital", "destination_hospital", "transported_to"]) {
        Some(hospital) => sentences.push(format!("The patient was transported to {hospital}.")),
        None => {
            if let Some(disposition) = text(form, "disposition") {
                sentences.push(format!("Disposition: {disposition}."));
            }
        }
    }

    if let Some(recorder) = text(form, "recorder") {
        sentences.push(format!("Report recorded by {recorder}."));
    }

    sentences.join(" ")
}

/// Build the instruction prompt sent to the local language model.
pub fn ai_prompt(form: &Map<String, Value>) -> String {
    let form_json = serde_json::to_string_pretty(form).unwrap_or_default();
    format!(
        "You are an emergency medical services documentation assistant for a municipal \
         disaster risk reduction office. Write a concise, factual patient care report \
         narrative in the third person and past tense, using only the information in the \
         form below. Do not invent findings, vital signs, or treatments. Output one \
         paragraph of plain text without headings.\n\nForm:\n{form_json}\n"
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn full_form_must_be_object() {
        assert!(validate_full_form(&json!({})).is_ok());
        assert!(validate_full_form(&json!([1, 2])).is_err());
        assert!(validate_full_form(&json!("text")).is_err());
    }

    #[test]
    fn complete_form_produces_all_sentences() {
        let form = obj(json!({
            "patient_name": "Juan Dela Cruz",
            "age": 42,
            "sex": "Male",
            "location": "Brgy. San Roque",
            "date": "2026-03-01",
            "incident_type": "Vehicular Accident",
            "chief_complaint": "left leg pain",
            "vital_signs": { "bp": "120/80", "pulse": 98, "spo2": "97%" },
            "interventions": ["splinting", "wound dressing"],
            "hospital": "Provincial Hospital",
            "recorder": "R. Santos"
        }));

        let narrative = template_narrative(&form);
        assert!(narrative.starts_with(
            "Juan Dela Cruz, a 42-year-old male, was attended to at Brgy. San Roque on 2026-03-01."
        ));
        assert!(narrative.contains("vehicular accident incident"));
        assert!(narrative.contains("Vital signs on assessment: BP 120/80, PR 98, SpO2 97%."));
        assert!(narrative.contains("Interventions performed: splinting, wound dressing."));
        assert!(narrative.contains("transported to Provincial Hospital"));
        assert!(narrative.ends_with("Report recorded by R. Santos."));
    }

    #[test]
    fn sparse_form_still_reads() {
        let narrative = template_narrative(&obj(json!({})));
        assert_eq!(narrative, "The patient was attended to.");
    }

    #[test]
    fn comma_separated_lists_accepted() {
        let form = obj(json!({ "medications": "paracetamol, oxygen" }));
        assert!(template_narrative(&form).contains("Medications given: paracetamol, oxygen."));
    }

    #[test]
    fn duplicate_vital_aliases_reported_once() {
        let form = obj(json!({ "bp": "110/70", "blood_pressure": "999/999" }));
        let narrative = template_narrative(&form);
        assert!(narrative.contains("BP 110/70"));
        assert!(!narrative.contains("999"));
    }

    #[test]
    fn prompt_embeds_form() {
        let prompt = ai_prompt(&obj(json!({ "patient_name": "Ana" })));
        assert!(prompt.contains("\"patient_name\": \"Ana\""));
        assert!(prompt.contains("Do not invent"));
    }
}
