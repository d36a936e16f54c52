//! Quiz-shaped replies from the generation service.
//!
//! A reply is treated as a quiz when it is a JSON object carrying all five
//! fields. Field values are read leniently: text fields that are not strings
//! read as empty, and an `answer` that is not a whole number names no choice.
//! Anything else is displayed as plain text.

use serde::Serialize;
use serde_json::{Map, Value};

/// Separator between choices in [`GenerateResponse::options`]
pub const OPTION_DELIMITER: &str = "//";

const REQUIRED_FIELDS: [&str; 5] = ["question", "passage", "options", "answer", "explanation"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    pub question: String,
    pub passage: String,
    pub options: String,
    /// 1-based index into the split options; `None` when the reply's value
    /// is not a whole number
    pub answer: Option<i64>,
    pub explanation: String,
}

/// One labelled choice of a quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub text: String,
    pub is_answer: bool,
}

impl GenerateResponse {
    /// Choices in order, labelled A, B, C, ...
    pub fn choices(&self) -> Vec<Choice> {
        self.options
            .split(OPTION_DELIMITER)
            .enumerate()
            .map(|(index, text)| Choice {
                label: choice_label(index),
                text: text.to_string(),
                is_answer: self.answer_index() == Some(index),
            })
            .collect()
    }

    /// Zero-based position of the answer, if it names an existing choice.
    pub fn answer_index(&self) -> Option<usize> {
        let count = self.options.split(OPTION_DELIMITER).count();
        self.answer
            .and_then(|answer| usize::try_from(answer).ok())
            .and_then(|n| n.checked_sub(1))
            .filter(|index| *index < count)
    }

    pub fn answer_label(&self) -> Option<String> {
        self.answer_index().map(choice_label)
    }
}

/// Alphabetic label for a zero-based position: A..Z, then AA, AB, ...
pub fn choice_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Interprets an already-decoded value as a quiz.
pub fn from_value(value: &Value) -> Option<GenerateResponse> {
    let object = value.as_object()?;
    if !REQUIRED_FIELDS.iter().all(|field| object.contains_key(*field)) {
        return None;
    }
    Some(GenerateResponse {
        question: text_field(object, "question"),
        passage: text_field(object, "passage"),
        options: text_field(object, "options"),
        answer: object.get("answer").and_then(whole_number),
        explanation: text_field(object, "explanation"),
    })
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Integers, and floats with no fractional part such as `2.0`
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Interprets message content as a quiz. Returns `None` on any failure.
pub fn try_parse_structured(content: &str) -> Option<GenerateResponse> {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => from_value(&value),
        Err(e) => {
            tracing::trace!(error = %e, "content is not JSON; rendering as text");
            None
        }
    }
}
