//! Question catalog normalization.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::Question;

/// Placeholder shown when a question carries no usable text.
const MISSING_TEXT: &str = "—";

/// The questions endpoint returns either a bare list or an object wrapping
/// the list under one of several keys.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum QuestionsPayload {
    List(Vec<RawQuestion>),
    Wrapped(WrappedQuestions),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WrappedQuestions {
    items: Option<Vec<RawQuestion>>,
    questions: Option<Vec<RawQuestion>>,
    data: Option<Vec<RawQuestion>>,
    result: Option<Vec<RawQuestion>>,
}

impl QuestionsPayload {
    /// Unwrap the list, trying the known wrapper keys in a fixed order.
    fn into_list(self) -> Vec<RawQuestion> {
        match self {
            QuestionsPayload::List(list) => list,
            QuestionsPayload::Wrapped(w) => w
                .items
                .or(w.questions)
                .or(w.data)
                .or(w.result)
                .unwrap_or_default(),
        }
    }
}

/// A question record as the backend sends it, across field-name
/// generations (English, Spanish, and Mongo-style ids).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawQuestion {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub question: Option<String>,
    pub text: Option<String>,
    pub pregunta: Option<String>,
    pub title: Option<String>,
    pub enunciado: Option<String>,
    pub category: Option<String>,
    pub categoria: Option<String>,
    pub options: Option<Vec<String>>,
    pub opciones: Option<Vec<String>>,
    #[serde(rename = "correctIndex")]
    pub correct_index: Option<Value>,
    #[serde(rename = "respuestaCorrecta")]
    pub respuesta_correcta: Option<Value>,
    pub img: Option<String>,
    pub image: Option<String>,
}

impl RawQuestion {
    /// Category with the fixed alias precedence, shared with the overview
    /// aggregator's inferred mode.
    pub(crate) fn resolved_category(&self) -> Option<&str> {
        self.category.as_deref().or(self.categoria.as_deref())
    }
}

/// Normalize a questions payload into canonical records. Aliases resolve
/// in a fixed precedence order; missing fields get placeholder values
/// instead of failing the record.
pub fn normalize_questions(payload: QuestionsPayload) -> Vec<Question> {
    payload.into_list().into_iter().map(canonicalize).collect()
}

fn canonicalize(raw: RawQuestion) -> Question {
    let id = raw
        .mongo_id
        .or(raw.id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let text = raw
        .question
        .or(raw.text)
        .or(raw.pregunta)
        .or(raw.title)
        .or(raw.enunciado)
        .unwrap_or_else(|| MISSING_TEXT.to_string());

    let category = raw.category.or(raw.categoria);
    let options = raw.options.or(raw.opciones).unwrap_or_default();
    let correct_index = raw
        .correct_index
        .or(raw.respuesta_correcta)
        .as_ref()
        .and_then(numeric_index);
    let image = raw.img.or(raw.image);

    Question {
        id,
        text,
        category,
        options,
        correct_index,
        image,
    }
}

/// Accept only non-negative whole numbers; the same field has carried
/// answer text in some backend versions, which is ignored.
fn numeric_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return Some(n as usize);
    }
    value
        .as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as usize)
}
