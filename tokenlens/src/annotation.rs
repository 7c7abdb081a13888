//! Token annotation model
//!
//! Decodes the `/generate` response body and classifies it into an
//! [`Annotation`]: per-token probability data, a plain-text fallback, or
//! nothing at all. Individual malformed token records are repaired or dropped
//! instead of failing the whole response.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// The body decoded to JSON but is not an object.
#[derive(Error, Debug)]
#[error("Unexpected response shape: expected a JSON object, got {0}")]
pub struct ShapeError(pub &'static str);

/// Errors from decoding a response body
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// One candidate token and its probability at a position
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub token: String,
    pub probability: f64,
}

/// A generated token with its sampling probability and top alternatives
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    /// Token text, whitespace included
    pub token: String,
    /// Probability the sampler assigned to this token (0.0 - 1.0)
    pub probability: f64,
    /// Up to five alternatives, in the order the server sent them
    pub alternatives: Vec<Alternative>,
}

impl TokenRecord {
    pub fn new(token: impl Into<String>, probability: f64) -> Self {
        Self {
            token: token.into(),
            probability: clamp_probability(probability),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternative(mut self, token: impl Into<String>, probability: f64) -> Self {
        self.alternatives.push(Alternative {
            token: token.into(),
            probability: clamp_probability(probability),
        });
        self
    }

    /// Build a record from one entry of the `response` array.
    ///
    /// Returns `None` when the entry has no usable `token`.
    fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let token = entry.get("token")?.as_str()?.to_string();

        let probability = match entry.get("probability").and_then(coerce_number) {
            Some(p) => clamp_probability(p),
            None => {
                warn!(token = %token, "Token record has no numeric probability, using 0");
                0.0
            }
        };

        let alternatives = entry
            .get("top_5")
            .and_then(Value::as_object)
            .map(parse_alternatives)
            .unwrap_or_default();

        Some(Self {
            token,
            probability,
            alternatives,
        })
    }
}

fn parse_alternatives(top: &Map<String, Value>) -> Vec<Alternative> {
    top.iter()
        .filter_map(|(token, prob)| {
            coerce_number(prob).map(|p| Alternative {
                token: token.clone(),
                probability: clamp_probability(p),
            })
        })
        .collect()
}

/// Numbers pass through; numeric strings are parsed.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.is_finite())
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        // Adding 0.0 turns -0.0 into 0.0
        p.clamp(0.0, 1.0) + 0.0
    }
}

/// A `/generate` response body after boundary decoding
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    /// Raw entries of the `response` array, if present
    records: Option<Vec<Value>>,
    /// The full generated text, if present
    text: Option<String>,
}

impl GenerationResponse {
    /// Decode a response body.
    ///
    /// Any JSON object is accepted; absent or mistyped fields are treated as
    /// missing. Anything else is an error.
    pub fn from_json(body: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(value)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ShapeError> {
        let Value::Object(mut map) = value else {
            return Err(ShapeError(json_kind(&value)));
        };

        let records = match map.remove("response") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        };
        let text = match map.remove("text") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        Ok(Self { records, text })
    }

    /// Number of raw token entries received
    pub fn record_count(&self) -> usize {
        self.records.as_ref().map_or(0, Vec::len)
    }

    /// Classify into the shape the renderer works with
    pub fn classify(&self) -> Annotation {
        let raw = self.records.as_deref().unwrap_or_default();
        let tokens: Vec<TokenRecord> = raw.iter().filter_map(TokenRecord::from_value).collect();

        if tokens.len() < raw.len() {
            warn!(
                received = raw.len(),
                usable = tokens.len(),
                "Skipped malformed token records"
            );
        }

        if !tokens.is_empty() {
            return Annotation::Annotated {
                tokens,
                text: self.text.clone(),
            };
        }

        match self.text.as_deref() {
            Some(text) if !text.is_empty() => Annotation::Plain(text.to_string()),
            _ => Annotation::Empty,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// What a successful response contains, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Per-token probability data (never empty)
    Annotated {
        tokens: Vec<TokenRecord>,
        text: Option<String>,
    },
    /// Final text only; probabilities were not returned
    Plain(String),
    /// Neither tokens nor text
    Empty,
}

impl Annotation {
    pub fn tokens(&self) -> &[TokenRecord] {
        match self {
            Annotation::Annotated { tokens, .. } => tokens,
            _ => &[],
        }
    }
}
