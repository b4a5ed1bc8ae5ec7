//! Record-to-question adapters

use crate::dataset::Record;
use qbench_core::{BenchError, BenchResult, ImageRef, MAX_CHOICES, Question};
use serde_json::Value;

/// Maps a raw dataset record to a question
pub trait Adapter: Send + Sync {
    fn adapt(&self, record: &Record) -> BenchResult<Question>;
}

impl<F> Adapter for F
where
    F: Fn(&Record) -> BenchResult<Question> + Send + Sync,
{
    fn adapt(&self, record: &Record) -> BenchResult<Question> {
        self(record)
    }
}

/// Adapter driven by field names.
///
/// Choices may be a string array or an object with parallel `label` and
/// `text` arrays. Image fields may hold a string, an object with `src`,
/// `path` or `bytes`, or an array of those.
#[derive(Debug, Clone)]
pub struct FieldAdapter {
    question_field: String,
    choices_field: Option<String>,
    image_fields: Vec<String>,
}

impl FieldAdapter {
    /// Adapter reading the question from `question_field`
    pub fn new(question_field: impl Into<String>) -> Self {
        Self {
            question_field: question_field.into(),
            choices_field: None,
            image_fields: Vec::new(),
        }
    }

    /// Read choices from `field`
    pub fn with_choices(mut self, field: impl Into<String>) -> Self {
        self.choices_field = Some(field.into());
        self
    }

    /// Read images from `fields`, in order
    pub fn with_images<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// `question` + `choices`, the MMLU layout
    pub fn multiple_choice() -> Self {
        Self::new("question").with_choices("choices")
    }

    /// `question` + `options` + `image_1`..`image_7`, the MMMU layout
    pub fn multimodal() -> Self {
        Self::new("question")
            .with_choices("options")
            .with_images((1..=7).map(|i| format!("image_{}", i)))
    }

    fn choices(&self, record: &Record) -> BenchResult<Option<Vec<String>>> {
        let Some(field) = &self.choices_field else {
            return Ok(None);
        };
        let Some(value) = record.get(field) else {
            return Ok(None);
        };

        let texts = match value {
            Value::Object(map) => map.get("text").ok_or_else(|| {
                BenchError::adapter_field(field.as_str(), "choice object has no 'text' array")
            })?,
            // Some datasets store the list as a Python-style string literal.
            Value::String(raw) => {
                return parse_list_literal(raw)
                    .map(Some)
                    .map_err(|message| BenchError::adapter_field(field.as_str(), message));
            }
            other => other,
        };

        let items = texts.as_array().ok_or_else(|| {
            BenchError::adapter_field(field.as_str(), "choices must be an array")
        })?;
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(BenchError::adapter_field(
                    field.as_str(),
                    "choices must be strings",
                )),
            })
            .collect::<BenchResult<Vec<_>>>()
            .map(Some)
    }

    fn images(&self, record: &Record) -> BenchResult<Vec<ImageRef>> {
        let mut images = Vec::new();
        for field in &self.image_fields {
            if let Some(value) = record.get(field) {
                collect_images(field, value, &mut images)?;
            }
        }
        Ok(images)
    }
}

/// Parse a Python list-of-strings literal such as `['a', "b's"]`.
///
/// Items may use either quote style; `\\`, `\'`, `\"`, `\n` and `\t` are
/// unescaped and any other escape is kept verbatim.
fn parse_list_literal(raw: &str) -> Result<Vec<String>, String> {
    let mut chars = raw.trim().chars().peekable();
    if chars.next() != Some('[') {
        return Err("choice list must start with '['".to_string());
    }

    let mut items = Vec::new();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let quote = match chars.next() {
            Some(']') => break,
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(format!("unexpected '{}' in choice list", c)),
            None => return Err("unterminated choice list".to_string()),
        };

        let mut item = String::new();
        loop {
            match chars.next() {
                Some(c) if c == quote => break,
                Some('\\') => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('t') => item.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => item.push(c),
                    Some(c) => {
                        item.push('\\');
                        item.push(c);
                    }
                    None => return Err("unterminated escape in choice list".to_string()),
                },
                Some(c) => item.push(c),
                None => return Err("unterminated string in choice list".to_string()),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            Some(']') => break,
            Some(c) => return Err(format!("expected ',' or ']' but found '{}'", c)),
            None => return Err("unterminated choice list".to_string()),
        }
    }

    if chars.any(|c| !c.is_whitespace()) {
        return Err("trailing characters after choice list".to_string());
    }
    Ok(items)
}

fn collect_images(field: &str, value: &Value, out: &mut Vec<ImageRef>) -> BenchResult<()> {
    match value {
        Value::Null => {}
        Value::String(raw) => out.push(ImageRef::parse(raw)),
        Value::Array(items) => {
            for item in items {
                collect_images(field, item, out)?;
            }
        }
        Value::Object(map) => {
            if let Some(src) = map.get("src").and_then(Value::as_str) {
                out.push(ImageRef::parse(src));
            } else if let Some(bytes) = map.get("bytes").and_then(Value::as_str) {
                out.push(ImageRef::Base64(bytes.to_string()));
            } else if let Some(path) = map.get("path").and_then(Value::as_str) {
                out.push(ImageRef::Path(path.into()));
            } else {
                return Err(BenchError::adapter_field(
                    field,
                    "image object needs 'src', 'bytes' or 'path'",
                ));
            }
        }
        _ => {
            return Err(BenchError::adapter_field(field, "unsupported image value"));
        }
    }
    Ok(())
}

impl Adapter for FieldAdapter {
    fn adapt(&self, record: &Record) -> BenchResult<Question> {
        let text = record
            .get_str(&self.question_field)
            .ok_or_else(|| {
                BenchError::adapter_field(self.question_field.as_str(), "missing question text")
            })?;

        let mut question = Question::new(text).with_images(self.images(record)?);
        if let Some(choices) = self.choices(record)? {
            if choices.len() > MAX_CHOICES {
                return Err(BenchError::adapter_field(
                    self.choices_field.as_deref().unwrap_or_default(),
                    format!("{} choices exceed the {} labels A-Z", choices.len(), MAX_CHOICES),
                ));
            }
            question = question.with_choices(choices);
        }
        Ok(question)
    }
}
