use crate::group::Groupable;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Plaintext,
}

/// One input line together with the key it is grouped by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub format: LogFormat,
    pub line_number: usize,
    pub raw: String,
    pub key: String,
}

impl LogRecord {
    pub fn parse(line: &str, line_number: usize) -> Self {
        Self::parse_with_key_field(line, line_number, None)
    }

    /// For JSON object lines the key is the flattened value at `key_field`
    /// when present, else every field as sorted `k=v` pairs. Any other line
    /// is keyed by its text with trailing whitespace removed.
    pub fn parse_with_key_field(line: &str, line_number: usize, key_field: Option<&str>) -> Self {
        let raw = line.trim_end().to_string();
        match serde_json::from_str::<Value>(line) {
            Ok(v @ Value::Object(_)) => {
                let mut flat = BTreeMap::new();
                flatten_json("", &v, &mut flat);
                let key = match key_field.and_then(|k| flat.get(k)) {
                    Some(value) => value.clone(),
                    None => synthetic_message(&flat),
                };
                LogRecord { format: LogFormat::Json, line_number, raw, key }
            }
            _ => {
                let key = raw.clone();
                LogRecord { format: LogFormat::Plaintext, line_number, raw, key }
            }
        }
    }
}

impl Groupable for LogRecord {
    fn grouping_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.key)
    }
}

fn synthetic_message(flat: &BTreeMap<String, String>) -> String {
    // BTreeMap iteration is already key-sorted.
    flat.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn flatten_json(prefix: &str, v: &Value, out: &mut BTreeMap<String, String>) {
    match v {
        Value::Object(map) => {
            for (k, v) in map.iter() {
                let key = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
                flatten_json(&key, v, out);
            }
        }
        Value::Array(arr) => {
            for (idx, item) in arr.iter().enumerate() {
                let key = if prefix.is_empty() { idx.to_string() } else { format!("{prefix}.{idx}") };
                flatten_json(&key, item, out);
            }
        }
        Value::Null => {
            out.insert(prefix.to_string(), "null".to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
    }
}
