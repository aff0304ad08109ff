//! Response shaping
//!
//! Full mode writes the result as JSON (compact or indented, newline
//! terminated). Filtered mode picks fields out of that JSON and joins
//! their raw values with `|`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::value::RawValue;

use crate::errors::{GeoError, Result};
use crate::utils::parse_bool;

pub const FILTER_SEPARATOR: char = ',';
pub const OUTPUT_SEPARATOR: &str = "|";

/// How a lookup result is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    Full { pretty: bool },
    Filtered(Vec<String>),
}

impl ResponseShape {
    /// Pick the shape from the optional `{filter}` segment and `pretty` flag.
    ///
    /// A filter whose first field is empty (e.g. `""` or `",a"`) falls back
    /// to full mode. `pretty` is ignored in filtered mode.
    pub fn from_request(filter: Option<&str>, pretty: Option<&str>) -> Self {
        if let Some(filter) = filter {
            let fields: Vec<String> = filter
                .split(FILTER_SEPARATOR)
                .map(str::to_string)
                .collect();
            if fields.first().is_some_and(|f| !f.is_empty()) {
                return ResponseShape::Filtered(fields);
            }
        }

        ResponseShape::Full {
            pretty: pretty.and_then(parse_bool).unwrap_or(false),
        }
    }

    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            ResponseShape::Full { pretty } => render_full(value, *pretty),
            ResponseShape::Filtered(fields) => {
                render_filtered(value, fields).map(String::into_bytes)
            }
        }
    }
}

/// JSON body with a trailing newline. Characters like `&`, `<` and `>` are
/// written as-is.
pub fn render_full<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<Vec<u8>> {
    let mut body = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    body.push(b'\n');
    Ok(body)
}

/// Raw JSON values of `fields`, wrapping quotes removed, joined by `|`.
///
/// Unknown fields produce an empty segment. Values that are not strings
/// (numbers, booleans, nested objects) appear exactly as in the JSON.
pub fn render_filtered<T, S>(value: &T, fields: &[S]) -> Result<String>
where
    T: Serialize + ?Sized,
    S: AsRef<str>,
{
    let json = serde_json::to_string(value)?;
    let object: HashMap<String, &RawValue> = serde_json::from_str(&json).map_err(|e| {
        GeoError::serialization(format!("filtered output needs a JSON object: {}", e))
    })?;

    let segments: Vec<&str> = fields
        .iter()
        .map(|field| {
            object
                .get(field.as_ref())
                .map(|raw| strip_quotes(raw.get()))
                .unwrap_or("")
        })
        .collect();

    Ok(segments.join(OUTPUT_SEPARATOR))
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}
