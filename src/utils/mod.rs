pub mod ip;

/// Parse a boolean the way query flags like `?pretty=` are written.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`;
/// anything else is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
