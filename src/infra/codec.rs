//! Minimal quoted row codec shared by the roster and log files.
//!
//! Rows are comma-separated; a field containing a comma, quote or line break
//! is double-quoted with embedded quotes doubled. Decoding is lenient about
//! surrounding whitespace but strict about unterminated quotes.

/// Encode fields as one row, quoting where needed.
pub fn encode_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| encode_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_field(field: &str) -> String {
    if field
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\n' | '\r'))
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Decode one row into its fields. The error is a human-readable reason;
/// callers attach the file path.
pub fn decode_row(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                ',' => fields.push(std::mem::take(&mut field)),
                '"' if field.is_empty() => in_quotes = true,
                '"' => return Err("unexpected quote inside unquoted field".to_string()),
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}
