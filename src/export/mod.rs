//! CSV generation for locally built downloads.

/// Quote a field when it contains a separator, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a header row and data rows as CSV text with `\n` line endings.
pub fn to_csv<R, F>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<str>,
{
    let mut out = String::new();
    push_row(&mut out, headers.iter());
    for row in rows {
        push_row(&mut out, row.iter());
    }
    out
}

fn push_row<I, F>(out: &mut String, fields: I)
where
    I: Iterator<Item = F>,
    F: AsRef<str>,
{
    let line = fields
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Parse CSV text produced with the standard quoting rule.
///
/// Quoted fields may contain separators, doubled quotes and line breaks. A
/// trailing newline does not produce an empty record.
pub fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();
    let mut at_record_start = true;

    while let Some(c) = chars.next() {
        at_record_start = false;
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                at_record_start = true;
            }
            _ => field.push(c),
        }
    }

    if !at_record_start {
        record.push(field);
        records.push(record);
    }
    records
}
