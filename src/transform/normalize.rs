use std::{borrow::Cow, sync::OnceLock};

use deunicode::deunicode;
use regex::Regex;

use crate::{
    data::Value,
    table::{ColumnKind, Table},
};

fn disallowed_chars() -> &'static Regex {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    DISALLOWED.get_or_init(|| Regex::new(r"[^a-zA-Z0-9 ]").expect("static pattern"))
}

/// Transliterates to ASCII, drops everything but letters, digits and spaces,
/// trims, then title-cases each word.
pub fn normalize_text(input: &str) -> String {
    let ascii = deunicode(input);
    let stripped = disallowed_chars().replace_all(&ascii, "");
    title_case(stripped.trim()).into_owned()
}

/// Uppercases the first letter of each space-separated word and lowercases
/// the rest. Spacing between words is kept as-is.
pub fn title_case(input: &str) -> Cow<'_, str> {
    let mut output = String::with_capacity(input.len());
    let mut word_start = true;
    for ch in input.chars() {
        if ch.is_whitespace() {
            word_start = true;
            output.push(ch);
        } else if word_start {
            word_start = false;
            output.extend(ch.to_uppercase());
        } else {
            output.extend(ch.to_lowercase());
        }
    }
    if output == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(output)
    }
}

/// Normalizes every text cell of every `Text` column. Other columns and
/// missing cells are left untouched.
pub fn normalize_table(table: &mut Table) {
    for column in table
        .columns
        .iter_mut()
        .filter(|c| c.kind == ColumnKind::Text)
    {
        for cell in column.cells.iter_mut() {
            if let Some(Value::Text(text)) = cell {
                *text = normalize_text(text);
            }
        }
    }
}
