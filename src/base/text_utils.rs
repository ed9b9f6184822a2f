//! Text helpers for identifiers and naming styles.

/// Check if a character is considered part of an identifier.
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// `UpperCamelCase`: starts with an uppercase letter, no underscores.
///
/// Acronyms such as `HTTPRequest` are accepted.
pub fn is_upper_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c != '_' && is_word_character(c))
}

/// `lower_snake_case`: lowercase letters, digits and single underscores.
pub fn is_lower_snake_case(name: &str) -> bool {
    is_snake_case(name, |c| c.is_lowercase())
}

/// `UPPER_SNAKE_CASE`: uppercase letters, digits and single underscores.
pub fn is_upper_snake_case(name: &str) -> bool {
    is_snake_case(name, |c| c.is_uppercase())
}

fn is_snake_case(name: &str, letter_ok: impl Fn(char) -> bool) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() && letter_ok(first) => {}
        _ => return false,
    }
    let mut prev_underscore = false;
    for c in chars {
        if c == '_' {
            if prev_underscore {
                return false;
            }
            prev_underscore = true;
            continue;
        }
        prev_underscore = false;
        if c.is_alphabetic() && !letter_ok(c) {
            return false;
        }
        if !is_word_character(c) {
            return false;
        }
    }
    !prev_underscore
}

/// Convert an identifier to `lower_snake_case` (used in diagnostic hints).
pub fn to_lower_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_numeric());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if !out.is_empty() && !out.ends_with('_') && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert an identifier to `UPPER_SNAKE_CASE`.
pub fn to_upper_snake_case(name: &str) -> String {
    to_lower_snake_case(name).to_uppercase()
}

/// Convert an identifier to `UpperCamelCase`.
pub fn to_upper_camel_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
