/// `background-color` to `backgroundColor`. Only the first letter of each
/// later segment changes case.
pub(crate) fn camel_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    for (idx, segment) in property.split('-').enumerate() {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if idx > 0 => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(segment),
        }
    }
    out
}

/// `userId` to `user-id`: a hyphen after every letter that precedes an
/// uppercase letter, then everything lower-cased.
pub(crate) fn param_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        let boundary = chars.peek().is_some_and(char::is_ascii_uppercase);
        if ch.is_ascii_alphabetic() && boundary {
            out.push('-');
        }
    }
    out.to_lowercase()
}

/// The whitespace-separated tokens of a `class` attribute.
pub(crate) fn class_tokens(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split_ascii_whitespace()
        .map(str::to_string)
        .collect()
}
