//! Python literal decoding and canonical formatting
//!
//! String literals are decoded from their source form (prefixes, quotes,
//! escape sequences) and re-emitted with Python's `repr` conventions; numeric
//! literals are normalized the way the interpreter prints them.

/// A decoded string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub value: String,
    pub is_bytes: bool,
    pub is_formatted: bool,
}

/// Decodes the source text of a single string literal, prefix included.
///
/// Returns `None` when the text is not a well-formed literal.
pub fn parse_string(text: &str) -> Option<StringLiteral> {
    let prefix_len = text
        .find(|c: char| c == '\'' || c == '"')
        .filter(|&idx| text[..idx].chars().all(|c| "rRbBuUfFtT".contains(c)))?;
    let prefix = &text[..prefix_len];
    let rest = &text[prefix_len..];

    let quote = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        &rest[..3]
    } else {
        &rest[..1]
    };

    if rest.len() < quote.len() * 2 || !rest.ends_with(quote) {
        return None;
    }
    let body = &rest[quote.len()..rest.len() - quote.len()];

    let is_raw = prefix.contains(['r', 'R']);
    let is_bytes = prefix.contains(['b', 'B']);
    let is_formatted = prefix.contains(['f', 'F', 't', 'T']);

    let value = if is_raw {
        body.to_string()
    } else {
        unescape(body, is_bytes)
    };

    Some(StringLiteral {
        value,
        is_bytes,
        is_formatted,
    })
}

fn unescape(body: &str, is_bytes: bool) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };

        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                push_code_point(&mut out, value, &format!("\\{:o}", value));
            }
            'x' => push_hex_escape(&mut out, &mut chars, 2, 'x'),
            'u' if !is_bytes => push_hex_escape(&mut out, &mut chars, 4, 'u'),
            'U' if !is_bytes => push_hex_escape(&mut out, &mut chars, 8, 'U'),
            other => {
                // unknown escapes (including `\N{...}`) are kept verbatim
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_hex_escape(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    marker: char,
) {
    let mut hex = String::with_capacity(digits);
    while hex.len() < digits {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(*c);
                chars.next();
            }
            _ => break,
        }
    }

    let raw = format!("\\{}{}", marker, hex);
    match (hex.len() == digits, u32::from_str_radix(&hex, 16)) {
        (true, Ok(value)) => push_code_point(out, value, &raw),
        _ => out.push_str(&raw),
    }
}

fn push_code_point(out: &mut String, value: u32, raw: &str) {
    match char::from_u32(value) {
        Some(c) => out.push(c),
        None => out.push_str(raw),
    }
}

/// Formats a string value the way Python's `repr` does.
pub fn python_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Canonical text of a numeric literal (`0x10` → `16`, `2.50` → `2.5`).
///
/// Literals that cannot be normalized are returned without underscores.
pub fn canonical_number(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();

    if let Some(imaginary) = cleaned
        .strip_suffix('j')
        .or_else(|| cleaned.strip_suffix('J'))
    {
        return match imaginary.parse::<f64>() {
            Ok(value) => {
                let text = format_float(value);
                format!("{}j", text.strip_suffix(".0").unwrap_or(&text))
            }
            Err(_) => cleaned,
        };
    }

    let lower = cleaned.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };

    if let Some(radix) = radix {
        return u128::from_str_radix(&lower[2..], radix)
            .map(|v| v.to_string())
            .unwrap_or(cleaned);
    }

    if lower.contains(['.', 'e']) || lower == "inf" {
        return lower
            .parse::<f64>()
            .map(format_float)
            .unwrap_or(cleaned);
    }

    lower
        .parse::<u128>()
        .map(|v| v.to_string())
        .unwrap_or(cleaned)
}

/// Formats a float like Python's `repr(float)`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let text = format!("{:e}", value);
        if let Some((mantissa, exponent)) = text.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return text;
    }

    let text = format!("{}", value);
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Cleans up docstring indentation like Python's `inspect.cleandoc`.
pub fn clean_doc(doc: &str) -> String {
    let expanded: Vec<String> = doc.lines().map(expand_tabs).collect();

    let margin = expanded
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            (!content.is_empty()).then(|| line.chars().count() - content.chars().count())
        })
        .min()
        .unwrap_or(0);

    let mut lines: Vec<&str> = Vec::with_capacity(expanded.len());
    for (idx, line) in expanded.iter().enumerate() {
        if idx == 0 {
            lines.push(line.trim_start());
        } else {
            lines.push(skip_chars(line, margin).trim_end_matches([' ', '\t']));
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();

    lines[leading..].join("\n")
}

fn skip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let spaces = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_strings() {
        let lit = parse_string("'baz'").unwrap();
        assert_eq!(lit.value, "baz");
        assert!(!lit.is_bytes);

        let lit = parse_string(r#""a\tb\n""#).unwrap();
        assert_eq!(lit.value, "a\tb\n");

        let lit = parse_string(r"r'\d+'").unwrap();
        assert_eq!(lit.value, r"\d+");
    }

    #[test]
    fn test_parse_prefixed_strings() {
        assert!(parse_string("b'asdf'").unwrap().is_bytes);
        assert!(parse_string("Rb'asdf'").unwrap().is_bytes);
        assert!(parse_string("f'{x}'").unwrap().is_formatted);
        assert_eq!(parse_string("u'caf\\xe9'").unwrap().value, "café");
        assert!(parse_string("'unterminated").is_none());
        assert!(parse_string("x'nope'").is_none());
    }

    #[test]
    fn test_parse_triple_quoted() {
        let lit = parse_string("\"\"\"Line one.\n\n    Line two.\n    \"\"\"").unwrap();
        assert_eq!(lit.value, "Line one.\n\n    Line two.\n    ");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse_string(r"'\101\x42C'").unwrap().value, "ABC");
        assert_eq!(parse_string(r"'\N{DASH}'").unwrap().value, r"\N{DASH}");
        assert_eq!(parse_string("'a\\\nb'").unwrap().value, "ab");
    }

    #[test]
    fn test_python_repr() {
        assert_eq!(python_repr("baz"), "'baz'");
        assert_eq!(python_repr("it's"), "\"it's\"");
        assert_eq!(python_repr("both ' and \""), "'both \\' and \"'");
        assert_eq!(python_repr("a\\b\n"), "'a\\\\b\\n'");
        assert_eq!(python_repr("\x07"), "'\\x07'");
        assert_eq!(python_repr("café"), "'café'");
    }

    #[test]
    fn test_canonical_integers() {
        assert_eq!(canonical_number("42"), "42");
        assert_eq!(canonical_number("0x10"), "16");
        assert_eq!(canonical_number("0o17"), "15");
        assert_eq!(canonical_number("0b101"), "5");
        assert_eq!(canonical_number("1_000_000"), "1000000");
        assert_eq!(canonical_number("00"), "0");
    }

    #[test]
    fn test_canonical_floats() {
        assert_eq!(canonical_number("2.3"), "2.3");
        assert_eq!(canonical_number("2.30"), "2.3");
        assert_eq!(canonical_number("1."), "1.0");
        assert_eq!(canonical_number(".5"), "0.5");
        assert_eq!(canonical_number("1e3"), "1000.0");
        assert_eq!(canonical_number("1e16"), "1e+16");
        assert_eq!(canonical_number("1.5e-5"), "1.5e-05");
        assert_eq!(canonical_number("0.0001"), "0.0001");
    }

    #[test]
    fn test_canonical_imaginary() {
        assert_eq!(canonical_number("2j"), "2j");
        assert_eq!(canonical_number("1.5J"), "1.5j");
    }

    #[test]
    fn test_clean_doc() {
        assert_eq!(clean_doc("Pkg"), "Pkg");
        assert_eq!(
            clean_doc("API status endpoint.\n\n    Returns the status.\n    "),
            "API status endpoint.\n\nReturns the status."
        );
        assert_eq!(clean_doc("\n    Indented.\n      More.\n"), "Indented.\n  More.");
        assert_eq!(clean_doc("   "), "");
        assert_eq!(clean_doc("Head.\n  \u{a0}x\n   \u{e9}y"), "Head.\nx\n\u{e9}y");
    }
}
