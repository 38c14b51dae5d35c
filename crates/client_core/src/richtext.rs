//! Flattening of backend strings that may carry inline HTML into display text.
//!
//! Markup is only ever skipped, never interpreted: no attribute is evaluated and
//! script/style bodies come through as inert text, the way a text-content read would
//! show them.

/// Text content of `raw` with every tag, comment and declaration removed.
///
/// Visible text keeps its order and whitespace, character references are decoded, and
/// input without `<` or `&` is returned unchanged. `None` yields an empty string.
pub fn plain_text_of(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if !raw.contains(['<', '&']) {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with('<') {
            if !opens_markup(tail) {
                out.push('<');
                rest = &tail[1..];
                continue;
            }
            match markup_len(tail) {
                Some(len) => rest = &tail[len..],
                // unterminated markup swallows the rest of the input
                None => rest = "",
            }
        } else {
            match decode_reference(tail) {
                Some((ch, len)) => {
                    out.push(ch);
                    rest = &tail[len..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            }
        }
    }
    out.push_str(rest);
    out
}

fn opens_markup(tail: &str) -> bool {
    matches!(
        tail.as_bytes().get(1),
        Some(&b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?')
    )
}

/// Byte length of the tag, comment or declaration at the start of `tail`.
fn markup_len(tail: &str) -> Option<usize> {
    if let Some(body) = tail.strip_prefix("<!--") {
        // `<!-->` and `<!--->` are complete, empty comments
        if body.starts_with('>') {
            return Some(5);
        }
        if body.starts_with("->") {
            return Some(6);
        }
        return body.find("-->").map(|end| 4 + end + 3);
    }
    if tail.starts_with("<!") || tail.starts_with("<?") {
        return tail.find('>').map(|end| end + 1);
    }
    tag_len(tail)
}

fn tag_len(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    let mut quote: Option<u8> = None;
    let mut after_eq = false;

    for (i, &b) in bytes.iter().enumerate().skip(1) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
                after_eq = false;
            }
            continue;
        }
        match b {
            b'>' => return Some(i + 1),
            b'"' | b'\'' if after_eq => {
                quote = Some(b);
                continue;
            }
            _ => {}
        }
        after_eq = b == b'=' || (after_eq && b.is_ascii_whitespace());
    }
    None
}

/// Decodes the character reference at the start of `tail` (which begins with `&`).
fn decode_reference(tail: &str) -> Option<(char, usize)> {
    let name_len = tail
        .bytes()
        .skip(1)
        .take(32)
        .position(|b| b == b';')?;
    let name = &tail[1..1 + name_len];
    let consumed = name_len + 2;

    let ch = if let Some(numeric) = name.strip_prefix('#') {
        let (digits, radix) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16),
            None => (numeric, 10),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        // NUL, surrogates and out-of-range code points read as U+FFFD
        u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    } else {
        named_reference(name)?
    };
    Some((ch, consumed))
}

fn named_reference(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "hellip" => '\u{2026}',
        "middot" => '\u{b7}',
        "bull" => '\u{2022}',
        "copy" => '\u{a9}',
        "shy" => '\u{ad}',
        "zwnj" => '\u{200c}',
        "zwj" => '\u{200d}',
        "lrm" => '\u{200e}',
        "rlm" => '\u{200f}',
        _ => return None,
    };
    Some(ch)
}
