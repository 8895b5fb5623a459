//! Cleaning for strings that end up inside tag markup: titles, descriptions,
//! and media captions arrive from CMS editors and may contain markup,
//! newlines, or half-escaped text.

/// Drops everything between `<` and the next `>`, inclusive. An unterminated
/// `<` swallows the rest of the string.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(stop) => rest = &rest[start + stop + 1..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// HTML-escapes `&`, `<`, `>`, and `"`. An `&` that already begins a
/// character reference (`&amp;`, `&#228;`, ...) is left alone, which makes
/// escaping idempotent: values sanitized upstream by the CMS pass through
/// unchanged.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    for (i, c) in input.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' => {
                if starts_reference(&bytes[i + 1..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            _ => out.push(c),
        }
    }
    out
}

// True if `rest` (the bytes after an `&`) starts with `name;` or `#digits;`.
fn starts_reference(rest: &[u8]) -> bool {
    let mut i = 0;
    if rest.first() == Some(&b'#') {
        i = 1;
        while i < rest.len() && rest[i].is_ascii_digit() {
            i += 1;
        }
        i > 1 && rest.get(i) == Some(&b';')
    } else {
        while i < rest.len() && rest[i].is_ascii_alphanumeric() {
            i += 1;
        }
        i > 0 && rest.get(i) == Some(&b';')
    }
}

/// Full cleaning for titles and descriptions: markup stripped, the remainder
/// escaped, carriage returns dropped, newlines collapsed to spaces.
pub fn normalize(input: &str) -> String {
    escape(&strip_tags(input)).replace('\r', "").replace('\n', " ")
}
