//! Splits markup into tags and text runs.
//!
//! The tokenizer never fails. Anything that does not form a complete tag is
//! returned as text so the builder can render it literally.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercased tag name.
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    /// Lowercased attribute names with entity-decoded values, in source order.
    pub attributes: Vec<(String, String)>,
    /// Byte offset of the `<` in the input.
    pub offset: usize,
}

impl Tag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Tag(Tag),
    Text(Cow<'a, str>),
    /// A `<` that opened a tag but never closed; carries the literal text.
    Malformed { text: Cow<'a, str>, offset: usize },
}

/// Read the token starting at byte `pos`.
///
/// Returns the token and the position just past it, or `None` at end of
/// input. Comments and declarations are skipped.
pub fn next_token(input: &str, mut pos: usize) -> Option<(Token<'_>, usize)> {
    let bytes = input.as_bytes();
    loop {
        if pos >= bytes.len() {
            return None;
        }

        if bytes[pos] != b'<' {
            let end = find_from(bytes, pos, b'<');
            return Some((Token::Text(decode_entities(&input[pos..end])), end));
        }

        let rest = &input[pos..];
        if rest.starts_with("<!--") {
            if let Some(close) = rest[4..].find("-->") {
                pos += 4 + close + 3;
                continue;
            }
            return Some(malformed(input, pos));
        }

        let next = bytes.get(pos + 1).copied();
        let starts_tag = match next {
            Some(b'/') => bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic),
            Some(b'!') | Some(b'?') => {
                // <!DOCTYPE ...> and <?xml ...?>
                match find_tag_end(bytes, pos + 1) {
                    Some(gt) => {
                        pos = gt + 1;
                        continue;
                    }
                    None => return Some(malformed(input, pos)),
                }
            }
            Some(b) => b.is_ascii_alphabetic(),
            None => false,
        };

        if !starts_tag {
            // A bare `<` such as in "a < b" is ordinary text.
            let end = find_from(bytes, pos + 1, b'<');
            return Some((Token::Text(decode_entities(&input[pos..end])), end));
        }

        return match find_tag_end(bytes, pos + 1) {
            Some(gt) => Some((Token::Tag(parse_tag(&input[pos + 1..gt], pos)), gt + 1)),
            None => Some(malformed(input, pos)),
        };
    }
}

fn malformed(input: &str, pos: usize) -> (Token<'_>, usize) {
    let end = find_from(input.as_bytes(), pos + 1, b'<');
    (
        Token::Malformed {
            text: decode_entities(&input[pos..end]),
            offset: pos,
        },
        end,
    )
}

fn find_from(bytes: &[u8], start: usize, needle: u8) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map_or(bytes.len(), |i| start + i)
}

/// Position of the `>` closing a tag, skipping quoted attribute values.
fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn parse_tag(inner: &str, offset: usize) -> Tag {
    static ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    let attr_regex = ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
    });

    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let trimmed = inner.trim_end();
    let (self_closing, inner) = match trimmed.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let name_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_lowercase();

    let attributes = attr_regex
        .captures_iter(&inner[name_len..])
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((key, decode_entities(value).into_owned()))
        })
        .collect();

    Tag {
        name,
        closing,
        self_closing,
        attributes,
        offset,
    }
}

/// Decode HTML character references. Unknown or malformed references are
/// kept literally.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .get(1..)
            .and_then(|after| after.find(';').filter(|&semi| semi <= 10).map(|semi| &after[..semi]))
            .and_then(|name| decode_reference(name).map(|c| (c, name.len() + 2)));
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).filter(|&c| c != '\0');
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => None,
    }
}

/// Iterator over the tokens of a markup string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (token, next) = next_token(self.input, self.pos)?;
        self.pos = next;
        Some(token)
    }
}
