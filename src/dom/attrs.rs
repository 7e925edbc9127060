//! Start tag lexer.
//!
//! `tl` does not keep attribute order or quote style, so elements keep their
//! verbatim start tag and attributes are read from it directly.

/// Quote style of an attribute value as written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Unquoted,
}

/// A single attribute
///
/// `value` is `None` for boolean-style attributes (`<img inline>`).
/// Values are kept as written: entities are not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
    pub quote: Quote,
}

impl Attr {
    /// Double-quoted attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            quote: Quote::Double,
        }
    }

    /// Attribute without a value.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            quote: Quote::Double,
        }
    }

    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub(super) fn write_to(&self, out: &mut String) {
        out.push_str(&self.name);
        let Some(value) = &self.value else {
            return;
        };
        out.push('=');
        match self.quote {
            Quote::Double => {
                out.push('"');
                out.push_str(value);
                out.push('"');
            }
            Quote::Single => {
                out.push('\'');
                out.push_str(value);
                out.push('\'');
            }
            Quote::Unquoted => out.push_str(value),
        }
    }
}

/// Result of lexing a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Tag name as written.
    pub name: String,
    /// Attributes in source order, first occurrence of a name wins.
    pub attrs: Vec<Attr>,
    /// Closing sequence: `>`, `/>` or ` />`.
    pub close: &'static str,
    /// Byte length of the start tag in the input.
    pub len: usize,
}

impl StartTag {
    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.close != ">"
    }
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Lex the start tag at the beginning of `src`
///
/// Returns `None` when `src` does not start with a complete start tag
/// (missing `<`, empty name, unterminated quote or missing `>`).
pub fn scan_start_tag(src: &str) -> Option<StartTag> {
    let bytes = src.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    let mut i = 1;
    while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }
    if i == 1 {
        return None;
    }
    let name = src[1..i].to_string();
    let mut attrs: Vec<Attr> = Vec::new();

    loop {
        let before_space = i;
        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }
        match *bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    close: ">",
                    len: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                let close = if i > before_space { " />" } else { "/>" };
                return Some(StartTag {
                    name,
                    attrs,
                    close,
                    len: i + 2,
                });
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        // Attribute name; a leading `=` is part of the name
        let name_start = i;
        i += 1;
        while i < bytes.len()
            && !is_space(bytes[i])
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let attr_name = &src[name_start..i];

        let mut after_name = i;
        while after_name < bytes.len() && is_space(bytes[after_name]) {
            after_name += 1;
        }

        let (value, quote) = if bytes.get(after_name) == Some(&b'=') {
            i = after_name + 1;
            while i < bytes.len() && is_space(bytes[i]) {
                i += 1;
            }
            match *bytes.get(i)? {
                q @ (b'"' | b'\'') => {
                    let value_start = i + 1;
                    let len = bytes[value_start..].iter().position(|&b| b == q)?;
                    i = value_start + len + 1;
                    let quote = if q == b'"' { Quote::Double } else { Quote::Single };
                    (Some(src[value_start..value_start + len].to_string()), quote)
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !is_space(bytes[i]) && bytes[i] != b'>' {
                        i += 1;
                    }
                    (Some(src[value_start..i].to_string()), Quote::Unquoted)
                }
            }
        } else {
            (None, Quote::Double)
        };

        if !attrs.iter().any(|a| a.is_named(attr_name)) {
            attrs.push(Attr {
                name: attr_name.to_string(),
                value,
                quote,
            });
        }
    }
}
