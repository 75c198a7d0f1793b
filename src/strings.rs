//! Escape decoding for string and bytes literal bodies.
//!
//! Operates on the interior slice the tokenizer captured (quotes already
//! stripped). Raw literals skip decoding entirely. Unknown escapes pass
//! through verbatim, backslash included, matching the language runtime.

use crate::error::{ParseResult, SyntaxError};
use crate::token::Span;

/// Decodes a text literal body into its constant value.
pub fn decode_str(body: &str, raw: bool, span: Span) -> ParseResult<String> {
    if raw {
        return Ok(body.to_string());
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => {
                // A trailing backslash would have escaped the closing
                // quote; the tokenizer never produces this.
                out.push('\\');
            }
            Some('\n') => {}
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0b'),
            Some(c @ '0'..='7') => {
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match char::from_u32(value) {
                    Some(c) => out.push(c),
                    None => return Err(SyntaxError::new("illegal Unicode character", span)),
                }
            }
            Some('x') => {
                let value = hex_escape(&mut chars, 2, "\\xXX", span)?;
                match char::from_u32(value) {
                    Some(c) => out.push(c),
                    None => return Err(SyntaxError::new("illegal Unicode character", span)),
                }
            }
            Some('u') => {
                let value = hex_escape(&mut chars, 4, "\\uXXXX", span)?;
                match char::from_u32(value) {
                    Some(c) => out.push(c),
                    None => return Err(SyntaxError::new("illegal Unicode character", span)),
                }
            }
            Some('U') => {
                let value = hex_escape(&mut chars, 8, "\\UXXXXXXXX", span)?;
                match char::from_u32(value) {
                    Some(c) => out.push(c),
                    None => return Err(SyntaxError::new("illegal Unicode character", span)),
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

/// Decodes a bytes literal body. Only ASCII source characters are legal;
/// `\u`/`\U` escapes are not recognized and pass through verbatim.
pub fn decode_bytes(body: &str, raw: bool, span: Span) -> ParseResult<Vec<u8>> {
    if body.chars().any(|c| !c.is_ascii()) {
        return Err(SyntaxError::new(
            "bytes can only contain ASCII literal characters",
            span,
        ));
    }
    if raw {
        return Ok(body.as_bytes().to_vec());
    }
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c as u8);
            continue;
        }
        match chars.next() {
            None => out.push(b'\\'),
            Some('\n') => {}
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\\') => out.push(b'\\'),
            Some('\'') => out.push(b'\''),
            Some('"') => out.push(b'"'),
            Some('a') => out.push(0x07),
            Some('b') => out.push(0x08),
            Some('f') => out.push(0x0c),
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('v') => out.push(0x0b),
            Some(c @ '0'..='7') => {
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                if value > 0xff {
                    return Err(SyntaxError::new(
                        "octal escape value out of range for bytes literal",
                        span,
                    ));
                }
                out.push(value as u8);
            }
            Some('x') => {
                let value = hex_escape(&mut chars, 2, "\\xXX", span)?;
                out.push(value as u8);
            }
            Some(other) => {
                out.push(b'\\');
                out.push(other as u8);
            }
        }
    }
    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    shape: &str,
    span: Span,
) -> ParseResult<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .peek()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| SyntaxError::new(format!("truncated {shape} escape"), span))?;
        value = value * 16 + digit;
        chars.next();
    }
    Ok(value)
}
