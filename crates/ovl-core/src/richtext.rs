//! Structured rich text: a run of spans with inline bold/italic/underline.
//!
//! The wire form is a small markup dialect (`<b>`, `<i>`, `<u>`, `<br>` and
//! a handful of entities), parsed with `winnow`. Parsing is lenient: unknown
//! tags are dropped with their text kept, and a stray `<` or `&` is literal.
//! Ranges are measured in `char`s of the plain text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use winnow::combinator::delimited;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// An inline formatting toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SpanAttrs {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl SpanAttrs {
    fn get(&self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.bold,
            InlineStyle::Italic => self.italic,
            InlineStyle::Underline => self.underline,
        }
    }

    fn set(&mut self, style: InlineStyle, on: bool) {
        match style {
            InlineStyle::Bold => self.bold = on,
            InlineStyle::Italic => self.italic = on,
            InlineStyle::Underline => self.underline = on,
        }
    }
}

/// A run of text sharing one set of attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub attrs: SpanAttrs,
}

impl Span {
    pub fn new(text: impl Into<String>, attrs: SpanAttrs) -> Self {
        Self {
            text: text.into(),
            attrs,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Half-open `[start, end)` character range into the plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Structured text content of an element. Always normalized: no empty spans,
/// no two adjacent spans with equal attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    spans: SmallVec<[Span; 2]>,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::from_spans([Span::new(text, SpanAttrs::default())])
    }

    pub fn from_spans(spans: impl IntoIterator<Item = Span>) -> Self {
        let mut out = Self::default();
        for span in spans {
            out.push(&span.text, span.attrs);
        }
        out
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.spans.iter().map(Span::char_len).sum()
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Append text, merging into the last span when attributes match.
    fn push(&mut self, text: &str, attrs: SpanAttrs) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.attrs == attrs => last.text.push_str(text),
            _ => self.spans.push(Span::new(text, attrs)),
        }
    }

    /// Whether every character in `range` carries `style`.
    pub fn has_style(&self, range: TextRange, style: InlineStyle) -> bool {
        let range = self.effective_range(range);
        if range.is_collapsed() {
            return false;
        }
        let mut offset = 0;
        for span in &self.spans {
            let len = span.char_len();
            let overlaps = offset < range.end && offset + len > range.start;
            if overlaps && !span.attrs.get(style) {
                return false;
            }
            offset += len;
        }
        true
    }

    /// Toggle `style` over `range`: cleared when the whole range already has
    /// it, set otherwise. A collapsed range targets the whole text.
    pub fn apply_style(&mut self, range: TextRange, style: InlineStyle) {
        let range = self.effective_range(range);
        if range.is_collapsed() {
            return;
        }
        let turn_on = !self.has_style(range, style);

        let mut rebuilt = RichText::default();
        let mut offset = 0;
        for span in &self.spans {
            let len = span.char_len();
            let (span_start, span_end) = (offset, offset + len);
            offset = span_end;

            let cut_a = range.start.clamp(span_start, span_end) - span_start;
            let cut_b = range.end.clamp(span_start, span_end) - span_start;
            let a = char_to_byte(&span.text, cut_a);
            let b = char_to_byte(&span.text, cut_b);

            let mut inside = span.attrs;
            inside.set(style, turn_on);
            rebuilt.push(&span.text[..a], span.attrs);
            rebuilt.push(&span.text[a..b], inside);
            rebuilt.push(&span.text[b..], span.attrs);
        }
        *self = rebuilt;
    }

    fn effective_range(&self, range: TextRange) -> TextRange {
        let len = self.char_len();
        let range = TextRange::new(range.start.min(len), range.end.min(len));
        if range.is_collapsed() {
            TextRange::new(0, len)
        } else {
            range
        }
    }

    // ─── Markup ──────────────────────────────────────────────────────────

    /// Parse the markup dialect. Never fails; see module docs.
    pub fn from_markup(input: &str) -> Self {
        let mut out = RichText::default();
        let mut depth = StyleDepth::default();
        let mut rest = input;

        while !rest.is_empty() {
            if rest.starts_with('<') {
                let checkpoint = rest;
                match parse_tag.parse_next(&mut rest) {
                    Ok(tag) => depth.apply_tag(tag, &mut out),
                    Err(_) => {
                        rest = &checkpoint[1..];
                        out.push("<", depth.attrs());
                    }
                }
            } else if rest.starts_with('&') {
                let checkpoint = rest;
                match parse_entity.parse_next(&mut rest) {
                    Ok(name) => match decode_entity(name) {
                        Some(ch) => out.push(ch.encode_utf8(&mut [0u8; 4]), depth.attrs()),
                        None => out.push(&checkpoint[..checkpoint.len() - rest.len()], depth.attrs()),
                    },
                    Err(_) => {
                        rest = &checkpoint[1..];
                        out.push("&", depth.attrs());
                    }
                }
            } else {
                let checkpoint = rest;
                match parse_text_run.parse_next(&mut rest) {
                    Ok(text) => out.push(text, depth.attrs()),
                    Err(_) => rest = &checkpoint[checkpoint.len()..],
                }
            }
        }
        out
    }

    /// Emit the markup dialect. Unstyled text comes out escaped but bare.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let a = span.attrs;
            if a.bold {
                out.push_str("<b>");
            }
            if a.italic {
                out.push_str("<i>");
            }
            if a.underline {
                out.push_str("<u>");
            }
            escape_into(&span.text, &mut out);
            if a.underline {
                out.push_str("</u>");
            }
            if a.italic {
                out.push_str("</i>");
            }
            if a.bold {
                out.push_str("</b>");
            }
        }
        out
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain_text())
    }
}

impl Serialize for RichText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_markup())
    }
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RichText::from_markup(&s))
    }
}

fn char_to_byte(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Open-tag nesting counters; closing a tag that was never opened is ignored.
#[derive(Debug, Default)]
struct StyleDepth {
    bold: u32,
    italic: u32,
    underline: u32,
}

impl StyleDepth {
    fn attrs(&self) -> SpanAttrs {
        SpanAttrs {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }

    fn apply_tag(&mut self, tag: &str, out: &mut RichText) {
        let tag = tag.trim();
        let (closing, body) = match tag.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, tag),
        };
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let counter = match name.as_str() {
            "b" | "strong" => &mut self.bold,
            "i" | "em" => &mut self.italic,
            "u" => &mut self.underline,
            "br" => {
                out.push("\n", self.attrs());
                return;
            }
            // Block tags from contenteditable start a new line.
            "div" | "p" if !closing && !out.is_empty() => {
                out.push("\n", self.attrs());
                return;
            }
            _ => return,
        };
        if closing {
            *counter = counter.saturating_sub(1);
        } else if !body.ends_with('/') {
            *counter += 1;
        }
    }
}

fn parse_tag<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited('<', take_till(0.., ('>', '<')), '>').parse_next(input)
}

fn parse_entity<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(
        '&',
        take_while(1..=10, |c: char| c.is_ascii_alphanumeric() || c == '#'),
        ';',
    )
    .parse_next(input)
}

fn parse_text_run<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_till(1.., ('<', '&')).parse_next(input)
}
