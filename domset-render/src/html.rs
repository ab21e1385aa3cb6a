use std::fmt::Write;

use crate::{NodeKind, NodeRef};

// Reference: https://developer.mozilla.org/en-US/docs/Glossary/Void_element
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is taken verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Parses a markup fragment into detached nodes owned by `document`.
pub(crate) fn parse(markup: &str, document: &NodeRef) -> Vec<NodeRef> {
    let mut parser = Parser {
        src: markup,
        pos: 0,
        document,
        top: Vec::new(),
        open: Vec::new(),
    };
    parser.run();
    parser.top
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    document: &'a NodeRef,
    top: Vec<NodeRef>,
    open: Vec<NodeRef>,
}

impl Parser<'_> {
    fn run(&mut self) {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                self.comment();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past('>');
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.start_tag();
            } else {
                self.text();
            }
        }
    }

    fn append(&mut self, node: NodeRef) {
        match self.open.last() {
            Some(parent) => parent.push_child(&node),
            None => self.top.push(node),
        }
    }

    fn skip_past(&mut self, c: char) {
        match self.src[self.pos..].find(c) {
            Some(idx) => self.pos += idx + c.len_utf8(),
            None => self.pos = self.src.len(),
        }
    }

    fn comment(&mut self) {
        let body_start = self.pos + "<!--".len();
        let (body, next) = match self.src[body_start..].find("-->") {
            Some(idx) => (&self.src[body_start..body_start + idx], body_start + idx + 3),
            None => (&self.src[body_start..], self.src.len()),
        };
        self.pos = next;
        let node = NodeRef::comment(body.to_string(), self.document);
        self.append(node);
    }

    fn text(&mut self) {
        let rest = &self.src[self.pos..];
        let first = rest.chars().next().map_or(0, char::len_utf8);
        // a lone '<' that opens nothing is ordinary text
        let end = rest[first..]
            .match_indices('<')
            .map(|(idx, _)| idx + first)
            .find(|&idx| {
                rest[idx + 1..].starts_with(|c: char| c.is_ascii_alphabetic() || "/!?".contains(c))
            })
            .unwrap_or(rest.len());

        let raw = &rest[..end];
        self.pos += end;
        let node = NodeRef::text(decode_entities(raw), self.document);
        self.append(node);
    }

    fn name(&mut self) -> String {
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| c.is_ascii_whitespace() || matches!(c, '/' | '>'))
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn end_tag(&mut self) {
        self.pos += "</".len();
        let name = self.name();
        self.skip_past('>');

        // unmatched end tags are dropped
        if let Some(idx) = self.open.iter().rposition(|node| node.is_named(&name)) {
            self.open.truncate(idx);
        }
    }

    fn start_tag(&mut self) {
        self.pos += "<".len();
        let name = self.name();
        let element = NodeRef::element(&name, self.document);

        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            let rest = &self.src[self.pos..];
            if rest.is_empty() {
                break;
            } else if rest.starts_with('>') {
                self.pos += 1;
                break;
            } else if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            } else if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let (key, value) = self.attribute();
            if let Some(mut attrs) = element.attrs_mut() {
                // first occurrence wins
                attrs.entry(key).or_insert(value);
            }
        }

        self.append(element.clone());

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text(&element, &name);
        } else if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            self.open.push(element);
        }
    }

    fn attribute(&mut self) -> (String, String) {
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(rest.len())
            .max(1);
        let key = rest[..len].to_ascii_lowercase();
        self.pos += len;

        self.skip_whitespace();
        if !self.src[self.pos..].starts_with('=') {
            return (key, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = &self.src[self.pos..];
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                let len = body.find(quote).unwrap_or(body.len());
                self.pos += 1 + len + usize::from(len < body.len());
                &body[..len]
            }
            _ => {
                let len = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += len;
                &rest[..len]
            }
        };

        (key, decode_entities(value))
    }

    fn raw_text(&mut self, element: &NodeRef, name: &str) {
        let rest = &self.src[self.pos..];
        let close = format!("</{name}");
        let end = rest
            .to_ascii_lowercase()
            .find(&close)
            .unwrap_or(rest.len());

        let raw = &rest[..end];
        if !raw.is_empty() {
            let content = if matches!(name, "textarea" | "title") {
                decode_entities(raw)
            } else {
                raw.to_string()
            };
            element.push_child(&NodeRef::text(content, self.document));
        }

        self.pos += end;
        if self.pos < self.src.len() {
            self.skip_past('>');
        }
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let decoded = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn serialize(out: &mut String, node: &NodeRef) {
    let inner = node.0.borrow();
    match &inner.kind {
        NodeKind::Element {
            name,
            attrs,
            children,
            ..
        } => {
            let _ = write!(out, "<{name}");
            for (key, value) in attrs {
                let _ = write!(out, " {key}=\"{}\"", escape_attr(value));
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name.as_str()) {
                return;
            }

            let raw = matches!(name.as_str(), "script" | "style");
            for child in children {
                match &child.0.borrow().kind {
                    NodeKind::Text(text) if raw => out.push_str(text),
                    _ => serialize(out, child),
                }
            }
            let _ = write!(out, "</{name}>");
        }
        NodeKind::Document { children, .. } => {
            for child in children {
                serialize(out, child);
            }
        }
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
    }
}

// See https://html.spec.whatwg.org/multipage/parsing.html#escapingString
fn escape_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
    output
}

fn escape_attr(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
    output
}
