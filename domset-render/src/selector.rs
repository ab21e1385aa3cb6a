use domset_nodes::Node;

use crate::NodeRef;

/// A parsed, comma-separated selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<Vec<Part>>);

#[derive(Clone, Debug, PartialEq, Eq)]
struct Part {
    step: Step,
    // relation to the part on the left
    combinator: Option<Combinator>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    General,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Step {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo: Vec<Pseudo>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrCondition {
    Exists(String),
    Eq(String, String),
    Includes(String, String),
    DashMatch(String, String),
    StartsWith(String, String),
    EndsWith(String, String),
    Contains(String, String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Pseudo {
    Checked,
    Disabled,
    Enabled,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    Not(SelectorList),
}

impl SelectorList {
    pub(crate) fn parse(selector: &str) -> Option<Self> {
        split_top_level(selector, false, |c| c == ',')?
            .into_iter()
            .map(|group| parse_chain(&group))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub(crate) fn matches(&self, element: &NodeRef) -> bool {
        self.0.iter().any(|chain| matches_chain(element, chain))
    }
}

/// Splits `input` on top-level separators, ignoring those inside brackets,
/// parentheses or quotes. Returns `None` on unbalanced input, or on empty
/// pieces unless `skip_empty` is set.
fn split_top_level(
    input: &str,
    skip_empty: bool,
    separator: impl Fn(char) -> bool,
) -> Option<Vec<String>> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '[' | '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ']' | ')') => {
                depth = depth.checked_sub(1)?;
                current.push(c);
            }
            (None, c) if depth == 0 && separator(c) => {
                let piece = current.trim();
                if !piece.is_empty() {
                    pieces.push(piece.to_string());
                } else if !skip_empty {
                    return None;
                }
                current.clear();
            }
            (None, c) => current.push(c),
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    let piece = current.trim();
    if !piece.is_empty() {
        pieces.push(piece.to_string());
    } else if !skip_empty || pieces.is_empty() {
        return None;
    }
    Some(pieces)
}

fn parse_chain(group: &str) -> Option<Vec<Part>> {
    // surround combinators with spaces so whitespace splitting isolates them
    let mut spaced = String::with_capacity(group.len() + 8);
    let mut depth = 0usize;
    let mut quote = None;
    for c in group.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, '>' | '+' | '~') if depth == 0 => {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
                continue;
            }
            _ => {}
        }
        spaced.push(c);
    }

    let tokens = split_top_level(&spaced, true, |c| c.is_ascii_whitespace())?;

    let mut parts = Vec::new();
    let mut pending = None;
    for token in tokens {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::Adjacent),
            "~" => Some(Combinator::General),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return None;
            }
            pending = Some(combinator);
            continue;
        }

        let step = parse_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        None
    } else {
        Some(parts)
    }
}

fn ident_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_')))
        .unwrap_or(s.len())
}

fn parse_step(token: &str) -> Option<Step> {
    let mut step = Step::default();
    let mut rest = token;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else {
        let len = ident_len(rest);
        if len > 0 {
            step.tag = Some(rest[..len].to_ascii_lowercase());
            rest = &rest[len..];
        }
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '#' | '.' => {
                let body = &rest[1..];
                let len = ident_len(body);
                if len == 0 {
                    return None;
                }
                let name = body[..len].to_string();
                if c == '#' {
                    if step.id.replace(name).is_some() {
                        return None;
                    }
                } else {
                    step.classes.push(name);
                }
                rest = &body[len..];
            }
            '[' => {
                let close = find_close(rest, '[', ']')?;
                step.attrs.push(parse_attr(&rest[1..close])?);
                rest = &rest[close + 1..];
            }
            ':' => {
                let (pseudo, len) = parse_pseudo(&rest[1..])?;
                step.pseudo.push(pseudo);
                rest = &rest[1 + len..];
            }
            _ => return None,
        }
    }

    Some(step)
}

/// Index of the bracket closing the one that opens `s`.
fn find_close(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    for (idx, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c == open => depth += 1,
            (None, c) if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_attr(body: &str) -> Option<AttrCondition> {
    let body = body.trim();
    let Some(eq) = body.find('=') else {
        let key = body.to_ascii_lowercase();
        return (ident_len(&key) == key.len() && !key.is_empty())
            .then_some(AttrCondition::Exists(key));
    };

    let (key, op) = match body[..eq].chars().last() {
        Some(op @ ('~' | '|' | '^' | '$' | '*')) => (&body[..eq - 1], Some(op)),
        _ => (&body[..eq], None),
    };
    let key = key.trim().to_ascii_lowercase();
    if key.is_empty() || ident_len(&key) != key.len() {
        return None;
    }

    let raw = body[eq + 1..].trim();
    let value = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => raw.strip_prefix(q)?.strip_suffix(q)?.to_string(),
        Some(_) if ident_len(raw) == raw.len() => raw.to_string(),
        _ => return None,
    };

    Some(match op {
        None => AttrCondition::Eq(key, value),
        Some('~') => AttrCondition::Includes(key, value),
        Some('|') => AttrCondition::DashMatch(key, value),
        Some('^') => AttrCondition::StartsWith(key, value),
        Some('$') => AttrCondition::EndsWith(key, value),
        Some(_) => AttrCondition::Contains(key, value),
    })
}

fn parse_pseudo(rest: &str) -> Option<(Pseudo, usize)> {
    if let Some(inner) = rest.strip_prefix("not(") {
        let close = find_close(&rest[3..], '(', ')')? + 3;
        let list = SelectorList::parse(&inner[..close - 4])?;
        return Some((Pseudo::Not(list), close + 1));
    }

    let len = ident_len(rest);
    let pseudo = match &rest[..len] {
        "checked" => Pseudo::Checked,
        "disabled" => Pseudo::Disabled,
        "enabled" => Pseudo::Enabled,
        "empty" => Pseudo::Empty,
        "first-child" => Pseudo::FirstChild,
        "last-child" => Pseudo::LastChild,
        "only-child" => Pseudo::OnlyChild,
        _ => return None,
    };
    Some((pseudo, len))
}

fn matches_chain(element: &NodeRef, parts: &[Part]) -> bool {
    let Some((last, rest)) = parts.split_last() else {
        return true;
    };
    if !last.step.matches(element) {
        return false;
    }

    match last.combinator {
        None => rest.is_empty(),
        Some(Combinator::Child) => element
            .parent_element()
            .is_some_and(|parent| matches_chain(&parent, rest)),
        Some(Combinator::Descendant) => {
            let mut cursor = element.parent_element();
            while let Some(ancestor) = cursor {
                if matches_chain(&ancestor, rest) {
                    return true;
                }
                cursor = ancestor.parent_element();
            }
            false
        }
        Some(Combinator::Adjacent) => {
            let (before, _) = element.element_siblings();
            before
                .last()
                .is_some_and(|sibling| matches_chain(sibling, rest))
        }
        Some(Combinator::General) => {
            let (before, _) = element.element_siblings();
            before.iter().any(|sibling| matches_chain(sibling, rest))
        }
    }
}

impl Step {
    fn matches(&self, element: &NodeRef) -> bool {
        if !element.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !element.is_named(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = element.attr("class").unwrap_or_default();
            let tokens = class.split_ascii_whitespace();
            if !self
                .classes
                .iter()
                .all(|name| tokens.clone().any(|token| token == name))
            {
                return false;
            }
        }

        self.attrs.iter().all(|condition| condition.matches(element))
            && self.pseudo.iter().all(|pseudo| pseudo.matches(element))
    }
}

impl AttrCondition {
    fn matches(&self, element: &NodeRef) -> bool {
        let (key, expected) = match self {
            Self::Exists(key) => return element.has_attr(key),
            Self::Eq(key, value)
            | Self::Includes(key, value)
            | Self::DashMatch(key, value)
            | Self::StartsWith(key, value)
            | Self::EndsWith(key, value)
            | Self::Contains(key, value) => (key, value.as_str()),
        };
        let Some(actual) = element.attr(key) else {
            return false;
        };

        match self {
            Self::Eq(..) => actual == expected,
            Self::Includes(..) => actual.split_ascii_whitespace().any(|t| t == expected),
            Self::DashMatch(..) => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            Self::StartsWith(..) => !expected.is_empty() && actual.starts_with(expected),
            Self::EndsWith(..) => !expected.is_empty() && actual.ends_with(expected),
            Self::Contains(..) => !expected.is_empty() && actual.contains(expected),
            Self::Exists(_) => true,
        }
    }
}

impl Pseudo {
    fn matches(&self, element: &NodeRef) -> bool {
        match self {
            Self::Checked => {
                if element.is_named("option") {
                    element.has_attr("selected")
                } else {
                    element.checked().unwrap_or(false)
                }
            }
            Self::Disabled => is_form_control(element) && element.has_attr("disabled"),
            Self::Enabled => is_form_control(element) && !element.has_attr("disabled"),
            Self::Empty => element.child_nodes().iter().all(|child| {
                child.node_type() == domset_nodes::NodeType::Comment
            }),
            Self::FirstChild => element.element_siblings().0.is_empty(),
            Self::LastChild => element.element_siblings().1.is_empty(),
            Self::OnlyChild => {
                let (before, after) = element.element_siblings();
                before.is_empty() && after.is_empty()
            }
            Self::Not(list) => !list.matches(element),
        }
    }
}

fn is_form_control(element: &NodeRef) -> bool {
    ["input", "button", "select", "textarea", "option", "fieldset"]
        .iter()
        .any(|name| element.is_named(name))
}

#[cfg(test)]
mod tests {
    use domset_nodes::Node;

    use super::SelectorList;
    use crate::NodeRef;

    const PAGE: &str = "<div id=\"main\" class=\"box wide\">\
        <ul><li class=\"a\" lang=\"en-US\">1</li><li class=\"b\">2</li><li>3</li></ul>\
        <p data-kind=\"note\">x</p><span></span>\
        <input type=\"checkbox\" checked><input type=\"text\" disabled>\
        </div>";

    fn select(selector: &str) -> Vec<String> {
        let document = NodeRef::parse_document(PAGE);
        document
            .query_selector_all(selector)
            .unwrap()
            .iter()
            .map(|node| node.outer_html())
            .collect()
    }

    fn count(selector: &str) -> usize {
        select(selector).len()
    }

    #[test]
    fn simple_steps() {
        assert_eq!(count("li"), 3);
        assert_eq!(count("#main"), 1);
        assert_eq!(count(".box.wide"), 1);
        assert_eq!(count("div.box.narrow"), 0);
        assert_eq!(count("*"), 9);
        assert_eq!(count("LI"), 3);
    }

    #[test]
    fn attribute_operators() {
        assert_eq!(count("[data-kind]"), 1);
        assert_eq!(count("[data-kind=note]"), 1);
        assert_eq!(count("[data-kind='note']"), 1);
        assert_eq!(count("[class~=wide]"), 1);
        assert_eq!(count("[lang|=en]"), 1);
        assert_eq!(count("[type^=check]"), 1);
        assert_eq!(count("[type$=box]"), 1);
        assert_eq!(count("[type*=ex]"), 1);
        assert_eq!(count("[type=\"radio\"]"), 0);
    }

    #[test]
    fn combinators() {
        assert_eq!(count("div li"), 3);
        assert_eq!(count("div > li"), 0);
        assert_eq!(count("ul>li"), 3);
        assert_eq!(count("li.a + li"), 1);
        assert_eq!(count("li.a ~ li"), 2);
        assert_eq!(count("ul ~ span"), 1);
        assert_eq!(count("#main ul li.b"), 1);
    }

    #[test]
    fn pseudo_classes() {
        assert_eq!(count(":checked"), 1);
        assert_eq!(count("input:disabled"), 1);
        assert_eq!(count("input:enabled"), 1);
        assert_eq!(count("span:empty"), 1);
        assert_eq!(count("li:first-child"), 1);
        assert_eq!(count("li:last-child"), 1);
        assert_eq!(count("li:not(.a, .b)"), 1);
        assert_eq!(count("ul:only-child"), 0);
    }

    #[test]
    fn groups_keep_document_order() {
        let found = select("p, ul");
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("<ul>"));
    }

    #[test]
    fn invalid_selectors() {
        for selector in ["", "  ", "a,", ",a", "div >", "> div", "[x", "a[", "#", "a:hover", "a b)"] {
            assert_eq!(SelectorList::parse(selector), None, "{selector:?}");
        }
    }
}
