use domset_nodes::{EventInit, Node};

use crate::{event, NodeRef};

/// Property state that has diverged from the element's attributes.
#[derive(Clone, Default, Debug)]
pub(crate) struct FormState {
    pub(crate) value: Option<String>,
    pub(crate) checked: Option<bool>,
}

fn input_type(node: &NodeRef) -> String {
    node.attr("type")
        .map(|ty| ty.to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string())
}

fn is_toggle(node: &NodeRef) -> bool {
    node.is_named("input") && matches!(input_type(node).as_str(), "checkbox" | "radio")
}

fn option_value(option: &NodeRef) -> String {
    option
        .attr("value")
        .unwrap_or_else(|| option.text_content().trim().to_string())
}

pub(crate) fn value(node: &NodeRef) -> Option<String> {
    let name = node.tag_name()?;
    let dirty = node.form().and_then(|form| form.value);

    match name.as_str() {
        "input" => Some(dirty.or_else(|| node.attr("value")).unwrap_or_else(|| {
            if is_toggle(node) {
                "on".to_string()
            } else {
                String::new()
            }
        })),
        "textarea" => Some(dirty.unwrap_or_else(|| node.text_content())),
        "select" => {
            if dirty.is_some() {
                return dirty;
            }
            let options = node.query_selector_all("option").unwrap_or_default();
            let selected = options
                .iter()
                .find(|option| option.has_attr("selected"))
                .or_else(|| options.first());
            Some(selected.map(option_value).unwrap_or_default())
        }
        "option" => Some(option_value(node)),
        "button" => Some(node.attr("value").unwrap_or_default()),
        _ => None,
    }
}

pub(crate) fn set_value(node: &NodeRef, value: &str) {
    let Some(name) = node.tag_name() else {
        return;
    };

    match name.as_str() {
        "input" | "textarea" | "select" => {
            if let Some(mut form) = node.form_mut() {
                form.value = Some(value.to_string());
            }
        }
        "option" | "button" => {
            // both reflect the property straight onto the attribute
            let _ = node.set_attr("value", value);
        }
        _ => {}
    }
}

pub(crate) fn checked(node: &NodeRef) -> Option<bool> {
    if !node.is_named("input") {
        return None;
    }
    let dirty = node.form().and_then(|form| form.checked);
    Some(dirty.unwrap_or_else(|| node.has_attr("checked")))
}

pub(crate) fn set_checked(node: &NodeRef, checked: bool) {
    if !node.is_named("input") {
        return;
    }
    if checked && input_type(node) == "radio" {
        for other in radio_group(node) {
            if let Some(mut form) = other.form_mut() {
                form.checked = Some(false);
            }
        }
    }
    if let Some(mut form) = node.form_mut() {
        form.checked = Some(checked);
    }
}

/// Other radio buttons sharing `node`'s name within the same tree.
fn radio_group(node: &NodeRef) -> Vec<NodeRef> {
    let Some(name) = node.attr("name").filter(|name| !name.is_empty()) else {
        return Vec::new();
    };
    node.root()
        .descendants()
        .into_iter()
        .filter(|other| {
            other != node
                && other.is_named("input")
                && input_type(other) == "radio"
                && other.attr("name").as_deref() == Some(name.as_str())
        })
        .collect()
}

/// Runs the activation behavior of `node` around a synthetic click.
pub(crate) fn click(node: &NodeRef) {
    if !node.is_element() {
        return;
    }
    let form_control = ["input", "button", "select", "textarea"]
        .iter()
        .any(|name| node.is_named(name));
    if form_control && node.has_attr("disabled") {
        return;
    }

    let snapshot: Vec<(NodeRef, bool)> = if is_toggle(node) {
        let mut group = radio_group(node);
        group.push(node.clone());
        group
            .into_iter()
            .map(|input| {
                let state = checked(&input).unwrap_or(false);
                (input, state)
            })
            .collect()
    } else {
        Vec::new()
    };

    if is_toggle(node) {
        let next = input_type(node) == "radio" || !checked(node).unwrap_or(false);
        set_checked(node, next);
    }

    let init = EventInit::new()
        .bubbles(true)
        .cancelable(true)
        .composed(true);
    let proceed = event::dispatch(node, "click", init);

    if !proceed {
        for (input, state) in snapshot {
            if let Some(mut form) = input.form_mut() {
                form.checked = Some(state);
            }
        }
    }
}
