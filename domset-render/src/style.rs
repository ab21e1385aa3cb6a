/// `backgroundColor` -> `background-color`.
pub(crate) fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Attribute name backing a `dataset` key.
pub(crate) fn dataset_attr(key: &str) -> String {
    format!("data-{}", kebab_case(key))
}

fn declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            None
        } else {
            Some((name, value.to_string()))
        }
    })
}

pub(crate) fn get(style: &str, property: &str) -> Option<String> {
    let property = property.trim().to_ascii_lowercase();
    declarations(style)
        .filter(|(name, _)| *name == property)
        .map(|(_, value)| value)
        .last()
}

/// Returns `style` with `property` replaced; an empty value removes it.
pub(crate) fn set(style: &str, property: &str, value: &str) -> String {
    let property = property.to_ascii_lowercase();
    let value = value.trim();

    let mut found = false;
    let mut list: Vec<(String, String)> = declarations(style)
        .filter_map(|(name, current)| {
            if name != property {
                Some((name, current))
            } else if found || value.is_empty() {
                None
            } else {
                found = true;
                Some((name, value.to_string()))
            }
        })
        .collect();

    if !found && !value.is_empty() {
        list.push((property, value.to_string()));
    }

    list.iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_splits_on_capitals() {
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("color"), "color");
        assert_eq!(dataset_attr("userId"), "data-user-id");
    }

    #[test]
    fn set_replaces_in_place() {
        let style = "color: red; width: 1px;";
        assert_eq!(set(style, "color", "blue"), "color: blue; width: 1px;");
        assert_eq!(set(style, "width", ""), "color: red;");
        assert_eq!(set("", "top", "0"), "top: 0;");
    }

    #[test]
    fn get_ignores_malformed_declarations() {
        let style = "color; width: 2px ; :x";
        assert_eq!(get(style, "width").as_deref(), Some("2px"));
        assert_eq!(get(style, "color"), None);
    }
}
