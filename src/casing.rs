//! Key case conversion between GitLab's snake_case wire format and
//! camelCase payloads.

use serde_json::{Map, Value};

/// Recursively rewrites object keys from camelCase to snake_case.
pub fn decamelize_keys(value: Value) -> Value {
    transform_keys(value, &decamelize)
}

/// Recursively rewrites object keys from snake_case to camelCase.
pub fn camelize_keys(value: Value) -> Value {
    transform_keys(value, &camelize)
}

fn transform_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (convert(&k), transform_keys(v, convert)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| transform_keys(v, convert))
                .collect(),
        ),
        other => other,
    }
}

pub fn decamelize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn camelize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            upper_next = true;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
            upper_next = false;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decamelize_single_key() {
        assert_eq!(decamelize("perPage"), "per_page");
        assert_eq!(decamelize("already_snake"), "already_snake");
        assert_eq!(decamelize("Name"), "name");
    }

    #[test]
    fn test_camelize_single_key() {
        assert_eq!(camelize("merge_request_iid"), "mergeRequestIid");
        assert_eq!(camelize("web-url"), "webUrl");
        assert_eq!(camelize("id"), "id");
    }

    #[test]
    fn test_camelize_leading_separator_stays_lowercase() {
        assert_eq!(camelize("_links"), "links");
        assert_eq!(camelize("Web_url"), "webUrl");
        assert_eq!(decamelize(&camelize("_links")), "links");
    }

    #[test]
    fn test_decamelize_nested_payload() {
        let body = json!({
            "sourceBranch": "feature",
            "assigneeIds": [1, 2],
            "mergeOptions": { "squashCommit": true },
            "labels": [{ "labelName": "bug" }]
        });

        let converted = decamelize_keys(body);

        assert_eq!(
            converted,
            json!({
                "source_branch": "feature",
                "assignee_ids": [1, 2],
                "merge_options": { "squash_commit": true },
                "labels": [{ "label_name": "bug" }]
            })
        );
    }

    #[test]
    fn test_camelize_leaves_values_untouched() {
        let body = json!({ "web_url": "https://gitlab.com/group_name/project_name" });

        let converted = camelize_keys(body);

        assert_eq!(
            converted,
            json!({ "webUrl": "https://gitlab.com/group_name/project_name" })
        );
    }
}
