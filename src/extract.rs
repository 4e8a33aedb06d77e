//! Best-effort image URL lookup in provider responses of unknown shape.

use serde_json::{Map, Value};

const DIRECT_FIELDS: [&str; 3] = ["image_url", "imageUrl", "url"];
const COLLECTION_FIELDS: [&str; 5] = ["images", "output", "data", "results", "assets"];
const IMAGE_FIELD: &str = "image";

/// Nesting levels searched before giving up.
pub const MAX_DEPTH: usize = 32;

/// Shape of a JSON value as far as the search cares.
enum Node<'a> {
    Text(&'a str),
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    Other,
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Node::Text(s),
            Value::Array(items) => Node::Sequence(items),
            Value::Object(map) => Node::Mapping(map),
            _ => Node::Other,
        }
    }
}

/// Returns the first plausible image URL in `payload`.
///
/// Direct string fields win, then the known collection fields in order,
/// then a nested `image` object. Only when none of those match are the
/// remaining object-valued fields searched, in key order, so an otherwise
/// unrecognised wrapper such as `{"meta": {"url": ..}}` still resolves.
/// Empty strings never count as a URL.
pub fn extract_image_url(payload: &Value) -> Option<String> {
    match Node::from(payload) {
        Node::Mapping(map) => search(map, 0).map(str::to_string),
        _ => None,
    }
}

fn search(map: &Map<String, Value>, depth: usize) -> Option<&str> {
    if depth >= MAX_DEPTH {
        return None;
    }

    for field in DIRECT_FIELDS {
        if let Some(Node::Text(url)) = map.get(field).map(Node::from) {
            if !url.is_empty() {
                return Some(url);
            }
        }
    }

    for field in COLLECTION_FIELDS {
        let Some(value) = map.get(field) else {
            continue;
        };

        match Node::from(value) {
            Node::Sequence(items) => {
                for item in items {
                    match Node::from(item) {
                        Node::Text(url) if !url.is_empty() => return Some(url),
                        Node::Mapping(nested) => {
                            if let Some(url) = search(nested, depth + 1) {
                                return Some(url);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Node::Mapping(nested) => {
                if let Some(url) = search(nested, depth + 1) {
                    return Some(url);
                }
            }
            _ => {}
        }
    }

    if let Some(Node::Mapping(nested)) = map.get(IMAGE_FIELD).map(Node::from) {
        if let Some(url) = search(nested, depth + 1) {
            return Some(url);
        }
    }

    map.iter()
        .filter(|(key, _)| !is_known_field(key))
        .find_map(|(_, value)| match Node::from(value) {
            Node::Mapping(nested) => search(nested, depth + 1),
            _ => None,
        })
}

fn is_known_field(key: &str) -> bool {
    key == IMAGE_FIELD
        || DIRECT_FIELDS.iter().any(|f| *f == key)
        || COLLECTION_FIELDS.iter().any(|f| *f == key)
}
