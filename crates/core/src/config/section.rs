use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

/// A node in an already-structured configuration tree.
///
/// The bootstrapper never parses raw configuration syntax itself; a host
/// hands it a materialized tree and it walks that tree through this
/// interface. Implementations exist for JSON and YAML values; any other
/// configuration system can participate by implementing these four
/// operations.
pub trait ConfigNode: Clone + Send + Sync {
    /// Get the named child section, if present.
    fn child_section(&self, name: &str) -> Option<Self>;

    /// Whether this node carries a value or any children.
    fn exists(&self) -> bool;

    /// Get a string value by key. Scalar values (booleans, numbers) are
    /// stringified, matching how typed configuration systems surface them.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Ordered child nodes of this section.
    fn child_nodes(&self) -> Vec<Self>;
}

impl ConfigNode for JsonValue {
    fn child_section(&self, name: &str) -> Option<Self> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }

    fn exists(&self) -> bool {
        match self {
            JsonValue::Null => false,
            JsonValue::Object(map) => !map.is_empty(),
            JsonValue::Array(items) => !items.is_empty(),
            _ => true,
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.as_object()?.get(key)? {
            JsonValue::String(value) => Some(value.clone()),
            JsonValue::Bool(value) => Some(value.to_string()),
            JsonValue::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn child_nodes(&self) -> Vec<Self> {
        match self {
            JsonValue::Array(items) => items.clone(),
            JsonValue::Object(map) => map.values().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

impl ConfigNode for YamlValue {
    fn child_section(&self, name: &str) -> Option<Self> {
        self.as_mapping()
            .and_then(|map| map.get(&YamlValue::from(name)))
            .cloned()
    }

    fn exists(&self) -> bool {
        match self {
            YamlValue::Null => false,
            YamlValue::Mapping(map) => !map.is_empty(),
            YamlValue::Sequence(items) => !items.is_empty(),
            _ => true,
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.as_mapping()?.get(&YamlValue::from(key))? {
            YamlValue::String(value) => Some(value.clone()),
            YamlValue::Bool(value) => Some(value.to_string()),
            YamlValue::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn child_nodes(&self) -> Vec<Self> {
        match self {
            YamlValue::Sequence(items) => items.clone(),
            YamlValue::Mapping(map) => map.values().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
