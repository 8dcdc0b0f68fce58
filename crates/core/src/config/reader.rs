use crate::config::schema;
use crate::config::section::ConfigNode;
use crate::errors::BuildError;

/// Transient description of a single context declaration.
///
/// Built fresh from a configuration section on every load call and never
/// persisted. Child declarations stay as raw configuration nodes: a
/// malformed child must fail in its own build step, after earlier siblings
/// and the parent have already been registered.
#[derive(Debug, Clone)]
pub struct ContextSpec<C: ConfigNode> {
    /// Context name, unique within the registry.
    pub name: String,
    /// Declared implementation type, if any.
    pub type_name: Option<String>,
    /// Whether object names inside this context are case sensitive.
    pub case_sensitive: bool,
    /// Ordered resource URIs, blank entries already skipped.
    pub resources: Vec<String>,
    /// Raw child context declarations, in declared order.
    pub children: Vec<C>,
}

/// Extracts [`ContextSpec`] values out of configuration sections.
#[derive(Debug, Clone)]
pub struct SectionReader {
    default_case_sensitive: bool,
}

impl SectionReader {
    /// Create a reader with the given case-sensitivity default.
    pub fn new(default_case_sensitive: bool) -> Self {
        Self {
            default_case_sensitive,
        }
    }

    /// Locate the target section for a build step.
    ///
    /// `section_name` of `None` means `node` is already the target section
    /// (the form used when recursing into child declarations). A missing or
    /// empty section is a configuration error, never "no context".
    pub fn locate<C: ConfigNode>(node: &C, section_name: Option<&str>) -> Result<C, BuildError> {
        let section = match section_name {
            None => node.clone(),
            Some(tag) if tag.trim().is_empty() => {
                return Err(BuildError::configuration(
                    "context configuration section name must not be empty",
                ));
            }
            Some(tag) => node.child_section(tag).ok_or_else(|| {
                BuildError::configuration(format!(
                    "context configuration section '{}' is missing",
                    tag
                ))
            })?,
        };

        if !section.exists() {
            return Err(BuildError::configuration(
                "context configuration section is missing or empty",
            ));
        }
        Ok(section)
    }

    /// Read one context declaration out of its section.
    pub fn read<C: ConfigNode>(&self, section: &C) -> Result<ContextSpec<C>, BuildError> {
        let name = section
            .get_string(schema::NAME_ATTRIBUTE)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| schema::DEFAULT_ROOT_CONTEXT_NAME.to_string());

        let type_name = section
            .get_string(schema::TYPE_ATTRIBUTE)
            .filter(|t| !t.trim().is_empty());

        let case_sensitive = match section.get_string(schema::CASE_SENSITIVE_ATTRIBUTE) {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim().to_ascii_lowercase().parse::<bool>().map_err(|_| {
                    BuildError::configuration(format!(
                        "invalid '{}' value '{}' for context '{}'",
                        schema::CASE_SENSITIVE_ATTRIBUTE,
                        raw,
                        name
                    ))
                })?
            }
            _ => self.default_case_sensitive,
        };

        Ok(ContextSpec {
            name,
            type_name,
            case_sensitive,
            resources: Self::read_resources(section),
            children: Self::read_children(section),
        })
    }

    /// Ordered resource URIs declared under the `resource` element.
    fn read_resources<C: ConfigNode>(section: &C) -> Vec<String> {
        match section.child_section(schema::RESOURCE_ELEMENT) {
            Some(list) if list.exists() => list
                .child_nodes()
                .iter()
                .filter_map(|node| node.get_string(schema::URI_ATTRIBUTE))
                .filter(|uri| !uri.trim().is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Ordered child declarations under the `context` element.
    fn read_children<C: ConfigNode>(section: &C) -> Vec<C> {
        match section.child_section(schema::CONTEXT_ELEMENT) {
            Some(list) if list.exists() => list.child_nodes(),
            _ => Vec::new(),
        }
    }
}

impl Default for SectionReader {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_full_declaration() {
        let section = json!({
            "name": "web",
            "type": "arbor.GenericContext",
            "caseSensitive": "false",
            "resource": [
                { "uri": "a.xml" },
                { "uri": "b.xml" }
            ],
            "context": [
                { "name": "child-a" },
                { "name": "child-b" }
            ]
        });

        let spec = SectionReader::default().read(&section).unwrap();
        assert_eq!(spec.name, "web");
        assert_eq!(spec.type_name.as_deref(), Some("arbor.GenericContext"));
        assert!(!spec.case_sensitive);
        assert_eq!(spec.resources, vec!["a.xml", "b.xml"]);
        assert_eq!(spec.children.len(), 2);
    }

    #[test]
    fn test_read_defaults() {
        let spec = SectionReader::default().read(&json!({ "resource": [] })).unwrap();
        assert_eq!(spec.name, schema::DEFAULT_ROOT_CONTEXT_NAME);
        assert_eq!(spec.type_name, None);
        assert!(spec.case_sensitive);
        assert!(spec.resources.is_empty());
        assert!(spec.children.is_empty());
    }

    #[test]
    fn test_reader_default_case_sensitivity_is_overridable() {
        let spec = SectionReader::new(false).read(&json!({ "name": "web" })).unwrap();
        assert!(!spec.case_sensitive);

        let spec = SectionReader::new(false)
            .read(&json!({ "name": "web", "caseSensitive": true }))
            .unwrap();
        assert!(spec.case_sensitive);
    }

    #[test]
    fn test_invalid_case_sensitivity_is_a_configuration_error() {
        let err = SectionReader::default()
            .read(&json!({ "name": "web", "caseSensitive": "maybe" }))
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("caseSensitive"));
    }

    #[test]
    fn test_blank_resource_uris_are_skipped() {
        let section = json!({
            "resource": [
                { "uri": "a.xml" },
                { "uri": "" },
                { "note": "no uri here" },
                { "uri": "b.xml" }
            ]
        });

        let spec = SectionReader::default().read(&section).unwrap();
        assert_eq!(spec.resources, vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn test_locate_named_section() {
        let config = json!({ "arborContext": { "name": "web" } });

        let section = SectionReader::locate(&config, Some("arborContext")).unwrap();
        assert_eq!(section.get_string("name").as_deref(), Some("web"));

        // sentinel form: the node itself is the section
        let section = SectionReader::locate(&config, None).unwrap();
        assert!(section.child_section("arborContext").is_some());
    }

    #[test]
    fn test_locate_failures() {
        let config = json!({ "arborContext": {} });

        assert!(SectionReader::locate(&config, Some("missing"))
            .unwrap_err()
            .is_configuration());
        assert!(SectionReader::locate(&config, Some("arborContext"))
            .unwrap_err()
            .is_configuration());
        assert!(SectionReader::locate(&config, Some("  "))
            .unwrap_err()
            .is_configuration());
    }
}
