#![forbid(unsafe_code)]

//! Session options.
//!
//! | Option | Default | Meaning |
//! |--------|---------|---------|
//! | `attributes.bind` | `data-bind` | two-way path binding |
//! | `attributes.read` | `data-read` | state to element, path or comparison |
//! | `attributes.write` | `data-write` | element to state, path |
//! | `attributes.click` | `data-click` | assignment run on click |
//! | `attributes.active_if` | `data-active-if` | class toggle, path or comparison |
//! | `attributes.loop` | `data-loop` | repeat children, `var=arrayPath` |
//! | `toggle_class` | `active` | class toggled by `active_if` |
//! | `stop_events` | `true` | prevent default and stop propagation after handling |
//! | `immediate` | `false` | commit on `input` instead of `change` |
//! | `loop_indexing` | `index` | what the loop variable is replaced with |
//!
//! With the `config` feature, options load from TOML or JSON text. Missing
//! keys keep their defaults:
//!
//! ```toml
//! toggle_class = "enabled"
//! immediate = true
//! loop_indexing = "qualified"
//!
//! [attributes]
//! bind = "data-model"
//! ```

use std::fmt;

/// What a loop variable is rewritten to inside each instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum LoopIndexing {
    /// The bare index: `item.name` becomes `2.name`.
    #[default]
    Index,
    /// The array path and index: `item.name` becomes `items.2.name`.
    Qualified,
}

impl LoopIndexing {
    /// Replacement text for element `index` of the array at `path`.
    #[must_use]
    pub fn replacement(self, path: &str, index: usize) -> String {
        match self {
            Self::Index => index.to_string(),
            Self::Qualified => format!("{path}.{index}"),
        }
    }
}

/// Names of the declarative attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct AttributeNames {
    pub bind: String,
    pub read: String,
    pub write: String,
    pub click: String,
    pub active_if: String,
    #[cfg_attr(feature = "config", serde(rename = "loop"))]
    pub repeat: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            bind: "data-bind".into(),
            read: "data-read".into(),
            write: "data-write".into(),
            click: "data-click".into(),
            active_if: "data-active-if".into(),
            repeat: "data-loop".into(),
        }
    }
}

impl AttributeNames {
    /// Every declarative attribute name.
    #[must_use]
    pub fn all(&self) -> [&str; 6] {
        [
            self.bind.as_str(),
            self.read.as_str(),
            self.write.as_str(),
            self.click.as_str(),
            self.active_if.as_str(),
            self.repeat.as_str(),
        ]
    }

    /// Whether `name` is one of the declarative attributes.
    #[must_use]
    pub fn is_declarative(&self, name: &str) -> bool {
        self.all().contains(&name)
    }
}

/// Options for one binding session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BindingOptions {
    pub attributes: AttributeNames,
    pub toggle_class: String,
    pub stop_events: bool,
    pub immediate: bool,
    pub loop_indexing: LoopIndexing,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            attributes: AttributeNames::default(),
            toggle_class: "active".into(),
            stop_events: true,
            immediate: false,
            loop_indexing: LoopIndexing::default(),
        }
    }
}

impl BindingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attributes(mut self, attributes: AttributeNames) -> Self {
        self.attributes = attributes;
        self
    }

    /// Class toggled by the `active_if` attribute.
    #[must_use]
    pub fn toggle_class(mut self, class: impl Into<String>) -> Self {
        self.toggle_class = class.into();
        self
    }

    #[must_use]
    pub fn stop_events(mut self, stop: bool) -> Self {
        self.stop_events = stop;
        self
    }

    /// Commit form values on every `input` event instead of on `change`.
    #[must_use]
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    #[must_use]
    pub fn loop_indexing(mut self, indexing: LoopIndexing) -> Self {
        self.loop_indexing = indexing;
        self
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Options text failed to load.
#[derive(Debug)]
pub enum ConfigError {
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// A loaded option is present but unusable.
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "invalid TOML options: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "invalid JSON options: {e}"),
            Self::Invalid { key, reason } => write!(f, "invalid option {key}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl BindingOptions {
    /// Check values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = self.attributes.all();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || "[]=,\"'".contains(c)) {
                return Err(ConfigError::Invalid {
                    key: "attributes",
                    reason: format!("{name:?} is not a usable attribute name"),
                });
            }
            if names[..i].contains(name) {
                return Err(ConfigError::Invalid {
                    key: "attributes",
                    reason: format!("{name:?} is used for more than one role"),
                });
            }
        }
        if self.toggle_class.is_empty() || self.toggle_class.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "toggle_class",
                reason: format!("{:?} is not a single class name", self.toggle_class),
            });
        }
        Ok(())
    }

    /// Load options from TOML text.
    #[cfg(feature = "config")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(text).map_err(ConfigError::Toml)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from JSON text.
    #[cfg(feature = "config")]
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(text).map_err(ConfigError::Json)?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let options = BindingOptions::default();
        assert_eq!(options.attributes.bind, "data-bind");
        assert_eq!(options.attributes.repeat, "data-loop");
        assert_eq!(options.toggle_class, "active");
        assert!(options.stop_events);
        assert!(!options.immediate);
        assert_eq!(options.loop_indexing, LoopIndexing::Index);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let options = BindingOptions::new()
            .toggle_class("enabled")
            .immediate(true)
            .stop_events(false)
            .loop_indexing(LoopIndexing::Qualified);
        assert_eq!(options.toggle_class, "enabled");
        assert!(options.immediate);
        assert!(!options.stop_events);
    }

    #[test]
    fn declarative_names() {
        let names = AttributeNames::default();
        assert!(names.is_declarative("data-active-if"));
        assert!(names.is_declarative("data-loop"));
        assert!(!names.is_declarative("class"));
    }

    #[test]
    fn replacement_text() {
        assert_eq!(LoopIndexing::Index.replacement("items", 2), "2");
        assert_eq!(LoopIndexing::Qualified.replacement("items", 2), "items.2");
    }

    #[test]
    fn validate_rejects_duplicates_and_bad_names() {
        let mut options = BindingOptions::default();
        options.attributes.read = "data-bind".into();
        assert!(matches!(
            options.validate(),
            Err(ConfigError::Invalid { key: "attributes", .. })
        ));

        let options = BindingOptions::default().toggle_class("two words");
        assert!(matches!(
            options.validate(),
            Err(ConfigError::Invalid { key: "toggle_class", .. })
        ));
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_toml_with_defaults() {
        let options = BindingOptions::from_toml_str(
            r#"
            toggle_class = "enabled"
            immediate = true
            loop_indexing = "qualified"

            [attributes]
            bind = "data-model"
            loop = "data-each"
            "#,
        )
        .unwrap();
        assert_eq!(options.toggle_class, "enabled");
        assert_eq!(options.attributes.bind, "data-model");
        assert_eq!(options.attributes.repeat, "data-each");
        assert_eq!(options.attributes.read, "data-read");
        assert_eq!(options.loop_indexing, LoopIndexing::Qualified);
        assert!(options.stop_events);
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_json_and_reports_errors() {
        let options = BindingOptions::from_json_str(r#"{"stop_events": false}"#).unwrap();
        assert!(!options.stop_events);
        assert!(matches!(
            BindingOptions::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            BindingOptions::from_toml_str("immediate = \"yes\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            BindingOptions::from_json_str(r#"{"attributes": {"read": "data-bind"}}"#),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
