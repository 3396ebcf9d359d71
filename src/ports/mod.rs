//! Port list documents and the name-keyed set they merge into.

pub mod merge;
pub mod stats;

pub use merge::{merge, merge_sources, OverridePolicy};
pub use stats::{estimate_completion, progress_document, HeaderStats};

use crate::error::Result;
use crate::model::Progress;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_DONE_MARKER: &str = "✅";

/// One port entry. Only `name` is interpreted structurally; every other field
/// is carried through merges untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Port {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Shape shared by the baseline, override, external and progress files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<serde_yaml::Mapping>,
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl PortsDocument {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Ports keyed by name, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct PortSet {
    ports: Vec<Port>,
    index: HashMap<String, usize>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a port, replacing any port with the same name in place.
    pub fn insert(&mut self, port: Port) {
        match self.index.get(&port.name) {
            Some(&i) => self.ports[i] = port,
            None => {
                self.index.insert(port.name.clone(), self.ports.len());
                self.ports.push(port);
            }
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Port> {
        let i = *self.index.get(name)?;
        self.ports.get_mut(i)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    pub fn into_ports(self) -> Vec<Port> {
        self.ports
    }

    pub fn progress(&self, done_marker: &str) -> Progress {
        let completed = self
            .ports
            .iter()
            .filter(|p| p.status() == Some(done_marker))
            .count();
        Progress {
            completed: completed as u64,
            total: self.ports.len() as u64,
        }
    }
}

impl FromIterator<Port> for PortSet {
    fn from_iter<I: IntoIterator<Item = Port>>(iter: I) -> Self {
        let mut set = PortSet::new();
        for port in iter {
            set.insert(port);
        }
        set
    }
}

/// True for text that holds no YAML document at all: empty, whitespace,
/// comments only, or a bare `---`.
pub fn is_blank_document(text: &str) -> bool {
    text.trim().is_empty() || matches!(serde_yaml::from_str::<Value>(text), Ok(Value::Null))
}

/// Count a document that is already merged, such as the progress file.
pub fn count_document(doc: &PortsDocument, done_marker: &str) -> Progress {
    doc.ports.iter().cloned().collect::<PortSet>().progress(done_marker)
}
