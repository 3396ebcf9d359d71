use super::{Port, PortSet, PortsDocument};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Fields an override entry may replace on a baseline port.
pub const DEFAULT_OVERRIDE_FIELDS: &[&str] = &[
    "import_statement",
    "current_min_cpp_version",
    "tracking_issue",
    "modules_support_date",
    "status",
    "module_native",
    "help_wanted",
];

/// Fields an unmatched override is given when it is added as a new port.
const NEW_PORT_DEFAULTS: &[(&str, &str)] = &[
    ("current_min_cpp_version", "Unknown"),
    ("homepage", ""),
    ("modules_support_date", ""),
    ("status", "?"),
    ("module_native", ""),
    ("tracking_issue", ""),
    ("version", ""),
    ("import_statement", ""),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridePolicy {
    pub fields: Vec<String>,
    /// Add override entries that match no baseline port as new ports.
    pub add_unmatched: bool,
}

impl Default for OverridePolicy {
    fn default() -> Self {
        Self {
            fields: DEFAULT_OVERRIDE_FIELDS.iter().map(|f| f.to_string()).collect(),
            add_unmatched: false,
        }
    }
}

pub fn merge(
    baseline: PortsDocument,
    overrides: Option<PortsDocument>,
    external: Option<PortsDocument>,
    policy: &OverridePolicy,
) -> PortSet {
    let mut ports: PortSet = baseline.ports.into_iter().collect();

    if let Some(overrides) = overrides {
        let mut unmatched: Vec<Port> = Vec::new();
        for entry in overrides.ports {
            match ports.get_mut(&entry.name) {
                Some(port) => apply_override(port, &entry, &policy.fields),
                None if policy.add_unmatched => unmatched.push(new_port_from(&entry)),
                None => tracing::debug!("override for unknown port '{}' ignored", entry.name),
            }
        }
        for port in unmatched {
            ports.insert(port);
        }
    }

    if let Some(external) = external {
        for project in external.ports {
            ports.insert(project);
        }
    }

    ports
}

/// Parse the raw file contents and merge them.
pub fn merge_sources(
    baseline: &str,
    overrides: Option<&str>,
    external: Option<&str>,
    policy: &OverridePolicy,
) -> Result<PortSet> {
    let baseline = PortsDocument::parse(baseline)?;
    let overrides = overrides.map(PortsDocument::parse).transpose()?;
    let external = external.map(PortsDocument::parse).transpose()?;
    Ok(merge(baseline, overrides, external, policy))
}

fn apply_override(port: &mut Port, entry: &Port, fields: &[String]) {
    for key in fields {
        if let Some(value) = entry.fields.get(key) {
            port.fields.insert(key.clone(), value.clone());
        }
    }
}

fn new_port_from(entry: &Port) -> Port {
    let mut port = Port::new(entry.name.clone());
    for (key, default) in NEW_PORT_DEFAULTS {
        let value = entry
            .fields
            .get(*key)
            .cloned()
            .unwrap_or_else(|| Value::String(default.to_string()));
        port.fields.insert(key.to_string(), value);
    }
    port
}
