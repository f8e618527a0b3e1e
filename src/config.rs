//! Simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of work steps a node performs per iteration.
pub const DEFAULT_NODE_SIZE: usize = 20;

/// Default transfer size of a link, before doubling.
pub const DEFAULT_LINK_SIZE: usize = 10;

/// Default number of work/communication iterations per node.
pub const DEFAULT_ITERATIONS: usize = 1;

/// Sizes and iteration count of a simulation run.
///
/// Per-node and per-link sizes are optional; when absent every node or link uses the default.
/// Link sizes are doubled when the simulator is built: a transfer is counted by both partners,
/// so each of them advances the shared counter once per step.
///
/// # Examples
///
/// ```
/// use colornet::config::NetSimConfig;
///
/// let config = NetSimConfig::from_json(r#"{ "iterations": 3, "default_link_size": 4 }"#).unwrap();
///
/// assert_eq!(config.iterations, 3);
/// assert_eq!(config.default_node_size, 20);
/// assert_eq!(config.link_sizes(2).unwrap(), vec![8, 8]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSimConfig {
    /// Work steps of each node, overriding `default_node_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_size: Option<Vec<usize>>,

    /// Transfer size of each link, overriding `default_link_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_size: Option<Vec<usize>>,

    #[serde(default = "default_node_size")]
    pub default_node_size: usize,

    #[serde(default = "default_link_size")]
    pub default_link_size: usize,

    /// Number of iterations each node runs before it is done.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

fn default_node_size() -> usize {
    DEFAULT_NODE_SIZE
}

fn default_link_size() -> usize {
    DEFAULT_LINK_SIZE
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

impl Default for NetSimConfig {
    fn default() -> Self {
        Self {
            node_size: None,
            link_size: None,
            default_node_size: DEFAULT_NODE_SIZE,
            default_link_size: DEFAULT_LINK_SIZE,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl NetSimConfig {
    /// Parses a configuration from JSON, filling in defaults for absent fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn with_node_size(mut self, node_size: Vec<usize>) -> Self {
        self.node_size = Some(node_size);
        self
    }

    pub fn with_link_size(mut self, link_size: Vec<usize>) -> Self {
        self.link_size = Some(link_size);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Resolves the work size of each of `num_node` nodes.
    pub fn node_sizes(&self, num_node: usize) -> Result<Vec<usize>> {
        resolve("node", self.node_size.as_deref(), self.default_node_size, num_node)
    }

    /// Resolves the doubled transfer size of each of `num_link` links.
    pub fn link_sizes(&self, num_link: usize) -> Result<Vec<usize>> {
        let sizes = resolve("link", self.link_size.as_deref(), self.default_link_size, num_link)?;

        sizes
            .into_iter()
            .enumerate()
            .map(|(link, size)| {
                size.checked_mul(2).ok_or_else(|| {
                    Error::InvalidConfig(format!("link {link} has size {size}, too large to double"))
                })
            })
            .collect()
    }
}

/// Expands the default or checks the explicit sizes against the expected count.
fn resolve(
    what: &str,
    explicit: Option<&[usize]>,
    default: usize,
    count: usize,
) -> Result<Vec<usize>> {
    let sizes = match explicit {
        Some(sizes) if sizes.len() != count => {
            return Err(Error::InvalidConfig(format!(
                "expected {count} {what} sizes, found {}",
                sizes.len()
            )))
        }
        Some(sizes) => sizes.to_vec(),
        None => vec![default; count],
    };

    if let Some(index) = sizes.iter().position(|&size| size == 0) {
        return Err(Error::InvalidConfig(format!(
            "{what} {index} has size 0, sizes must be at least 1"
        )));
    }

    Ok(sizes)
}
