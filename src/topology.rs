//! The communication topology driven by the simulator.

use std::{collections::HashSet, ops::Range};

use crate::error::{Error, Result};

/// Nodes, links, and for each node the neighbour and link of every adjacency slot.
///
/// Slot `k` of node `n` (with `k` in [`range(n)`](Topology::range)) targets neighbour
/// `node2node[k]` over link `node2link[k]`. The order of a node's slots is the order in which it
/// communicates with its neighbours.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    num_node: usize,
    num_link: usize,
    node2link: Vec<usize>,
    node2node: Vec<usize>,
    p_node2node: Vec<usize>,
}

impl Topology {
    /// Creates a topology, rejecting any structural inconsistency.
    ///
    /// Besides the CSR shape, every slot `(n, m, l)` must be mirrored by a slot `(m, n, l)`, each
    /// link must be used by exactly two slots, and a node may neither list itself nor list the
    /// same neighbour twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::topology::Topology;
    ///
    /// // A path 0 - 1 - 2 with links 0 and 1.
    /// let topology = Topology::new(3, 2, vec![0, 0, 1, 1], vec![1, 0, 2, 1], vec![0, 1, 3, 4]);
    /// assert!(topology.is_ok());
    ///
    /// // Node 0 claims node 1 as a neighbour but node 1 doesn't reciprocate.
    /// let topology = Topology::new(2, 1, vec![0], vec![1], vec![0, 1, 1]);
    /// assert!(topology.is_err());
    /// ```
    pub fn new(
        num_node: usize,
        num_link: usize,
        node2link: Vec<usize>,
        node2node: Vec<usize>,
        p_node2node: Vec<usize>,
    ) -> Result<Self> {
        if p_node2node.len() != num_node + 1 {
            return Err(invalid(format!(
                "expected {} offsets, found {}",
                num_node + 1,
                p_node2node.len()
            )));
        }

        if p_node2node[0] != 0 {
            return Err(invalid("offsets must start at 0".into()));
        }

        if let Some(node) = p_node2node.windows(2).position(|w| w[0] > w[1]) {
            return Err(invalid(format!("offsets decrease at node {node}")));
        }

        let slots = p_node2node[num_node];
        if node2node.len() != slots || node2link.len() != slots {
            return Err(invalid(format!(
                "expected {slots} slots, found {} neighbours and {} links",
                node2node.len(),
                node2link.len()
            )));
        }

        let topology = Self {
            num_node,
            num_link,
            node2link,
            node2node,
            p_node2node,
        };
        topology.check_slots()?;

        Ok(topology)
    }

    /// Checks ranges, reciprocity and link pairing of every slot.
    fn check_slots(&self) -> Result<()> {
        let mut link_use = vec![0usize; self.num_link];

        for node in 0..self.num_node {
            let mut seen = HashSet::with_capacity(self.degree(node));

            for (&neighb, &link) in self.neighbours(node).iter().zip(self.links(node)) {
                if neighb >= self.num_node {
                    return Err(invalid(format!(
                        "node {node} targets node {neighb} outside 0..{}",
                        self.num_node
                    )));
                }
                if link >= self.num_link {
                    return Err(invalid(format!(
                        "node {node} uses link {link} outside 0..{}",
                        self.num_link
                    )));
                }
                if neighb == node {
                    return Err(invalid(format!("node {node} targets itself")));
                }
                if !seen.insert(neighb) {
                    return Err(invalid(format!(
                        "node {node} lists node {neighb} more than once"
                    )));
                }

                let mirrored = self
                    .neighbours(neighb)
                    .iter()
                    .zip(self.links(neighb))
                    .any(|(&back, &back_link)| back == node && back_link == link);
                if !mirrored {
                    return Err(invalid(format!(
                        "slot ({node}, {neighb}) over link {link} has no mirror at node {neighb}"
                    )));
                }

                link_use[link] += 1;
            }
        }

        if let Some(link) = link_use.iter().position(|&count| count != 2) {
            return Err(invalid(format!(
                "link {link} is used by {} slots instead of 2",
                link_use[link]
            )));
        }

        Ok(())
    }

    pub fn num_node(&self) -> usize {
        self.num_node
    }

    pub fn num_link(&self) -> usize {
        self.num_link
    }

    pub fn node2link(&self) -> &[usize] {
        &self.node2link
    }

    pub fn node2node(&self) -> &[usize] {
        &self.node2node
    }

    pub fn p_node2node(&self) -> &[usize] {
        &self.p_node2node
    }

    /// Returns the slot range of a node.
    pub fn range(&self, node: usize) -> Range<usize> {
        self.p_node2node[node]..self.p_node2node[node + 1]
    }

    /// Returns the neighbours of a node in communication order.
    pub fn neighbours(&self, node: usize) -> &[usize] {
        &self.node2node[self.range(node)]
    }

    /// Returns the links of a node, aligned with [`neighbours`](Self::neighbours).
    pub fn links(&self, node: usize) -> &[usize] {
        &self.node2link[self.range(node)]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.p_node2node[node + 1] - self.p_node2node[node]
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidTopology(reason)
}
