//! A discrete-event simulator of nodes alternating local work and pairwise communication.
//!
//! Each node repeats, for a fixed number of iterations: perform `node_size` work steps, then
//! talk to each of its neighbours in slot order. Talking to a neighbour means first waiting until
//! the neighbour targets this node back (the handshake), then sharing the link between them until
//! its transfer completes. The simulation advances in global steps during which every unfinished
//! node performs one micro-step.
//!
//! On a topology built with [`Graph::build_color_ordered_adjacency`] every node talks to its
//! neighbours in edge color order, so the handshakes of round `c` always find a partner and the
//! run terminates.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    config::NetSimConfig,
    error::{Error, Result},
    graph::Graph,
    topology::Topology,
};

/// What a node is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Local work.
    Work,
    /// Waiting for the targeted neighbour to target this node back.
    Connect,
    /// Sharing the link with the targeted neighbour.
    Transfer,
}

/// The coarse state of a node as seen by its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    Work,
    Comm,
}

impl Phase {
    pub fn state(self) -> NodeState {
        match self {
            Phase::Work => NodeState::Work,
            Phase::Connect | Phase::Transfer => NodeState::Comm,
        }
    }
}

/// The observable state after a step, e.g. to feed a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of steps performed so far.
    pub step: usize,
    pub glob_iter: usize,
    pub flag_end: bool,
    pub phase: Vec<Phase>,
    pub node_iter: Vec<usize>,
    pub node_step: Vec<usize>,
    /// The neighbour each communicating node targets.
    pub target: Vec<Option<usize>>,
    pub link_step: Vec<usize>,
}

/// The simulator state, owning its topology.
#[derive(Clone, Debug)]
pub struct NetSim {
    topology: Topology,
    node_size: Vec<usize>,
    /// Doubled transfer sizes.
    link_size: Vec<usize>,
    numb_iter: usize,

    glob_iter: usize,
    node_iter: Vec<usize>,
    /// Current slot of each node inside its adjacency range.
    node_conn: Vec<usize>,
    phase: Vec<Phase>,

    node_step: Vec<usize>,
    link_step: Vec<usize>,
    flag_end: bool,
    numb_step: Vec<usize>,
    step_count: usize,
}

impl NetSim {
    /// Creates a simulator over `topology`, every node starting to work on its first iteration.
    ///
    /// Fails with [`Error::InvalidConfig`] if the configured sizes don't match the topology.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::config::NetSimConfig;
    /// use colornet::netsim::NetSim;
    /// use colornet::topology::Topology;
    ///
    /// // Two nodes joined by link 0.
    /// let topology = Topology::new(2, 1, vec![0, 0], vec![1, 0], vec![0, 1, 2]).unwrap();
    /// let config = NetSimConfig::default().with_node_size(vec![1, 3]).with_link_size(vec![2]);
    ///
    /// let mut netsim = NetSim::new(topology, &config).unwrap();
    /// assert_eq!(netsim.run(100).unwrap(), 6);
    /// ```
    pub fn new(topology: Topology, config: &NetSimConfig) -> Result<Self> {
        let num_node = topology.num_node();
        let num_link = topology.num_link();

        let node_size = config.node_sizes(num_node)?;
        let link_size = config.link_sizes(num_link)?;
        let numb_iter = config.iterations;

        let node_conn = topology.p_node2node()[..num_node].to_vec();
        let flag_end = num_node == 0 || numb_iter == 0;

        debug!(num_node, num_link, numb_iter, "created simulator");

        Ok(Self {
            topology,
            node_size,
            link_size,
            numb_iter,
            glob_iter: 0,
            node_iter: vec![0; num_node],
            node_conn,
            phase: vec![Phase::Work; num_node],
            node_step: vec![0; num_node],
            link_step: vec![0; num_link],
            flag_end,
            numb_step: vec![0; numb_iter],
            step_count: 0,
        })
    }

    /// Consumes a graph with a vertex adjacency and incidence lists into a simulator.
    ///
    /// See [`Graph::into_topology`].
    pub fn from_graph(graph: Graph, config: &NetSimConfig) -> Result<Self> {
        Self::new(graph.into_topology()?, config)
    }

    /// Performs one global step: every unfinished node advances by one micro-step.
    ///
    /// Handshakes read the state every node had at the start of the step, so the outcome doesn't
    /// depend on the order in which nodes are visited. Does nothing once the simulation has ended.
    pub fn step(&mut self) {
        if self.flag_end {
            return;
        }

        let prev_phase = self.phase.clone();
        let prev_conn = self.node_conn.clone();

        for node in 0..self.topology.num_node() {
            if self.node_iter[node] >= self.numb_iter {
                continue;
            }

            match self.phase[node] {
                Phase::Work => self.step_work(node),
                Phase::Connect => self.step_connect(node, &prev_phase, &prev_conn),
                Phase::Transfer => self.step_transfer(node),
            }
        }

        self.numb_step[self.glob_iter] += 1;
        self.step_count += 1;

        // Safety: a simulation with no nodes ends at construction, so there is a minimum.
        self.glob_iter = *self.node_iter.iter().min().unwrap();
        self.flag_end = self.node_iter.iter().all(|&iter| iter == self.numb_iter);
    }

    fn step_work(&mut self, node: usize) {
        self.node_step[node] += 1;

        if self.node_step[node] < self.node_size[node] {
            return;
        }

        self.node_step[node] = 0;

        // A node without neighbours has nothing to exchange.
        if self.topology.degree(node) == 0 {
            self.node_iter[node] += 1;
            return;
        }

        self.phase[node] = Phase::Connect;
        trace!(
            iter = self.node_iter[node],
            node,
            neighb = self.topology.node2node()[self.node_conn[node]],
            "-->|"
        );
    }

    fn step_connect(&mut self, node: usize, prev_phase: &[Phase], prev_conn: &[usize]) {
        let node2node = self.topology.node2node();
        let neighb = node2node[self.node_conn[node]];

        let reciprocated = node2node[prev_conn[neighb]] == node;
        if reciprocated && prev_phase[neighb].state() == NodeState::Comm {
            self.phase[node] = Phase::Transfer;
            trace!(iter = self.node_iter[node], node, neighb, "<-->");
        }
    }

    fn step_transfer(&mut self, node: usize) {
        let link = self.topology.node2link()[self.node_conn[node]];

        // Both partners advance the shared counter, one of them seeing `size - 1` and the other
        // `size` on the last step.
        self.link_step[link] += 1;
        if self.link_step[link] + 1 < self.link_size[link] {
            return;
        }

        if self.link_step[link] == self.link_size[link] {
            self.link_step[link] = 0;
        }

        let range = self.topology.range(node);
        self.node_conn[node] += 1;

        if self.node_conn[node] == range.end {
            self.node_conn[node] = range.start;
            self.node_iter[node] += 1;
            self.phase[node] = Phase::Work;
        } else {
            self.phase[node] = Phase::Connect;
            trace!(
                iter = self.node_iter[node],
                node,
                neighb = self.topology.node2node()[self.node_conn[node]],
                "-->|"
            );
        }
    }

    /// Steps until the simulation ends, returning the total number of steps.
    ///
    /// Fails with [`Error::StepLimit`] if it hasn't ended after `max_steps` more steps, which
    /// happens when nodes wait on each other in a cycle.
    pub fn run(&mut self, max_steps: usize) -> Result<usize> {
        for _ in 0..max_steps {
            if self.flag_end {
                break;
            }
            self.step();
        }

        if !self.flag_end {
            warn!(
                limit = max_steps,
                glob_iter = self.glob_iter,
                "simulation did not end"
            );
            return Err(Error::StepLimit {
                limit: max_steps,
                glob_iter: self.glob_iter,
            });
        }

        Ok(self.step_count)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the work progress of each node in its current iteration.
    pub fn node_step(&self) -> &[usize] {
        &self.node_step
    }

    /// Returns the transfer progress of each link.
    pub fn link_step(&self) -> &[usize] {
        &self.link_step
    }

    /// Returns the doubled transfer size of each link.
    pub fn link_size(&self) -> &[usize] {
        &self.link_size
    }

    pub fn node_size(&self) -> &[usize] {
        &self.node_size
    }

    /// Returns the number of completed iterations of each node.
    pub fn node_iter(&self) -> &[usize] {
        &self.node_iter
    }

    pub fn node_conn(&self) -> &[usize] {
        &self.node_conn
    }

    pub fn phase(&self) -> &[Phase] {
        &self.phase
    }

    pub fn node_state(&self, node: usize) -> NodeState {
        self.phase[node].state()
    }

    /// Returns the neighbour a node currently targets, `None` while it works.
    pub fn target(&self, node: usize) -> Option<usize> {
        match self.phase[node] {
            Phase::Work => None,
            Phase::Connect | Phase::Transfer => {
                Some(self.topology.node2node()[self.node_conn[node]])
            }
        }
    }

    /// Returns the number of iterations every node has completed.
    pub fn glob_iter(&self) -> usize {
        self.glob_iter
    }

    /// Returns the number of steps spent in each global iteration.
    pub fn numb_step(&self) -> &[usize] {
        &self.numb_step
    }

    pub fn numb_iter(&self) -> usize {
        self.numb_iter
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns whether every node has completed all its iterations.
    pub fn flag_end(&self) -> bool {
        self.flag_end
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            glob_iter: self.glob_iter,
            flag_end: self.flag_end,
            phase: self.phase.clone(),
            node_iter: self.node_iter.clone(),
            node_step: self.node_step.clone(),
            target: (0..self.topology.num_node())
                .map(|node| self.target(node))
                .collect(),
            link_step: self.link_step.clone(),
        }
    }
}
