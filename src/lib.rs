//! Colornet schedules pairwise communication on undirected graphs and simulates it.
//!
//! # Basic usage
//!
//! The library is centered around the [`Graph`](graph::Graph) structure which is constructed from
//! compressed sparse row (CSR) endpoint arrays, a list of [`Edge`](edge::Edge) instances or a
//! [DIMACS file](dimacs). Derived structures (incidence lists, adjacency, line graph, degrees) are
//! built on demand. The edges are then colored greedily so that every color class is a matching,
//! and each vertex's neighbours are reordered by edge color. The resulting
//! [`Topology`](topology::Topology) drives the [`NetSim`](netsim::NetSim) simulator, in which
//! nodes alternate local work with handshakes and transfers over their links.
//!
//! ```rust
//! use colornet::config::NetSimConfig;
//! use colornet::edge::Edge;
//! use colornet::graph::Graph;
//! use colornet::netsim::NetSim;
//!
//! // A 4-cycle.
//! let edges = [Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3), Edge::new(3, 0)];
//! let mut graph = Graph::from_edges(4, &edges).unwrap();
//!
//! // Two colors suffice for the vertices...
//! assert_eq!(graph.color_vert_by_welsh_powell().unwrap(), 2);
//! assert_eq!(graph.vert_color(), Some(&[0, 1, 0, 1][..]));
//!
//! // ...and for the edges, which become the communication rounds.
//! assert_eq!(graph.build_color_ordered_adjacency().unwrap(), 2);
//!
//! // 20 work steps, then two rounds of a handshake and a 10 step transfer.
//! let mut netsim = NetSim::from_graph(graph, &NetSimConfig::default()).unwrap();
//! assert_eq!(netsim.run(1_000).unwrap(), 42);
//! assert!(netsim.flag_end());
//! ```

pub mod coloring;
pub mod config;
pub mod csr;
pub mod dimacs;
pub mod edge;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod netsim;
mod reorder;
pub mod topology;

pub use error::{Error, Result};
