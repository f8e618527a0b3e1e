//! A module for working with graphs stored in compressed sparse row form.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::{
    csr::Csr,
    edge::Edge,
    error::{Error, Result},
    topology::Topology,
};

/// An undirected graph, made up of edges, and the structures derived from them.
///
/// The topology is fixed at construction. Derived structures start out absent and are filled in
/// by the `build_*` methods (or on demand by the operations that need them).
#[derive(Clone, Debug, Default)]
pub struct Graph {
    num_vert: usize,
    num_edge: usize,
    /// The two endpoints of each edge.
    edge2vert: Option<Csr>,
    /// The adjacent vertices of each vertex.
    pub(crate) vert2vert: Option<Csr>,
    /// The incident edges of each vertex.
    pub(crate) vert2edge: Option<Csr>,
    /// The adjacent edges of each edge (line graph).
    edge2edge: Option<Csr>,
    pub(crate) vert_degree: Option<Vec<usize>>,
    pub(crate) num_color: usize,
    pub(crate) vert_color: Option<Vec<usize>>,
    pub(crate) edge_color: Option<Vec<usize>>,
}

impl Graph {
    /// Creates a graph from raw CSR endpoint arrays.
    ///
    /// `edge2vert` holds two 0-based vertex indices per edge and `p_edge2vert` the `num_edge + 1`
    /// offsets into it. Self-loops and repeated edges are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::graph::Graph;
    ///
    /// let graph = Graph::new(3, 2, vec![0, 1, 1, 2], vec![0, 2, 4]).unwrap();
    /// assert_eq!(graph.num_edge(), 2);
    ///
    /// // Each edge must have exactly two endpoints.
    /// assert!(Graph::new(3, 1, vec![0, 1, 2], vec![0, 3]).is_err());
    /// ```
    pub fn new(
        num_vert: usize,
        num_edge: usize,
        edge2vert: Vec<usize>,
        p_edge2vert: Vec<usize>,
    ) -> Result<Self> {
        let edge2vert = Csr::new(edge2vert, p_edge2vert)?;

        if edge2vert.row_count() != num_edge {
            return Err(Error::InvalidTopology(format!(
                "expected {num_edge} edges, found {}",
                edge2vert.row_count()
            )));
        }

        let mut seen = HashSet::with_capacity(num_edge);
        for (e, ends) in edge2vert.rows().enumerate() {
            let &[source, target] = ends else {
                return Err(Error::InvalidTopology(format!(
                    "edge {e} has {} endpoints",
                    ends.len()
                )));
            };

            if source >= num_vert || target >= num_vert {
                return Err(Error::InvalidTopology(format!(
                    "edge {e} references a vertex outside 0..{num_vert}"
                )));
            }

            let edge = Edge::new(source, target);
            if edge.is_loop() {
                return Err(Error::InvalidTopology(format!("edge {e} is a self-loop")));
            }

            // Edges hash independently of their orientation, so (a, b) and (b, a) collide.
            if !seen.insert(edge) {
                return Err(Error::InvalidTopology(format!(
                    "edge {e} ({source}, {target}) is repeated"
                )));
            }
        }

        Ok(Self {
            num_vert,
            num_edge,
            edge2vert: Some(edge2vert),
            ..Default::default()
        })
    }

    /// Creates a graph from a list of edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
    /// assert_eq!(graph.edge(1), Some(Edge::new(1, 2)));
    /// ```
    pub fn from_edges(num_vert: usize, edges: &[Edge]) -> Result<Self> {
        let edge2vert = edges
            .iter()
            .flat_map(|edge| [edge.source(), edge.target()])
            .collect();
        let p_edge2vert = (0..=edges.len()).map(|e| 2 * e).collect();

        Self::new(num_vert, edges.len(), edge2vert, p_edge2vert)
    }

    /// Creates a graph known only through its symmetric vertex adjacency.
    ///
    /// Such a graph has no `edge2vert`, so only the builders that work from `vert2vert` apply.
    /// This is how line graphs are represented.
    pub fn from_adjacency(num_vert: usize, vert2vert: Csr) -> Result<Self> {
        if vert2vert.row_count() != num_vert {
            return Err(Error::InvalidTopology(format!(
                "expected {num_vert} adjacency rows, found {}",
                vert2vert.row_count()
            )));
        }

        if let Some(v) = (0..num_vert).find(|&v| vert2vert.row(v).contains(&v)) {
            return Err(Error::InvalidTopology(format!("vertex {v} is its own neighbour")));
        }

        if !vert2vert.is_symmetric() {
            return Err(Error::InvalidTopology("adjacency is not symmetric".into()));
        }

        Ok(Self {
            num_vert,
            num_edge: vert2vert.nnz() / 2,
            vert2vert: Some(vert2vert),
            ..Default::default()
        })
    }

    /// Returns the vertex count of the graph.
    pub fn num_vert(&self) -> usize {
        self.num_vert
    }

    /// Returns the edge count of the graph.
    pub fn num_edge(&self) -> usize {
        self.num_edge
    }

    pub fn edge2vert(&self) -> Option<&Csr> {
        self.edge2vert.as_ref()
    }

    pub fn vert2vert(&self) -> Option<&Csr> {
        self.vert2vert.as_ref()
    }

    pub fn vert2edge(&self) -> Option<&Csr> {
        self.vert2edge.as_ref()
    }

    pub fn edge2edge(&self) -> Option<&Csr> {
        self.edge2edge.as_ref()
    }

    pub fn vert_degree(&self) -> Option<&[usize]> {
        self.vert_degree.as_deref()
    }

    /// Returns the number of vertex colors, 0 until the vertices are colored.
    pub fn num_color(&self) -> usize {
        self.num_color
    }

    pub fn vert_color(&self) -> Option<&[usize]> {
        self.vert_color.as_deref()
    }

    pub fn edge_color(&self) -> Option<&[usize]> {
        self.edge_color.as_deref()
    }

    /// Returns the edge at index `e`, if the endpoint structure is present.
    pub fn edge(&self, e: usize) -> Option<Edge> {
        let edge2vert = self.edge2vert.as_ref()?;
        if e >= edge2vert.row_count() {
            return None;
        }

        match edge2vert.row(e) {
            &[source, target] => Some(Edge::new(source, target)),
            _ => None,
        }
    }

    /// Iterates over the edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.num_edge).filter_map(move |e| self.edge(e))
    }

    /// Builds the incident edges of each vertex, the transpose of `edge2vert`.
    ///
    /// Each vertex lists its edges in ascending index order.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let mut graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
    /// graph.build_vert2edge().unwrap();
    ///
    /// let vert2edge = graph.vert2edge().unwrap();
    /// assert_eq!(vert2edge.row(1), &[0, 1]);
    /// ```
    pub fn build_vert2edge(&mut self) -> Result<()> {
        self.vert2edge = None;

        let Some(edge2vert) = self.edge2vert.as_ref() else {
            return Err(Error::missing("build_vert2edge", "edge2vert"));
        };

        self.vert2edge = Some(edge2vert.transpose(self.num_vert));
        debug!(num_vert = self.num_vert, "built vert2edge");

        Ok(())
    }

    /// Builds the adjacent vertices of each vertex.
    ///
    /// Two vertices are adjacent iff they share an edge; a vertex is never its own neighbour. The
    /// adjacency is read off `vert2edge` (built if absent), so each vertex lists its neighbours in
    /// the order of its incident edges. A graph created with [`from_adjacency`](Self::from_adjacency)
    /// fails with [`Error::MissingDependency`] and keeps its adjacency. After
    /// [`sort_vert2edge_by_color`](Self::sort_vert2edge_by_color) that order is by edge color.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let mut graph = Graph::from_edges(3, &[Edge::new(1, 2), Edge::new(0, 1)]).unwrap();
    /// graph.build_vert2vert().unwrap();
    ///
    /// // Vertex 1 is reached first through edge 0, then through edge 1.
    /// assert_eq!(graph.vert2vert().unwrap().row(1), &[2, 0]);
    /// ```
    pub fn build_vert2vert(&mut self) -> Result<()> {
        // A graph created from its adjacency has nothing to rebuild it from, so it keeps it.
        if self.edge2vert.is_none() {
            return Err(Error::missing("build_vert2vert", "edge2vert"));
        }

        self.vert2vert = None;

        if self.vert2edge.is_none() {
            self.build_vert2edge()?;
        }

        // Safety: both structures are present, checked or built just above.
        let edge2vert = self.edge2vert.as_ref().unwrap();
        let vert2edge = self.vert2edge.as_ref().unwrap();

        let vert2vert = Csr::from_rows((0..self.num_vert).map(|v| {
            vert2edge
                .row(v)
                .iter()
                .flat_map(|&e| edge2vert.row(e).iter().copied())
                .filter(move |&u| u != v)
                .collect::<Vec<_>>()
        }));

        self.vert2vert = Some(vert2vert);
        debug!(num_vert = self.num_vert, "built vert2vert");

        Ok(())
    }

    /// Builds the line graph adjacency: two edges are adjacent iff they share an endpoint.
    ///
    /// Each edge lists the edges incident to its first endpoint, then those incident to its
    /// second endpoint, each group in ascending order and every edge kept at its first occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// // A star: every edge touches vertex 0.
    /// let edges = [Edge::new(0, 1), Edge::new(0, 2), Edge::new(0, 3)];
    /// let mut graph = Graph::from_edges(4, &edges).unwrap();
    /// graph.build_edge2edge().unwrap();
    ///
    /// assert_eq!(graph.edge2edge().unwrap().row(1), &[0, 2]);
    /// ```
    pub fn build_edge2edge(&mut self) -> Result<()> {
        self.edge2edge = None;

        let Some(edge2vert) = self.edge2vert.as_ref() else {
            return Err(Error::missing("build_edge2edge", "edge2vert"));
        };

        // A fresh transpose keeps incident edges sorted even if `vert2edge` was reordered.
        let incidence = edge2vert.transpose(self.num_vert);

        let edge2edge = Csr::from_rows(edge2vert.rows().enumerate().map(|(e, ends)| {
            // The edge itself appears once per endpoint and is dropped.
            ends.iter()
                .flat_map(|&v| incidence.row(v).iter().copied())
                .filter(|&f| f != e)
                .unique()
                .collect::<Vec<_>>()
        }));

        self.edge2edge = Some(edge2edge);
        debug!(num_edge = self.num_edge, "built edge2edge");

        Ok(())
    }

    /// Builds the degree of each vertex.
    ///
    /// The degree is read from `vert2vert` if present, else from `vert2edge`, else by counting the
    /// endpoint occurrences in `edge2vert`.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let mut graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(0, 2)]).unwrap();
    /// graph.build_vert_degree().unwrap();
    ///
    /// assert_eq!(graph.vert_degree(), Some(&[2, 1, 1][..]));
    /// ```
    pub fn build_vert_degree(&mut self) -> Result<()> {
        self.vert_degree = None;

        let degree = if let Some(vert2vert) = self.vert2vert.as_ref() {
            (0..self.num_vert).map(|v| vert2vert.row_len(v)).collect()
        } else if let Some(vert2edge) = self.vert2edge.as_ref() {
            (0..self.num_vert).map(|v| vert2edge.row_len(v)).collect()
        } else if let Some(edge2vert) = self.edge2vert.as_ref() {
            let mut degree = vec![0; self.num_vert];
            for &v in edge2vert.indices() {
                degree[v] += 1;
            }
            degree
        } else {
            return Err(Error::missing(
                "build_vert_degree",
                "vert2vert, vert2edge or edge2vert",
            ));
        };

        self.vert_degree = Some(degree);

        Ok(())
    }

    /// Returns the line graph: one vertex per edge of `self`, adjacent when the edges share an
    /// endpoint.
    ///
    /// `edge2edge` is built first if absent.
    pub fn line_graph(&mut self) -> Result<Graph> {
        if self.edge2edge.is_none() {
            self.build_edge2edge()?;
        }

        // Safety: `edge2edge` was built just above if it was absent.
        let edge2edge = self.edge2edge.clone().unwrap();

        Graph::from_adjacency(self.num_edge, edge2edge)
    }

    /// Sets the color of every edge, e.g. from a coloring of the line graph computed elsewhere.
    pub fn set_edge_color(&mut self, colors: Vec<usize>) -> Result<()> {
        if colors.len() != self.num_edge {
            return Err(Error::InvalidTopology(format!(
                "expected {} edge colors, found {}",
                self.num_edge,
                colors.len()
            )));
        }

        self.edge_color = Some(colors);

        Ok(())
    }

    /// Consumes the graph into the communication topology used by the simulator.
    ///
    /// Vertices become nodes and edges become links; `vert2vert` and `vert2edge` provide the
    /// neighbour and link of each adjacency slot.
    pub fn into_topology(self) -> Result<Topology> {
        let Some(vert2edge) = self.vert2edge else {
            return Err(Error::missing("into_topology", "vert2edge"));
        };
        let Some(vert2vert) = self.vert2vert else {
            return Err(Error::missing("into_topology", "vert2vert"));
        };

        if vert2edge.offsets() != vert2vert.offsets() {
            return Err(Error::InvalidTopology(
                "vert2vert and vert2edge have different shapes".into(),
            ));
        }

        let (node2link, _) = vert2edge.into_parts();
        let (node2node, p_node2node) = vert2vert.into_parts();

        Topology::new(self.num_vert, self.num_edge, node2link, node2node, p_node2node)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a graph over the vertices mentioned, one edge per consecutive pair of each path.
    macro_rules! graph {
        ($num_vert:expr; $($path:expr),*) => {{
            let mut edges = Vec::new();

            $(
                let mut iter = $path.into_iter().peekable();
                while let (Some(a), Some(&b)) = (iter.next(), iter.peek()) {
                    edges.push(Edge::new(a, b));
                }
            )*

            Graph::from_edges($num_vert, &edges).unwrap()
        }};
    }

    pub(crate) use graph;

    /// The 12-vertex graph extracted from a partitioned mesh, used as a reference throughout.
    pub(crate) fn mesh12() -> Graph {
        let edges: Vec<Edge> = [
            (0, 1),
            (1, 2),
            (2, 4),
            (2, 5),
            (2, 3),
            (3, 5),
            (3, 7),
            (3, 9),
            (4, 5),
            (5, 10),
            (5, 9),
            (6, 7),
            (6, 8),
            (7, 8),
            (7, 9),
            (9, 10),
            (10, 11),
        ]
        .into_iter()
        .map(Edge::from)
        .collect();

        Graph::from_edges(12, &edges).unwrap()
    }

    const MESH12_DEGREE: [usize; 12] = [1, 2, 4, 4, 2, 5, 2, 4, 2, 4, 3, 1];

    #[test]
    fn new() {
        let graph = Graph::new(3, 2, vec![0, 1, 1, 2], vec![0, 2, 4]).unwrap();

        assert_eq!(graph.num_vert(), 3);
        assert_eq!(graph.num_edge(), 2);
        assert!(graph.vert2vert().is_none());
        assert!(graph.vert2edge().is_none());
        assert!(graph.edge2edge().is_none());
        assert!(graph.vert_degree().is_none());
        assert!(graph.vert_color().is_none());
        assert_eq!(graph.num_color(), 0);
    }

    #[test]
    fn new_rejects_malformed_input() {
        // Edge count mismatch.
        assert!(matches!(
            Graph::new(3, 2, vec![0, 1], vec![0, 2]),
            Err(Error::InvalidTopology(_))
        ));
        // Vertex out of range.
        assert!(matches!(
            Graph::new(2, 1, vec![0, 2], vec![0, 2]),
            Err(Error::InvalidTopology(_))
        ));
        // Self-loop.
        assert!(matches!(
            Graph::new(2, 1, vec![1, 1], vec![0, 2]),
            Err(Error::InvalidTopology(_))
        ));
        // Repeated edge, in either orientation.
        assert!(matches!(
            Graph::new(2, 2, vec![0, 1, 1, 0], vec![0, 2, 4]),
            Err(Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn from_edges() {
        let graph = graph!(4; [0, 1, 2, 3]);

        assert_eq!(graph.num_edge(), 3);
        assert_eq!(graph.edge2vert().unwrap().indices(), &[0, 1, 1, 2, 2, 3]);
        assert_eq!(graph.edge2vert().unwrap().offsets(), &[0, 2, 4, 6]);

        let edges: Vec<Edge> = graph.edges().collect();
        assert_eq!(edges, vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3)]);
        assert_eq!(graph.edge(3), None);
    }

    #[test]
    fn from_adjacency() {
        let adjacency = Csr::from_rows(vec![vec![1, 2], vec![0], vec![0]]);
        let graph = Graph::from_adjacency(3, adjacency).unwrap();

        assert_eq!(graph.num_edge(), 2);
        assert!(graph.edge2vert().is_none());
        assert_eq!(graph.edge(0), None);

        let asymmetric = Csr::from_rows(vec![vec![1], vec![]]);
        assert!(Graph::from_adjacency(2, asymmetric).is_err());

        let looped = Csr::from_rows(vec![vec![0]]);
        assert!(Graph::from_adjacency(1, looped).is_err());
    }

    #[test]
    fn vert2edge() {
        let mut graph = mesh12();
        graph.build_vert2edge().unwrap();

        let vert2edge = graph.vert2edge().unwrap();
        assert_eq!(vert2edge.row_count(), 12);
        assert_eq!(vert2edge.row(2), &[1, 2, 3, 4]);
        assert_eq!(vert2edge.row(5), &[3, 5, 8, 9, 10]);
        assert_eq!(vert2edge.nnz(), 34);
    }

    #[test]
    fn vert2vert() {
        let mut graph = mesh12();
        graph.build_vert2vert().unwrap();

        let vert2vert = graph.vert2vert().unwrap();
        assert!(vert2vert.is_symmetric());
        assert_eq!(vert2vert.row(0), &[1]);
        assert_eq!(vert2vert.row(5), &[2, 3, 4, 10, 9]);

        // Building vert2vert needs vert2edge, which is kept.
        assert!(graph.vert2edge().is_some());
    }

    #[test]
    fn edge2edge() {
        let mut graph = mesh12();
        graph.build_edge2edge().unwrap();

        let expected = Csr::new(
            vec![
                1, 0, 2, 3, 4, 1, 3, 4, 8, 1, 2, 4, 5, 8, 9, 10, 1, 2, 3, 5, 6, 7, 4, 6, 7, 3, 8,
                9, 10, 4, 5, 7, 11, 13, 14, 4, 5, 6, 10, 14, 15, 2, 3, 5, 9, 10, 3, 5, 8, 10, 15,
                16, 3, 5, 8, 9, 7, 14, 15, 12, 6, 13, 14, 11, 13, 6, 11, 14, 12, 6, 11, 13, 7,
                10, 15, 7, 10, 14, 9, 16, 9, 15,
            ],
            vec![
                0, 1, 5, 9, 16, 22, 29, 35, 41, 46, 52, 59, 63, 65, 69, 75, 80, 82,
            ],
        )
        .unwrap();

        assert_eq!(graph.edge2edge(), Some(&expected));
        assert!(expected.is_symmetric());

        // Rows follow the endpoints, not ascending edge order.
        let edge2edge = graph.edge2edge().unwrap();
        assert_eq!(edge2edge.row(5), &[4, 6, 7, 3, 8, 9, 10]);
        assert_eq!(edge2edge.row(11), &[12, 6, 13, 14]);
    }

    #[test]
    fn vert_degree_from_each_source() {
        // Only edge2vert.
        let mut graph = mesh12();
        graph.build_vert_degree().unwrap();
        assert_eq!(graph.vert_degree(), Some(&MESH12_DEGREE[..]));

        // vert2edge takes priority over edge2vert.
        let mut graph = mesh12();
        graph.build_vert2edge().unwrap();
        graph.build_vert_degree().unwrap();
        assert_eq!(graph.vert_degree(), Some(&MESH12_DEGREE[..]));

        // vert2vert takes priority over both.
        let mut graph = mesh12();
        graph.build_vert2vert().unwrap();
        graph.build_vert_degree().unwrap();
        assert_eq!(graph.vert_degree(), Some(&MESH12_DEGREE[..]));
    }

    #[test]
    fn missing_dependencies() {
        let mut graph = Graph::default();

        assert!(matches!(
            graph.build_vert_degree(),
            Err(Error::MissingDependency { .. })
        ));
        assert!(matches!(
            graph.build_vert2edge(),
            Err(Error::MissingDependency { .. })
        ));
        assert!(matches!(
            graph.build_vert2vert(),
            Err(Error::MissingDependency { .. })
        ));
        assert!(matches!(
            graph.build_edge2edge(),
            Err(Error::MissingDependency { .. })
        ));

        // Outputs are left empty.
        assert!(graph.vert_degree().is_none());
        assert!(graph.vert2edge().is_none());
        assert!(graph.vert2vert().is_none());
        assert!(graph.edge2edge().is_none());
    }

    #[test]
    fn line_graph() {
        let mut graph = graph!(4; [0, 1, 2, 3, 0]);
        let mut line_graph = graph.line_graph().unwrap();

        // The line graph of a 4-cycle is a 4-cycle.
        assert_eq!(line_graph.num_vert(), 4);
        assert_eq!(line_graph.num_edge(), 4);
        // Edge 0 = (0, 1) meets edge 3 at vertex 0 before edge 1 at vertex 1.
        assert_eq!(line_graph.vert2vert().unwrap().row(0), &[3, 1]);

        line_graph.build_vert_degree().unwrap();
        assert_eq!(line_graph.vert_degree(), Some(&[2, 2, 2, 2][..]));

        // Without endpoints the adjacency can't be rebuilt, and isn't discarded either.
        assert!(matches!(
            line_graph.build_vert2vert(),
            Err(Error::MissingDependency { .. })
        ));
        assert_eq!(line_graph.vert2vert().unwrap().row(0), &[3, 1]);
    }

    #[test]
    fn empty_graph_builders() {
        let mut graph = Graph::new(3, 0, vec![], vec![0]).unwrap();

        graph.build_vert2vert().unwrap();
        graph.build_edge2edge().unwrap();
        graph.build_vert_degree().unwrap();

        assert_eq!(graph.vert2vert().unwrap().row_count(), 3);
        assert!(graph.vert2vert().unwrap().is_empty());
        assert_eq!(graph.edge2edge().unwrap().row_count(), 0);
        assert_eq!(graph.vert_degree(), Some(&[0, 0, 0][..]));
    }

    #[test]
    fn set_edge_color() {
        let mut graph = graph!(3; [0, 1, 2]);

        assert!(graph.set_edge_color(vec![0]).is_err());
        assert!(graph.edge_color().is_none());

        graph.set_edge_color(vec![1, 0]).unwrap();
        assert_eq!(graph.edge_color(), Some(&[1, 0][..]));
    }

    #[test]
    fn into_topology() {
        let mut graph = graph!(3; [0, 1, 2]);

        assert!(matches!(
            graph.clone().into_topology(),
            Err(Error::MissingDependency { .. })
        ));

        graph.build_vert2vert().unwrap();
        let topology = graph.into_topology().unwrap();

        assert_eq!(topology.num_node(), 3);
        assert_eq!(topology.num_link(), 2);
        assert_eq!(topology.neighbours(1), &[0, 2]);
        assert_eq!(topology.links(1), &[0, 1]);
    }
}
