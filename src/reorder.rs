//! Reordering of the incidence lists so that neighbours are visited in communication rounds.
//!
//! With a proper edge coloring, each color class is a matching: no vertex has two incident edges
//! of the same color. Visiting incident edges by ascending color therefore lets every vertex talk
//! to its partner of round `c` at the same time as that partner talks back.

use tracing::debug;

use crate::{
    error::{Error, Result},
    graph::Graph,
};

impl Graph {
    /// Stably sorts each vertex's incident edges by ascending edge color.
    ///
    /// `vert2edge` is built first if absent. The vertex adjacency no longer matches the new edge
    /// order, so `vert2vert` is cleared and must be rebuilt.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let mut graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(0, 2)]).unwrap();
    /// graph.set_edge_color(vec![1, 0]).unwrap();
    /// graph.sort_vert2edge_by_color().unwrap();
    ///
    /// assert_eq!(graph.vert2edge().unwrap().row(0), &[1, 0]);
    /// ```
    pub fn sort_vert2edge_by_color(&mut self) -> Result<()> {
        if self.edge_color.is_none() {
            return Err(Error::missing("sort_vert2edge_by_color", "edge_color"));
        }

        if self.vert2edge.is_none() {
            self.build_vert2edge()?;
        }

        // Safety: `edge_color` was checked and `vert2edge` built just above.
        let edge_color = self.edge_color.as_ref().unwrap();
        let vert2edge = self.vert2edge.as_mut().unwrap();
        for v in 0..vert2edge.row_count() {
            vert2edge.row_mut(v).sort_by_key(|&e| edge_color[e]);
        }

        self.vert2vert = None;
        debug!(num_vert = self.num_vert(), "sorted vert2edge by edge color");

        Ok(())
    }

    /// Colors the edges if needed, sorts the incidence lists by color and rebuilds the vertex
    /// adjacency from them.
    ///
    /// Afterwards the graph is ready for [`into_topology`](Self::into_topology). Returns the
    /// number of edge colors.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// // A path 0 - 1 - 2 - 3: the middle edge gets color 0, the outer edges color 1.
    /// let edges = [Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3)];
    /// let mut graph = Graph::from_edges(4, &edges).unwrap();
    ///
    /// assert_eq!(graph.build_color_ordered_adjacency().unwrap(), 2);
    /// assert_eq!(graph.vert2vert().unwrap().row(1), &[2, 0]);
    /// ```
    pub fn build_color_ordered_adjacency(&mut self) -> Result<usize> {
        if self.edge_color.is_none() {
            self.color_edges_by_welsh_powell()?;
        }

        self.sort_vert2edge_by_color()?;
        self.build_vert2vert()?;

        Ok(self.num_edge_color())
    }
}
