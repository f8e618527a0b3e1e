//! Greedy vertex and edge coloring.

use std::cmp::Reverse;

use tracing::debug;

use crate::{csr::Csr, error::Result, graph::Graph};

/// A proper coloring: adjacent vertices never share a color, and colors are `0..num_colors`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coloring {
    colors: Vec<usize>,
    num_colors: usize,
}

impl Coloring {
    /// Returns the color of each vertex.
    pub fn colors(&self) -> &[usize] {
        &self.colors
    }

    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    /// Checks that no two adjacent vertices share a color.
    pub fn is_proper(&self, adjacency: &Csr) -> bool {
        adjacency.rows().enumerate().all(|(vertex, neighbours)| {
            neighbours
                .iter()
                .all(|&neighbour| self.colors[neighbour] != self.colors[vertex])
        })
    }

    pub fn into_colors(self) -> Vec<usize> {
        self.colors
    }
}

/// Colors the vertices of a graph with the Welsh–Powell heuristic.
///
/// Vertices are visited by descending degree, ties broken by ascending index. Each round takes the
/// first uncolored vertex in that order, gives it the round's color, then gives the same color to
/// every later uncolored vertex that has no neighbour of that color yet. Rounds repeat until every
/// vertex is colored, so the number of rounds is the number of colors.
///
/// # Panics
///
/// If `degree` doesn't have one entry per row of `adjacency`.
///
/// # Examples
///
/// ```
/// use colornet::coloring::welsh_powell;
/// use colornet::csr::Csr;
///
/// // A path 0 - 1 - 2: the middle vertex has the highest degree and is colored first.
/// let adjacency = Csr::from_rows(vec![vec![1], vec![0, 2], vec![1]]);
/// let coloring = welsh_powell(&adjacency, &[1, 2, 1]);
///
/// assert_eq!(coloring.colors(), &[1, 0, 1]);
/// assert_eq!(coloring.num_colors(), 2);
/// ```
pub fn welsh_powell(adjacency: &Csr, degree: &[usize]) -> Coloring {
    assert_eq!(
        degree.len(),
        adjacency.row_count(),
        "one degree per vertex is required"
    );

    let n = degree.len();

    // The sort is stable, so equal degrees keep ascending index order.
    let mut pending: Vec<usize> = (0..n).collect();
    pending.sort_by_key(|&v| Reverse(degree[v]));

    let mut colors: Vec<Option<usize>> = vec![None; n];
    let mut color = 0;

    while let Some(&first) = pending.first() {
        colors[first] = Some(color);

        let mut rejected = Vec::with_capacity(pending.len() - 1);
        for &vertex in &pending[1..] {
            let conflict = adjacency
                .row(vertex)
                .iter()
                .any(|&neighbour| colors[neighbour] == Some(color));

            if conflict {
                rejected.push(vertex);
            } else {
                colors[vertex] = Some(color);
            }
        }

        pending = rejected;
        color += 1;
    }

    // Safety: the loop only ends once no vertex is pending, i.e. every vertex has a color.
    let colors = colors.into_iter().collect::<Option<Vec<_>>>().unwrap();

    Coloring {
        colors,
        num_colors: color,
    }
}

impl Graph {
    /// Colors the vertices with [`welsh_powell`], storing `vert_color` and `num_color`.
    ///
    /// The degree and the vertex adjacency are built first if absent. Returns the number of
    /// colors used.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let edges = [Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3), Edge::new(3, 0)];
    /// let mut graph = Graph::from_edges(4, &edges).unwrap();
    ///
    /// assert_eq!(graph.color_vert_by_welsh_powell().unwrap(), 2);
    /// assert_eq!(graph.vert_color(), Some(&[0, 1, 0, 1][..]));
    /// ```
    pub fn color_vert_by_welsh_powell(&mut self) -> Result<usize> {
        self.num_color = 0;
        self.vert_color = None;

        if self.vert_degree.is_none() {
            self.build_vert_degree()?;
        }

        if self.vert2vert.is_none() {
            self.build_vert2vert()?;
        }

        // Safety: both structures were built above if they were absent.
        let adjacency = self.vert2vert.as_ref().unwrap();
        let degree = self.vert_degree.as_ref().unwrap();

        let coloring = welsh_powell(adjacency, degree);
        debug!(
            num_vert = self.num_vert(),
            num_color = coloring.num_colors(),
            "colored vertices"
        );

        self.num_color = coloring.num_colors();
        self.vert_color = Some(coloring.into_colors());

        Ok(self.num_color)
    }

    /// Colors the edges by coloring the vertices of the line graph, storing `edge_color`.
    ///
    /// Returns the number of edge colors.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::edge::Edge;
    /// use colornet::graph::Graph;
    ///
    /// let edges = [Edge::new(0, 1), Edge::new(1, 2), Edge::new(0, 2)];
    /// let mut graph = Graph::from_edges(3, &edges).unwrap();
    ///
    /// // Every pair of triangle edges shares a vertex.
    /// assert_eq!(graph.color_edges_by_welsh_powell().unwrap(), 3);
    /// assert_eq!(graph.edge_color(), Some(&[0, 1, 2][..]));
    /// ```
    pub fn color_edges_by_welsh_powell(&mut self) -> Result<usize> {
        self.edge_color = None;

        let mut line_graph = self.line_graph()?;
        let num_color = line_graph.color_vert_by_welsh_powell()?;

        self.edge_color = line_graph.vert_color.take();

        Ok(num_color)
    }

    /// Returns the number of distinct edge colors, 0 if the edges aren't colored.
    pub fn num_edge_color(&self) -> usize {
        self.edge_color
            .as_ref()
            .and_then(|colors| colors.iter().max())
            .map_or(0, |max| max + 1)
    }
}
