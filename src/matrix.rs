//! Dense matrix views of a graph.
//!
//! These follow the algebraic definitions of the derived structures (products of the incidence
//! matrix) and are meant for small graphs, inspection and cross-checking the CSR builders.

use nalgebra::DMatrix;

use crate::{
    csr::Csr,
    error::{Error, Result},
    graph::Graph,
};

impl Csr {
    /// Expands the structure into a dense 0/1 matrix with `column_count` columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::csr::Csr;
    /// use nalgebra::dmatrix;
    ///
    /// let csr = Csr::from_rows(vec![vec![1], vec![0]]);
    /// assert_eq!(
    ///     csr.to_dense(2),
    ///     dmatrix![0.0, 1.0;
    ///              1.0, 0.0]
    /// );
    /// ```
    pub fn to_dense(&self, column_count: usize) -> DMatrix<f64> {
        let mut matrix = DMatrix::<f64>::zeros(self.row_count(), column_count);

        for (i, row) in self.rows().enumerate() {
            for &j in row {
                matrix[(i, j)] = 1.0;
            }
        }

        matrix
    }
}

/// Constructs the vertex-edge incidence matrix `B`, with `B[(v, e)] = 1` iff `v` is an endpoint of
/// `e`.
///
/// # Examples
///
/// ```
/// use colornet::edge::Edge;
/// use colornet::graph::Graph;
/// use colornet::matrix::incidence_matrix;
/// use nalgebra::dmatrix;
///
/// let graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(0, 2)]).unwrap();
/// assert_eq!(
///     incidence_matrix(&graph).unwrap(),
///     dmatrix![1.0, 1.0;
///              1.0, 0.0;
///              0.0, 1.0]
/// );
/// ```
pub fn incidence_matrix(graph: &Graph) -> Result<DMatrix<f64>> {
    let Some(edge2vert) = graph.edge2vert() else {
        return Err(Error::missing("incidence_matrix", "edge2vert"));
    };

    // `edge2vert` is the transpose of the incidence relation.
    Ok(edge2vert.to_dense(graph.num_vert()).transpose())
}

/// Constructs the diagonal degree matrix `D`, the row sums of the incidence matrix.
pub fn degree_matrix(graph: &Graph) -> Result<DMatrix<f64>> {
    let incidence = incidence_matrix(graph)?;
    let n = graph.num_vert();
    let mut matrix = DMatrix::<f64>::zeros(n, n);

    for (i, row) in incidence.row_iter().enumerate() {
        matrix[(i, i)] = row.sum();
    }

    Ok(matrix)
}

/// Constructs the adjacency matrix `A = B·Bᵗ - D`.
///
/// # Examples
///
/// ```
/// use colornet::edge::Edge;
/// use colornet::graph::Graph;
/// use colornet::matrix::adjacency_matrix;
/// use nalgebra::dmatrix;
///
/// let graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(0, 2)]).unwrap();
/// assert_eq!(
///     adjacency_matrix(&graph).unwrap(),
///     dmatrix![0.0, 1.0, 1.0;
///              1.0, 0.0, 0.0;
///              1.0, 0.0, 0.0]
/// );
/// ```
pub fn adjacency_matrix(graph: &Graph) -> Result<DMatrix<f64>> {
    let incidence = incidence_matrix(graph)?;
    let degree = degree_matrix(graph)?;

    Ok(&incidence * incidence.transpose() - degree)
}

/// Constructs the line graph adjacency matrix `Bᵗ·B - 2I`.
///
/// Every edge has two endpoints, so the diagonal of `Bᵗ·B` is 2 everywhere.
pub fn line_graph_matrix(graph: &Graph) -> Result<DMatrix<f64>> {
    let incidence = incidence_matrix(graph)?;
    let m = graph.num_edge();

    Ok(incidence.transpose() * &incidence - DMatrix::<f64>::identity(m, m) * 2.0)
}

#[cfg(test)]
mod tests {
    use nalgebra::dmatrix;

    use super::*;
    use crate::{
        edge::Edge,
        graph::tests::{graph, mesh12},
    };

    #[test]
    fn empty_graph() {
        let graph = Graph::new(0, 0, vec![], vec![0]).unwrap();

        assert_eq!(incidence_matrix(&graph).unwrap(), dmatrix![]);
        assert_eq!(adjacency_matrix(&graph).unwrap(), dmatrix![]);
        assert_eq!(line_graph_matrix(&graph).unwrap(), dmatrix![]);
    }

    #[test]
    fn path() {
        let graph = graph!(3; [0, 1, 2]);

        assert_eq!(
            degree_matrix(&graph).unwrap(),
            dmatrix![1.0, 0.0, 0.0;
                     0.0, 2.0, 0.0;
                     0.0, 0.0, 1.0]
        );
        assert_eq!(
            adjacency_matrix(&graph).unwrap(),
            dmatrix![0.0, 1.0, 0.0;
                     1.0, 0.0, 1.0;
                     0.0, 1.0, 0.0]
        );
        assert_eq!(
            line_graph_matrix(&graph).unwrap(),
            dmatrix![0.0, 1.0;
                     1.0, 0.0]
        );
    }

    #[test]
    fn agrees_with_builders() {
        let mut graph = mesh12();
        graph.build_vert2vert().unwrap();
        graph.build_edge2edge().unwrap();
        graph.build_vert_degree().unwrap();

        let n = graph.num_vert();
        let m = graph.num_edge();

        assert_eq!(
            adjacency_matrix(&graph).unwrap(),
            graph.vert2vert().unwrap().to_dense(n)
        );
        assert_eq!(
            line_graph_matrix(&graph).unwrap(),
            graph.edge2edge().unwrap().to_dense(m)
        );

        let degree = degree_matrix(&graph).unwrap();
        for (v, &d) in graph.vert_degree().unwrap().iter().enumerate() {
            assert_eq!(degree[(v, v)], d as f64);
        }
    }

    #[test]
    fn requires_edge2vert() {
        let mut graph = graph!(3; [0, 1, 2]);
        let line_graph = graph.line_graph().unwrap();

        assert!(matches!(
            adjacency_matrix(&line_graph),
            Err(Error::MissingDependency { .. })
        ));
    }
}
