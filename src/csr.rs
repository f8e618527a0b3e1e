//! A module for compressed sparse row (CSR) structures.
//!
//! Every list-of-lists relation in the crate (edge endpoints, incident edges, adjacency, line
//! graph) is stored as a flat `indices` array and an `offsets` array such that row `i` spans
//! `indices[offsets[i]..offsets[i + 1]]`.

use std::ops::Range;

use crate::error::{Error, Result};

/// A compressed list of lists of `usize` indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csr {
    indices: Vec<usize>,
    offsets: Vec<usize>,
}

impl Default for Csr {
    fn default() -> Self {
        Self::empty()
    }
}

impl Csr {
    /// Creates a structure with no rows.
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Creates a structure from raw arrays, checking the CSR shape invariant.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::csr::Csr;
    ///
    /// let csr = Csr::new(vec![1, 0, 2, 1], vec![0, 1, 3, 4]).unwrap();
    /// assert_eq!(csr.row(1), &[0, 2]);
    ///
    /// // The last offset must match the number of indices.
    /// assert!(Csr::new(vec![1, 0], vec![0, 1, 3]).is_err());
    /// ```
    pub fn new(indices: Vec<usize>, offsets: Vec<usize>) -> Result<Self> {
        match offsets.first() {
            Some(0) => {}
            Some(first) => {
                return Err(Error::InvalidTopology(format!(
                    "offsets must start at 0, found {first}"
                )))
            }
            None => return Err(Error::InvalidTopology("offsets are empty".into())),
        }

        if let Some(row) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::InvalidTopology(format!(
                "offsets decrease at row {row}"
            )));
        }

        // Safety: `offsets` was checked to be non-empty above.
        let last = *offsets.last().unwrap();
        if last != indices.len() {
            return Err(Error::InvalidTopology(format!(
                "last offset is {last} but there are {} indices",
                indices.len()
            )));
        }

        Ok(Self { indices, offsets })
    }

    /// Creates a structure from an iterator of rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::csr::Csr;
    ///
    /// let csr = Csr::from_rows(vec![vec![1], vec![0, 2], vec![1]]);
    /// assert_eq!(csr.offsets(), &[0, 1, 3, 4]);
    /// assert_eq!(csr.indices(), &[1, 0, 2, 1]);
    /// ```
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = usize>,
    {
        let mut csr = Self::empty();
        for row in rows {
            csr.indices.extend(row);
            csr.offsets.push(csr.indices.len());
        }

        csr
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns the total number of stored indices.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Returns whether no indices are stored, regardless of the row count.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the slot range of a row inside [`indices`](Self::indices).
    pub fn range(&self, row: usize) -> Range<usize> {
        self.offsets[row]..self.offsets[row + 1]
    }

    /// Returns the entries of a row.
    pub fn row(&self, row: usize) -> &[usize] {
        &self.indices[self.range(row)]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [usize] {
        let range = self.range(row);
        &mut self.indices[range]
    }

    /// Returns the number of entries in a row.
    pub fn row_len(&self, row: usize) -> usize {
        self.offsets[row + 1] - self.offsets[row]
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.indices[w[0]..w[1]])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Consumes the structure, returning `(indices, offsets)`.
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.indices, self.offsets)
    }

    /// Computes the transpose, i.e. for each column the rows it appears in.
    ///
    /// Rows of the result list their entries in ascending order. Every index must be less than
    /// `column_count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use colornet::csr::Csr;
    ///
    /// // Two edges, (0, 1) and (1, 2), transposed into the incident edges of each vertex.
    /// let edge2vert = Csr::from_rows(vec![vec![0, 1], vec![1, 2]]);
    /// let vert2edge = edge2vert.transpose(3);
    ///
    /// assert_eq!(vert2edge, Csr::from_rows(vec![vec![0], vec![0, 1], vec![1]]));
    /// ```
    pub fn transpose(&self, column_count: usize) -> Self {
        // Count the entries of each column, then prefix sum into offsets.
        let mut offsets = vec![0; column_count + 1];
        for &column in &self.indices {
            offsets[column + 1] += 1;
        }
        for i in 0..column_count {
            offsets[i + 1] += offsets[i];
        }

        // Scatter the row numbers using a write cursor per column. Rows are visited in order so
        // each column ends up sorted.
        let mut cursor = offsets[..column_count].to_vec();
        let mut indices = vec![0; self.indices.len()];
        for (row, entries) in self.rows().enumerate() {
            for &column in entries {
                indices[cursor[column]] = row;
                cursor[column] += 1;
            }
        }

        Self { indices, offsets }
    }

    /// Checks that `j` is in row `i` exactly when `i` is in row `j`.
    pub fn is_symmetric(&self) -> bool {
        let n = self.row_count();

        self.rows().enumerate().all(|(i, row)| {
            row.iter()
                .all(|&j| j < n && self.row(j).contains(&i))
        })
    }
}
