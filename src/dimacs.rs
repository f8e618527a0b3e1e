//! Reading and writing graphs in the DIMACS edge format.
//!
//! ```text
//! c optional comment lines
//! p edge <num_vert> <num_edge>
//! e <u> <v>
//! ```
//!
//! Vertices are numbered from 1 in the file and from 0 in memory.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use tracing::{debug, warn};

use crate::{
    edge::Edge,
    error::{Error, Result},
    graph::Graph,
};

/// Encoding of a graph file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Ascii,
    /// The compressed binary variant, not supported.
    Binary,
}

/// Reads a DIMACS graph file.
pub fn read_dimacs<P: AsRef<Path>>(path: P, format: FileFormat) -> Result<Graph> {
    let path = path.as_ref();

    if format == FileFormat::Binary {
        return Err(Error::UnsupportedFormat(format!(
            "binary DIMACS file {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let graph = parse_dimacs(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        num_vert = graph.num_vert(),
        num_edge = graph.num_edge(),
        "read DIMACS graph"
    );

    Ok(graph)
}

/// Parses a DIMACS graph from a reader.
///
/// The edge count of the graph is the number of distinct edges read, whatever the problem line
/// declares. An edge repeated in either direction is kept once.
///
/// # Examples
///
/// ```
/// use colornet::dimacs::parse_dimacs;
///
/// let input = "c a path\np edge 3 2\ne 1 2\ne 2 3\n";
/// let graph = parse_dimacs(input.as_bytes()).unwrap();
///
/// assert_eq!(graph.num_vert(), 3);
/// assert_eq!(graph.edge2vert().unwrap().indices(), &[0, 1, 1, 2]);
/// ```
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Graph> {
    let mut num_vert = None;
    let mut edges = Vec::new();
    let mut seen = HashSet::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            None | Some("c") => {}
            Some("p") => {
                if num_vert.is_some() {
                    return Err(parse_error(number, "repeated problem line"));
                }

                let (Some("edge"), Some(vert), Some(edge), None) =
                    (tokens.next(), tokens.next(), tokens.next(), tokens.next())
                else {
                    return Err(parse_error(number, "expected `p edge <vertices> <edges>`"));
                };

                num_vert = Some(parse_count(number, vert)?);
                // The declared edge count is only checked for syntax.
                parse_count(number, edge)?;
            }
            Some("e") => {
                let Some(num_vert) = num_vert else {
                    return Err(parse_error(number, "edge before the problem line"));
                };

                let (Some(u), Some(v), None) = (tokens.next(), tokens.next(), tokens.next())
                else {
                    return Err(parse_error(number, "expected `e <u> <v>`"));
                };

                let edge = Edge::new(
                    parse_vertex(number, u, num_vert)?,
                    parse_vertex(number, v, num_vert)?,
                );

                if edge.is_loop() {
                    return Err(parse_error(number, "self-loop"));
                }
                // Some instances list every edge in both directions.
                if !seen.insert(edge) {
                    warn!(line = number, u, v, "skipping repeated edge");
                    continue;
                }

                edges.push(edge);
            }
            Some(other) => {
                return Err(parse_error(
                    number,
                    &format!("unknown line descriptor `{other}`"),
                ))
            }
        }
    }

    let Some(num_vert) = num_vert else {
        return Err(parse_error(0, "missing problem line"));
    };

    Graph::from_edges(num_vert, &edges)
}

/// Writes a graph in the DIMACS edge format.
///
/// # Examples
///
/// ```
/// use colornet::dimacs::write_dimacs;
/// use colornet::edge::Edge;
/// use colornet::graph::Graph;
///
/// let graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
/// let mut out = Vec::new();
/// write_dimacs(&graph, &mut out).unwrap();
///
/// assert_eq!(String::from_utf8(out).unwrap(), "p edge 3 2\ne 1 2\ne 2 3\n");
/// ```
pub fn write_dimacs<W: Write>(graph: &Graph, mut writer: W) -> Result<()> {
    if graph.edge2vert().is_none() {
        return Err(Error::missing("write_dimacs", "edge2vert"));
    }

    writeln!(writer, "p edge {} {}", graph.num_vert(), graph.num_edge())?;
    for edge in graph.edges() {
        writeln!(writer, "e {} {}", edge.source() + 1, edge.target() + 1)?;
    }

    Ok(())
}

fn parse_error(line: usize, reason: &str) -> Error {
    Error::Parse {
        line,
        reason: reason.to_owned(),
    }
}

fn parse_count(line: usize, token: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| parse_error(line, &format!("`{token}` is not a count")))
}

/// Parses a 1-based vertex number into a 0-based index.
fn parse_vertex(line: usize, token: &str, num_vert: usize) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(vertex) if (1..=num_vert).contains(&vertex) => Ok(vertex - 1),
        Ok(vertex) => Err(parse_error(
            line,
            &format!("vertex {vertex} outside 1..={num_vert}"),
        )),
        Err(_) => Err(parse_error(line, &format!("`{token}` is not a vertex"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_anywhere() {
        let input = "\
c leading comment

p edge 4 99
c declared edge count is ignored
e 1 2
e 4 1

";
        let graph = parse_dimacs(input.as_bytes()).unwrap();

        assert_eq!(graph.num_vert(), 4);
        assert_eq!(graph.num_edge(), 2);
        assert_eq!(graph.edge(1), Some(Edge::new(3, 0)));
    }

    #[test]
    fn malformed_lines() {
        let cases = [
            ("e 1 2\n", 1),
            ("p edge 2\n", 1),
            ("p col 2 1\n", 1),
            ("p edge 2 1\ne 1\n", 2),
            ("p edge 2 1\ne 1 3\n", 2),
            ("p edge 2 1\ne 0 1\n", 2),
            ("p edge 2 1\ne 1 x\n", 2),
            ("p edge 2 1\ne 1 1\n", 2),
            ("p edge 2 1\np edge 2 1\n", 2),
            ("p edge 2 1\nx 1 2\n", 2),
        ];

        for (input, expected) in cases {
            match parse_dimacs(input.as_bytes()) {
                Err(Error::Parse { line, .. }) => assert_eq!(line, expected, "{input:?}"),
                other => panic!("{input:?} parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn repeated_edges_are_kept_once() {
        let input = "p edge 3 4\ne 1 2\ne 2 1\ne 2 3\ne 1 2\n";
        let graph = parse_dimacs(input.as_bytes()).unwrap();

        assert_eq!(graph.num_edge(), 2);
        assert_eq!(graph.edge2vert().unwrap().indices(), &[0, 1, 1, 2]);
    }

    #[test]
    fn missing_problem_line() {
        assert!(matches!(
            parse_dimacs("c nothing here\n".as_bytes()),
            Err(Error::Parse { line: 0, .. })
        ));
    }

    #[test]
    fn binary_unsupported() {
        assert!(matches!(
            read_dimacs("graph.col.b", FileFormat::Binary),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_dimacs("does/not/exist.col", FileFormat::Ascii),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn write_then_parse() {
        let graph = Graph::from_edges(4, &[Edge::new(2, 0), Edge::new(3, 1)]).unwrap();
        let mut out = Vec::new();
        write_dimacs(&graph, &mut out).unwrap();

        let parsed = parse_dimacs(out.as_slice()).unwrap();
        assert_eq!(parsed.edge2vert(), graph.edge2vert());
        assert_eq!(parsed.num_vert(), 4);
    }

    #[test]
    fn write_requires_edges() {
        let mut graph = Graph::from_edges(3, &[Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
        let line_graph = graph.line_graph().unwrap();

        assert!(matches!(
            write_dimacs(&line_graph, Vec::new()),
            Err(Error::MissingDependency { .. })
        ));
    }
}
