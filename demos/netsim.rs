use std::env;

use colornet::{
    config::NetSimConfig,
    dimacs::{read_dimacs, FileFormat},
    edge::Edge,
    graph::Graph,
    netsim::NetSim,
};
use tracing_subscriber::EnvFilter;

// Builds a `width` by `height` grid, vertices numbered row by row.
fn grid(width: usize, height: usize) -> Graph {
    let mut edges = vec![];

    for y in 0..height {
        for x in 0..width {
            let v = y * width + x;

            if x + 1 < width {
                edges.push(Edge::new(v, v + 1));
            }
            if y + 1 < height {
                edges.push(Edge::new(v, v + width));
            }
        }
    }

    Graph::from_edges(width * height, &edges).unwrap()
}

fn main() {
    // Run with `RUST_LOG=colornet=trace` to see every connection attempt and handshake.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // An optional DIMACS file, otherwise a small grid.
    let mut graph = match env::args().nth(1) {
        Some(path) => read_dimacs(path, FileFormat::Ascii).unwrap(),
        None => grid(6, 4),
    };

    let num_vert_color = graph.color_vert_by_welsh_powell().unwrap();
    let num_edge_color = graph.build_color_ordered_adjacency().unwrap();

    println!(
        "\nGraph with {} vertices and {} edges: {} vertex colors, {} communication rounds",
        graph.num_vert(),
        graph.num_edge(),
        num_vert_color,
        num_edge_color
    );

    let config = NetSimConfig::default().with_iterations(3);
    let mut netsim = NetSim::from_graph(graph, &config).unwrap();

    // Print a snapshot every 10 steps, these can be fed to a renderer.
    while !netsim.flag_end() {
        netsim.step();

        if netsim.step_count() % 10 == 0 {
            println!("{}", serde_json::to_string(&netsim.snapshot()).unwrap());
        }
    }

    println!("\nFinished after {} steps", netsim.step_count());
    for (iter, steps) in netsim.numb_step().iter().enumerate() {
        println!("Iteration {iter}: {steps} steps");
    }
}
