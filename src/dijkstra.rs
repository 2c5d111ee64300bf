// Module d'implémentation de l'algorithme de Dijkstra (C4).
//
// Grounded on the teacher's binary-heap Dijkstra (src/dijkstra.rs) and the
// original `GerenciadorDeRotas.dijkstra` (route_manager.py): build a directed
// graph from the LSDB minus the inactive set, run single-source Dijkstra with
// a min-heap keyed on tentative distance, then walk predecessors back to
// source to recover the first hop.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::state::SharedState;
use crate::types::NextHopTable;

/// A directed weighted graph induced by the LSDB and the inactive set, plus
/// the local node's own advertised edges (bootstrapped from the static
/// neighbor table, per §9: the source does not need its own LSDB entry).
#[derive(Debug, Default)]
pub struct Graph {
    edges: HashMap<String, Vec<(String, u32)>>,
}

impl Graph {
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.edges.keys()
    }

    fn neighbors_of(&self, node: &str) -> &[(String, u32)] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Builds the graph from a consistent LSDB snapshot plus the local node's
/// static neighbor table, excluding every node and edge endpoint that is
/// currently inactive.
pub fn build_graph(
    source_id: &str,
    own_neighbors: &crate::types::NeighborTable,
    lsdb: &HashMap<String, crate::types::LsaRecord>,
    inactive: &std::collections::HashSet<String>,
) -> Graph {
    let mut edges: HashMap<String, Vec<(String, u32)>> = HashMap::new();

    // Bootstrap the source's own outgoing edges from the static table; the
    // source never marks itself inactive, so it's always present.
    let source_edges: Vec<(String, u32)> = own_neighbors
        .iter()
        .filter(|(nid, _)| !inactive.contains(nid.as_str()))
        .map(|(nid, link)| (nid.clone(), link.cost))
        .collect();
    edges.insert(source_id.to_string(), source_edges);

    for (origin, record) in lsdb {
        if inactive.contains(origin.as_str()) {
            continue;
        }
        let origin_edges: Vec<(String, u32)> = record
            .vizinhos
            .iter()
            .filter(|(nid, _)| !inactive.contains(nid.as_str()))
            .map(|(nid, info)| (nid.clone(), info.custo))
            .collect();
        edges.entry(origin.clone()).or_insert(origin_edges);
    }

    Graph { edges }
}

#[derive(Eq, PartialEq)]
struct HeapEntry {
    dist: u32,
    node: String,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; Reverse<HeapEntry> would also work, but
        // comparing distances directly keeps the push/pop sites readable.
        other.dist.cmp(&self.dist)
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs Dijkstra from `source` over `graph`, returning a destination -> next-hop
/// map. Unreachable destinations and the source itself are omitted.
pub fn shortest_paths(graph: &Graph, source: &str) -> NextHopTable {
    if !graph.edges.contains_key(source) {
        return NextHopTable::new();
    }

    let mut dist: HashMap<String, u32> = HashMap::new();
    let mut prev: HashMap<String, String> = HashMap::new();
    let mut visited: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source.to_string(), 0);
    heap.push(HeapEntry { dist: 0, node: source.to_string() });

    while let Some(HeapEntry { dist: current_dist, node }) = heap.pop() {
        if visited.contains(&node) {
            continue;
        }
        if current_dist > *dist.get(&node).unwrap_or(&u32::MAX) {
            continue;
        }
        visited.insert(node.clone());

        for (neighbor, cost) in graph.neighbors_of(&node) {
            if visited.contains(neighbor) {
                continue;
            }
            let candidate = current_dist.saturating_add(*cost);
            let better = match dist.get(neighbor) {
                Some(&best) => candidate < best,
                None => true,
            };
            if better {
                prev.insert(neighbor.clone(), node.clone());
                dist.insert(neighbor.clone(), candidate);
                heap.push(HeapEntry { dist: candidate, node: neighbor.clone() });
            }
        }
    }

    reconstruct_next_hops(source, &prev, dist.into_keys().collect())
}

/// Iterative predecessor walk (bounded by the number of known nodes) from each
/// reachable destination back to `source`, returning the node immediately
/// after `source` on that path. Avoids recursion so a malformed predecessor
/// map cannot cause unbounded stack growth or an infinite loop.
fn reconstruct_next_hops(
    source: &str,
    prev: &HashMap<String, String>,
    destinations: std::collections::HashSet<String>,
) -> NextHopTable {
    let mut table = NextHopTable::new();
    let bound = destinations.len().max(1);

    for destination in destinations {
        if destination == source {
            continue;
        }
        if !prev.contains_key(&destination) {
            continue;
        }

        let mut current = destination.clone();
        let mut steps = 0usize;
        let mut broken = false;
        while current != source {
            let Some(p) = prev.get(&current) else {
                broken = true;
                break;
            };
            if p == source {
                break;
            }
            current = p.clone();
            steps += 1;
            if steps > bound {
                broken = true;
                break;
            }
        }

        if !broken {
            table.insert(destination, current);
        }
    }

    table
}

/// Convenience wrapper tying graph construction and Dijkstra together over
/// the shared state's current LSDB + inactive-set snapshot.
pub async fn compute_next_hops(state: &SharedState) -> NextHopTable {
    let lsdb = state.lsdb.snapshot().await;
    let inactive = state.inactive.snapshot().await;
    let graph = build_graph(&state.identity.id, &state.neighbors, &lsdb, &inactive);
    shortest_paths(&graph, &state.identity.id)
}
