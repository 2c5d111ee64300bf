// Définitions des structures partagées: identité, table de voisins statique, LSA.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// This router's identity, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub ip: Ipv4Addr,
}

/// A statically configured neighbor: its IP and link cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborLink {
    pub ip: Ipv4Addr,
    pub cost: u32,
}

/// The static neighbor table, loaded once from `VIZINHOS` and never mutated.
pub type NeighborTable = HashMap<String, NeighborLink>;

/// One neighbor entry inside an LSA's `vizinhos` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsaNeighbor {
    pub ip: Ipv4Addr,
    pub custo: u32,
}

/// A Link-State Advertisement: one origin's view of its live neighbors.
///
/// Field names (`id`, `ip`, `vizinhos`, `custo`, `seq`) are the wire format and must
/// not be renamed; re-flooding forwards received bytes verbatim, so serialization
/// here is only used for origination, never to re-encode a received message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsaRecord {
    pub id: String,
    pub ip: Ipv4Addr,
    pub vizinhos: HashMap<String, LsaNeighbor>,
    pub seq: u64,
}

/// Destination-id -> first-hop neighbor-id. Rebuilt from scratch each recomputation.
pub type NextHopTable = HashMap<String, String>;
