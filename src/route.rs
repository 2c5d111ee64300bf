// Installateur de routes (C5): traduit la table des prochains sauts en
// opérations "route replace" vers le noyau.
//
// Grounded on the teacher's `update_routing_table_safe` (src/lsa.rs), which
// already uses `net_route::Handle`/`net_route::Route` for atomic add-or-replace
// semantics instead of shelling out to `ip route replace` as the original
// Python (`AtualizadorDeRotas.atualizar_rota`, route_update.py) does.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use log::{info, warn};
use net_route::{Handle, Route as KernelRoute};

use crate::addr;
use crate::state::SharedState;
use crate::types::{LsaRecord, NeighborTable, NextHopTable};

/// Resolves every known router-id to an IPv4 address: direct static
/// neighbors first, then every LSDB record's own address, then every address
/// advertised inside a record's `vizinhos` map (a neighbor-of-neighbor may be
/// a valid next hop before it has originated its own LSA).
fn build_ip_index(own_neighbors: &NeighborTable, lsdb: &HashMap<String, LsaRecord>) -> HashMap<String, Ipv4Addr> {
    let mut index = HashMap::new();
    for (id, link) in own_neighbors {
        index.insert(id.clone(), link.ip);
    }
    for (origin, record) in lsdb {
        index.entry(origin.clone()).or_insert(record.ip);
        for (neighbor_id, info) in &record.vizinhos {
            index.entry(neighbor_id.clone()).or_insert(info.ip);
        }
    }
    index
}

/// One row the installer intends to push: subnet of `destination` via the
/// router-interface address of `next_hop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    pub destination: String,
    pub next_hop: String,
    pub subnet: (Ipv4Addr, u8),
    pub gateway: Ipv4Addr,
}

/// Derives the kernel rows to install from a next-hop table and an IP index.
/// Entries whose destination or next-hop IP cannot be resolved are skipped
/// and logged, never aborting the batch.
pub fn derive_rows(next_hops: &NextHopTable, ip_index: &HashMap<String, Ipv4Addr>) -> Vec<RouteRow> {
    let mut rows = Vec::with_capacity(next_hops.len());
    for (destination, next_hop) in next_hops {
        let Some(&destination_ip) = ip_index.get(destination) else {
            warn!("cannot install route to {destination}: unknown IP address");
            continue;
        };
        let Some(&next_hop_ip) = ip_index.get(next_hop) else {
            warn!("cannot install route via {next_hop}: unknown IP address");
            continue;
        };
        let subnet = match addr::subnet_for_ip(destination_ip) {
            Ok(s) => s,
            Err(e) => {
                warn!("cannot derive subnet for {destination} ({destination_ip}): {e}");
                continue;
            }
        };
        let gateway = addr::router_interface_for_ip(next_hop_ip);
        rows.push(RouteRow { destination: destination.clone(), next_hop: next_hop.clone(), subnet, gateway });
    }
    rows
}

/// Pushes one row with replace (upsert) semantics: try add, and if the
/// kernel rejects it because the route already exists, delete then re-add.
async fn install_row(handle: &Handle, row: &RouteRow) -> crate::error::Result<()> {
    let (network, prefix) = row.subnet;
    let route = KernelRoute::new(IpAddr::V4(network), prefix).with_gateway(IpAddr::V4(row.gateway));

    match handle.add(&route).await {
        Ok(()) => {
            info!("installed route {}/{} via {} ({} -> {})", network, prefix, row.gateway, row.destination, row.next_hop);
            Ok(())
        }
        Err(first_err) => {
            let _ = handle.delete(&route).await;
            handle.add(&route).await.map_err(|second_err| {
                crate::error::AppError::RouteInstallError(format!(
                    "route {network}/{prefix} via {}: add failed ({first_err}), replace failed ({second_err})",
                    row.gateway
                ))
            })?;
            info!("replaced route {}/{} via {} ({} -> {})", network, prefix, row.gateway, row.destination, row.next_hop);
            Ok(())
        }
    }
}

/// Computes the current next-hop table and pushes every resolvable row.
/// Stateless per invocation: the full table is always pushed from scratch.
pub async fn reconcile(state: &SharedState) {
    let next_hops = crate::dijkstra::compute_next_hops(state).await;
    if next_hops.is_empty() {
        return;
    }

    let lsdb = state.lsdb.snapshot().await;
    let ip_index = build_ip_index(&state.neighbors, &lsdb);
    let rows = derive_rows(&next_hops, &ip_index);

    let handle = match Handle::new() {
        Ok(h) => h,
        Err(e) => {
            warn!("cannot open routing handle (insufficient permissions?): {e}");
            return;
        }
    };

    for row in &rows {
        if let Err(e) = install_row(&handle, row).await {
            warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LsaNeighbor, NeighborLink};
    use std::collections::HashMap as Map;

    #[test]
    fn derives_subnet_and_gateway_from_lsdb_ips() {
        let mut own = NeighborTable::new();
        own.insert("roteador2".to_string(), NeighborLink { ip: Ipv4Addr::new(172, 21, 1, 2), cost: 10 });

        let mut lsdb = Map::new();
        lsdb.insert("roteador4".to_string(), LsaRecord {
            id: "roteador4".to_string(),
            ip: Ipv4Addr::new(172, 21, 3, 2),
            vizinhos: HashMap::new(),
            seq: 1,
        });

        let ip_index = build_ip_index(&own, &lsdb);
        let mut next_hops = NextHopTable::new();
        next_hops.insert("roteador4".to_string(), "roteador2".to_string());

        let rows = derive_rows(&next_hops, &ip_index);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subnet, (Ipv4Addr::new(172, 21, 3, 0), 24));
        assert_eq!(rows[0].gateway, Ipv4Addr::new(172, 21, 1, 2));
    }

    #[test]
    fn skips_rows_with_unresolvable_ips() {
        let own = NeighborTable::new();
        let lsdb = Map::new();
        let ip_index = build_ip_index(&own, &lsdb);

        let mut next_hops = NextHopTable::new();
        next_hops.insert("roteador4".to_string(), "roteador2".to_string());

        assert!(derive_rows(&next_hops, &ip_index).is_empty());
    }

    #[test]
    fn resolves_neighbor_of_neighbor_via_vizinhos_ip() {
        let own = NeighborTable::new();
        let mut lsdb = Map::new();
        let mut vizinhos = HashMap::new();
        vizinhos.insert("roteador9".to_string(), LsaNeighbor { ip: Ipv4Addr::new(172, 21, 8, 2), custo: 10 });
        lsdb.insert("roteador4".to_string(), LsaRecord {
            id: "roteador4".to_string(),
            ip: Ipv4Addr::new(172, 21, 3, 2),
            vizinhos,
            seq: 1,
        });

        let ip_index = build_ip_index(&own, &lsdb);
        assert_eq!(ip_index.get("roteador9"), Some(&Ipv4Addr::new(172, 21, 8, 2)));
    }
}
