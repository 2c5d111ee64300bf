// Exercises the public API surface across module boundaries: address
// derivation agreeing with the next-hop table's router-ids, and a next-hop
// table computed end-to-end from a freshly constructed shared state.

use std::net::Ipv4Addr;

use roteador::addr;
use roteador::dijkstra;
use roteador::state::SharedState;
use roteador::types::{Identity, NeighborLink, NeighborTable};

#[test]
fn router_identifier_round_trips_through_address_derivation() {
    for n in 1..=20u32 {
        let id = format!("roteador{n}");
        let (subnet, prefix) = addr::subnet_for_identifier(&id).unwrap();
        let gateway = addr::gateway_for_identifier(&id).unwrap();
        let iface = addr::router_interface_for_identifier(&id).unwrap();

        assert_eq!(prefix, 24);
        assert_eq!(subnet.octets()[3], 0);
        assert_eq!(gateway.octets()[3], 1);
        assert_eq!(iface.octets()[3], 2);
        assert_eq!(subnet.octets()[..3], gateway.octets()[..3]);
        assert_eq!(subnet.octets()[..3], iface.octets()[..3]);
    }
}

#[tokio::test]
async fn next_hop_table_reflects_only_the_static_neighbor_table_with_an_empty_lsdb() {
    let mut neighbors = NeighborTable::new();
    neighbors.insert("roteador2".to_string(), NeighborLink { ip: Ipv4Addr::new(172, 21, 1, 2), cost: 10 });

    let state = SharedState::new(
        Identity { id: "roteador1".to_string(), ip: Ipv4Addr::new(172, 21, 0, 2) },
        neighbors,
    );

    let table = dijkstra::compute_next_hops(&state).await;
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("roteador2").unwrap(), "roteador2");
}
