// Moteur LSA (C3): origination/envoi périodique et réception/inondation.
//
// Grounded on the original `LSAManager.enviar_lsa` / `receber_lsa`
// (class_net/lsa_manager.py) and the teacher's `forward_lsa` (src/lsa.rs):
// JSON over UDP/5000, strictly-monotonic per-origin sequence numbers, and
// byte-exact re-flood of accepted datagrams to every active neighbor except
// the sender.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::net::UdpSocket;

use crate::error::{AppError, Result};
use crate::state::SharedState;
use crate::types::{LsaNeighbor, LsaRecord};

pub const LSA_PORT: u16 = 5000;
const ORIGINATION_PERIOD: Duration = Duration::from_millis(500);
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);
const RECEIVE_BUFFER_LEN: usize = 4096;

/// Binds the single receive socket used for both listening and re-flooding.
/// Bind failure is fatal at startup, per spec §4.6/§7.
pub async fn bind_receive_socket() -> Result<UdpSocket> {
    UdpSocket::bind(("0.0.0.0", LSA_PORT))
        .await
        .map_err(|e| AppError::BindError(format!("cannot bind UDP {LSA_PORT}: {e}")))
}

/// Builds this router's current LSA record from its identity and static
/// neighbor table, excluding any neighbor presently in the inactive set.
async fn build_own_record(state: &SharedState, seq: u64) -> LsaRecord {
    let inactive = state.inactive.snapshot().await;
    let vizinhos = state
        .neighbors
        .iter()
        .filter(|(nid, _)| !inactive.contains(nid.as_str()))
        .map(|(nid, link)| (nid.clone(), LsaNeighbor { ip: link.ip, custo: link.cost }))
        .collect();

    LsaRecord { id: state.identity.id.clone(), ip: state.identity.ip, vizinhos, seq }
}

async fn active_neighbor_addrs(state: &SharedState) -> Vec<(String, SocketAddr)> {
    let inactive = state.inactive.snapshot().await;
    state
        .neighbors
        .iter()
        .filter(|(nid, _)| !inactive.contains(nid.as_str()))
        .map(|(nid, link)| (nid.clone(), SocketAddr::new(link.ip.into(), LSA_PORT)))
        .collect()
}

/// Origination & send task: every ~500ms, bump the sequence number, build a
/// fresh LSA, and send one datagram to each currently-active neighbor.
pub async fn run_origination(state: Arc<SharedState>) {
    let socket = match UdpSocket::bind(("0.0.0.0", 0)).await {
        Ok(s) => s,
        Err(e) => {
            warn!("LSA origination socket failed to bind an ephemeral port: {e}");
            return;
        }
    };
    let sequence = AtomicU64::new(0);
    let mut ticker = tokio::time::interval(ORIGINATION_PERIOD);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let seq = sequence.fetch_add(1, Ordering::Relaxed) + 1;
                let record = build_own_record(&state, seq).await;
                let payload = match serde_json::to_vec(&record) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("failed to serialize own LSA: {e}");
                        continue;
                    }
                };
                for (neighbor_id, addr) in active_neighbor_addrs(&state).await {
                    if let Err(e) = socket.send_to(&payload, addr).await {
                        warn!("failed to send LSA to {neighbor_id} ({addr}): {e}");
                    }
                }
                debug!("originated LSA seq={seq}");
            }
            _ = state.shutdown.notified() => {
                info!("LSA origination task shutting down");
                break;
            }
        }
    }
}

/// Receive & flood task: parse incoming datagrams, apply the anti-flood
/// acceptance rule, and forward accepted LSAs byte-for-byte to every active
/// neighbor except whoever it arrived from.
pub async fn run_reception(socket: Arc<UdpSocket>, state: Arc<SharedState>) {
    let mut buf = vec![0u8; RECEIVE_BUFFER_LEN];
    loop {
        tokio::select! {
            received = tokio::time::timeout(RECEIVE_TIMEOUT, socket.recv_from(&mut buf)) => {
                match received {
                    Ok(Ok((len, src))) => {
                        handle_datagram(&socket, &state, &buf[..len], src.ip()).await;
                    }
                    Ok(Err(e)) => warn!("UDP receive error: {e}"),
                    Err(_) => continue, // timeout: just loop back to check shutdown
                }
            }
            _ = state.shutdown.notified() => {
                info!("LSA reception task shutting down");
                break;
            }
        }
    }
}

async fn handle_datagram(socket: &UdpSocket, state: &SharedState, bytes: &[u8], sender_ip: std::net::IpAddr) {
    let record: LsaRecord = match serde_json::from_slice(bytes) {
        Ok(r) => r,
        Err(e) => {
            debug!("dropping malformed LSA datagram from {sender_ip}: {e}");
            return;
        }
    };

    let sender_ip = match sender_ip {
        std::net::IpAddr::V4(v4) => v4,
        std::net::IpAddr::V6(_) => {
            debug!("dropping LSA from unexpected IPv6 sender");
            return;
        }
    };

    let accepted = state.lsdb.try_accept(record.clone()).await;
    if !accepted {
        debug!("dropping stale or duplicate LSA from {} (seq={})", record.id, record.seq);
        return;
    }

    info!("accepted LSA from {} (seq={})", record.id, record.seq);
    state.request_recompute();
    reflood(socket, state, bytes, sender_ip).await;
}

/// Forwards the *original* received bytes to every neighbor in the static
/// table whose IP differs from the sender and that is not inactive.
async fn reflood(socket: &UdpSocket, state: &SharedState, original_bytes: &[u8], sender_ip: Ipv4Addr) {
    let inactive = state.inactive.snapshot().await;
    for (neighbor_id, link) in state.neighbors.iter() {
        if link.ip == sender_ip {
            continue;
        }
        if inactive.contains(neighbor_id.as_str()) {
            continue;
        }
        let addr = SocketAddr::new(link.ip.into(), LSA_PORT);
        if let Err(e) = socket.send_to(original_bytes, addr).await {
            warn!("failed to re-flood LSA to {neighbor_id} ({addr}): {e}");
        }
    }
}
