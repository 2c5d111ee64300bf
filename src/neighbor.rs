// Moniteur de voisins (C2): sonde chaque voisin statique à chaque cycle et
// maintient l'ensemble des voisins inactifs.
//
// Grounded on the original `VizinhosManager.verifica_tcp` / `atualiza_status_vizinhos`
// (docker/router/class_net/neighbor_manager.py): a single `ping -c 1 -W 0.1 <ip>`
// subprocess per neighbor per cycle, no hysteresis, no consecutive-failure threshold.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::Command;

use crate::state::SharedState;

const MONITOR_PERIOD: Duration = Duration::from_millis(500);
const PROBE_DEADLINE: Duration = Duration::from_millis(100);

/// Runs one ICMP echo probe against `ip` with a ~100ms deadline.
///
/// Returns `true` if the neighbor answered within the deadline. Any failure to
/// even spawn the subprocess (harness crash) is treated as a probe failure,
/// matching the spec's "a probe that crashes the subprocess harness is
/// reported as a failure".
pub async fn probe_once(ip: Ipv4Addr) -> bool {
    let deadline_secs = format!("{:.1}", PROBE_DEADLINE.as_secs_f64());
    let spawn = Command::new("ping")
        .arg("-c")
        .arg("1")
        .arg("-W")
        .arg(&deadline_secs)
        .arg(ip.to_string())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(PROBE_DEADLINE * 3, spawn).await {
        Ok(Ok(output)) => output.status.success(),
        Ok(Err(err)) => {
            warn!("probe harness failed for {ip}: {err}");
            false
        }
        Err(_) => {
            debug!("probe to {ip} timed out");
            false
        }
    }
}

/// Probes every configured neighbor once and returns the set of neighbor-ids
/// whose probe failed this cycle.
async fn probe_all(state: &SharedState) -> HashSet<String> {
    let mut inactive = HashSet::new();
    for (neighbor_id, link) in state.neighbors.iter() {
        let reachable = probe_once(link.ip).await;
        if reachable {
            debug!("neighbor {neighbor_id} ({}) is active", link.ip);
        } else {
            warn!("neighbor {neighbor_id} ({}) is inactive", link.ip);
            inactive.insert(neighbor_id.clone());
        }
    }
    inactive
}

/// Runs the neighbor monitor until shutdown: probe every neighbor, replace
/// the inactive set atomically, then unconditionally request a recompute.
pub async fn run(state: Arc<SharedState>) {
    let mut ticker = tokio::time::interval(MONITOR_PERIOD);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let inactive = probe_all(&state).await;
                state.inactive.replace(inactive).await;
                state.request_recompute();
            }
            _ = state.shutdown.notified() => {
                info!("neighbor monitor shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_of_loopback_succeeds_if_ping_is_available() {
        // Best-effort: environments without a `ping` binary or ICMP permission
        // will report this as inactive, which is itself correct behavior, so
        // we only assert the call doesn't hang or panic.
        let _ = probe_once(Ipv4Addr::new(127, 0, 0, 1)).await;
    }
}
