// Superviseur du démon (C6): démarre/arrête les quatre tâches, possède l'état
// partagé, et coordonne l'arrêt propre.
//
// Grounded on the teacher's `tasks.rs` (tokio::select! over interval tickers)
// and the original `RoteadorApp.iniciar_threads`/`parar` (router.py): bind the
// receive socket first (fail fast), spawn exactly four long-running tasks,
// wait for a shutdown signal, then join everything.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::net::UdpSocket;

use crate::error::Result;
use crate::state::SharedState;
use crate::{lsa, neighbor, route};

const SWEEP_PERIOD: Duration = Duration::from_millis(100);

/// The installer invocation driven by (a) every neighbor-monitor cycle
/// (unconditional) and (b) the LSDB-change sweep below; both funnel through
/// `SharedState::recompute`, consumed here in a single task so the installer
/// never races itself.
async fn run_installer(state: Arc<SharedState>) {
    loop {
        tokio::select! {
            _ = state.recompute.notified() => {
                route::reconcile(&state).await;
            }
            _ = state.shutdown.notified() => {
                info!("route installer shutting down");
                break;
            }
        }
    }
}

/// Periodically re-probes every router currently known in the LSDB (not just
/// direct neighbors) and requests a recompute whenever one of them stops
/// answering, mirroring the original `atualizar_tabela`/`verifica_roteadores_ativos`
/// loop that runs independently of the direct-neighbor monitor.
async fn run_lsdb_sweep(state: Arc<SharedState>) {
    let mut ticker = tokio::time::interval(SWEEP_PERIOD);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let lsdb = state.lsdb.snapshot().await;
                let mut any_unreachable = false;
                for (router_id, record) in &lsdb {
                    if router_id == &state.identity.id {
                        continue;
                    }
                    if !neighbor::probe_once(record.ip).await {
                        any_unreachable = true;
                    }
                }
                if any_unreachable {
                    state.request_recompute();
                }
            }
            _ = state.shutdown.notified() => {
                info!("LSDB sweep shutting down");
                break;
            }
        }
    }
}

/// Binds the receive socket, spawns the four tasks, waits for shutdown, then
/// joins them. Bind failure propagates as a fatal startup error.
pub async fn run(state: Arc<SharedState>) -> Result<()> {
    let receive_socket = Arc::new(lsa::bind_receive_socket().await?);
    info!("bound LSA socket on 0.0.0.0:{}", lsa::LSA_PORT);

    let tasks = vec![
        tokio::spawn(lsa::run_origination(Arc::clone(&state))),
        tokio::spawn(lsa::run_reception(Arc::clone(&receive_socket), Arc::clone(&state))),
        tokio::spawn(neighbor::run(Arc::clone(&state))),
        tokio::spawn(run_lsdb_sweep(Arc::clone(&state))),
        tokio::spawn(run_installer(Arc::clone(&state))),
    ];

    info!("roteador {} ready ({})", state.identity.id, state.identity.ip);

    wait_for_termination().await;
    state.request_shutdown();

    for task in tasks {
        let _ = task.await;
    }
    info!("roteador {} shut down cleanly", state.identity.id);
    Ok(())
}

async fn wait_for_termination() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal"),
        Err(e) => info!("shutdown signal handler failed ({e}), shutting down anyway"),
    }
}

/// Binds a fresh receive socket and passes ownership to `run_reception` so
/// tests can exercise the four-task lifecycle without the real daemon's
/// signal-driven shutdown.
#[doc(hidden)]
pub async fn run_with_socket(state: Arc<SharedState>, receive_socket: UdpSocket) -> Vec<tokio::task::JoinHandle<()>> {
    let receive_socket = Arc::new(receive_socket);
    vec![
        tokio::spawn(lsa::run_origination(Arc::clone(&state))),
        tokio::spawn(lsa::run_reception(Arc::clone(&receive_socket), Arc::clone(&state))),
        tokio::spawn(neighbor::run(Arc::clone(&state))),
        tokio::spawn(run_lsdb_sweep(Arc::clone(&state))),
        tokio::spawn(run_installer(Arc::clone(&state))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Identity, NeighborTable};
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn all_tasks_exit_promptly_after_shutdown() {
        let state = SharedState::new(
            Identity { id: "roteador1".to_string(), ip: Ipv4Addr::new(127, 0, 0, 1) },
            NeighborTable::new(),
        );
        let socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let tasks = run_with_socket(Arc::clone(&state), socket).await;

        state.request_shutdown();

        let joined = tokio::time::timeout(Duration::from_secs(2), async {
            for task in tasks {
                let _ = task.await;
            }
        })
        .await;
        assert!(joined.is_ok(), "all tasks must exit within 2s of shutdown");
    }
}
