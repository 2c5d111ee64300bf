// État partagé entre les quatre tâches du superviseur: LSDB, ensemble des
// voisins inactifs, et les signaux de recalcul / arrêt.
//
// Grounded on the teacher's `AppState` (src/lsa.rs, src/neighbor.rs): a coarse
// `tokio::sync::Mutex` per shared map, hidden behind small accessor methods so
// call sites never hold a lock across an `.await` boundary longer than needed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::types::{Identity, LsaRecord, NeighborTable};

/// The Link-State Database: one entry per origin, always the highest sequence
/// number accepted so far for that origin.
#[derive(Debug, Default)]
pub struct Lsdb {
    inner: Mutex<HashMap<String, LsaRecord>>,
}

impl Lsdb {
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashMap::new()) }
    }

    /// Applies the anti-flood acceptance rule: accept iff absent or strictly newer.
    /// Returns true if the record was installed.
    pub async fn try_accept(&self, record: LsaRecord) -> bool {
        let mut map = self.inner.lock().await;
        let should_accept = match map.get(&record.id) {
            None => true,
            Some(existing) => record.seq > existing.seq,
        };
        if should_accept {
            map.insert(record.id.clone(), record);
        }
        should_accept
    }

    /// A consistent point-in-time copy of the whole LSDB.
    pub async fn snapshot(&self) -> HashMap<String, LsaRecord> {
        self.inner.lock().await.clone()
    }

    pub async fn known_origins(&self) -> HashSet<String> {
        self.inner.lock().await.keys().cloned().collect()
    }
}

/// The set of neighbor-ids currently deemed unreachable. Written only by the
/// Neighbor Monitor; read by the LSA send task and the Route Computer.
#[derive(Debug, Default)]
pub struct InactiveSet {
    inner: Mutex<HashSet<String>>,
}

impl InactiveSet {
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashSet::new()) }
    }

    /// Atomically replaces the set, e.g. with this cycle's probe results.
    pub async fn replace(&self, new_set: HashSet<String>) {
        *self.inner.lock().await = new_set;
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        self.inner.lock().await.clone()
    }

    pub async fn contains(&self, neighbor_id: &str) -> bool {
        self.inner.lock().await.contains(neighbor_id)
    }
}

/// Everything the four tasks share, owned by the Daemon Supervisor.
pub struct SharedState {
    pub identity: Identity,
    pub neighbors: NeighborTable,
    pub lsdb: Lsdb,
    pub inactive: InactiveSet,
    /// Notified whenever C2 completes a cycle or C3 accepts a new LSA; C5
    /// listens and pushes a fresh route table in response.
    pub recompute: Notify,
    pub shutdown: Notify,
}

impl SharedState {
    pub fn new(identity: Identity, neighbors: NeighborTable) -> Arc<Self> {
        Arc::new(Self {
            identity,
            neighbors,
            lsdb: Lsdb::new(),
            inactive: InactiveSet::new(),
            recompute: Notify::new(),
            shutdown: Notify::new(),
        })
    }

    pub fn request_recompute(&self) {
        self.recompute.notify_one();
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}
