// Lecture de la configuration à partir des variables d'environnement.
//
// ROTEADOR_ID, ENDERECO_IP et VIZINHOS sont lus une seule fois au démarrage;
// toute erreur ici est fatale (AppError::ConfigError), conformément à la spec.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::types::{Identity, NeighborLink, NeighborTable};

/// Raw shape of one `VIZINHOS` entry: a two-element array `[ip, cost]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNeighborEntry {
    Pair(String, u32),
}

/// Reads `ROTEADOR_ID` and `ENDERECO_IP` into an [`Identity`].
pub fn read_identity() -> Result<Identity> {
    let id = env_var("ROTEADOR_ID")?;
    let ip_raw = env_var("ENDERECO_IP")?;
    let ip: Ipv4Addr = ip_raw
        .parse()
        .map_err(|_| AppError::ConfigError(format!("ENDERECO_IP {ip_raw:?} is not a valid IPv4 address")))?;
    Ok(Identity { id, ip })
}

/// Reads and parses `VIZINHOS`, a JSON object mapping neighbor-id to `[ip, cost]`.
pub fn read_neighbor_table() -> Result<NeighborTable> {
    let raw = env_var("VIZINHOS")?;
    let parsed: HashMap<String, RawNeighborEntry> = serde_json::from_str(&raw)
        .map_err(|e| AppError::ConfigError(format!("VIZINHOS is not valid JSON: {e}")))?;

    let mut table = NeighborTable::new();
    for (neighbor_id, RawNeighborEntry::Pair(ip_raw, cost)) in parsed {
        let ip: Ipv4Addr = ip_raw.parse().map_err(|_| {
            AppError::ConfigError(format!("VIZINHOS entry {neighbor_id:?} has invalid ip {ip_raw:?}"))
        })?;
        if cost == 0 {
            return Err(AppError::ConfigError(format!(
                "VIZINHOS entry {neighbor_id:?} has non-positive cost {cost}"
            )));
        }
        table.insert(neighbor_id, NeighborLink { ip, cost });
    }
    Ok(table)
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| AppError::ConfigError(format!("missing environment variable {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // std::env::set_var mutates global process state; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn parses_identity_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ROTEADOR_ID", "roteador1");
        std::env::set_var("ENDERECO_IP", "172.21.0.2");
        let identity = read_identity().unwrap();
        assert_eq!(identity.id, "roteador1");
        assert_eq!(identity.ip, Ipv4Addr::new(172, 21, 0, 2));
        std::env::remove_var("ROTEADOR_ID");
        std::env::remove_var("ENDERECO_IP");
    }

    #[test]
    fn rejects_missing_identity_vars() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("ROTEADOR_ID");
        std::env::remove_var("ENDERECO_IP");
        assert!(read_identity().is_err());
    }

    #[test]
    fn parses_neighbor_table_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(
            "VIZINHOS",
            r#"{"roteador2": ["172.21.1.2", 10], "roteador5": ["172.21.4.2", 20]}"#,
        );
        let table = read_neighbor_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["roteador2"].ip, Ipv4Addr::new(172, 21, 1, 2));
        assert_eq!(table["roteador2"].cost, 10);
        std::env::remove_var("VIZINHOS");
    }

    #[test]
    fn rejects_malformed_neighbor_table() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("VIZINHOS", "not json");
        assert!(read_neighbor_table().is_err());
        std::env::remove_var("VIZINHOS");
    }
}
