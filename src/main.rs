// Point d'entrée du démon: lit la configuration, initialise le journal et
// l'état partagé, puis délègue au superviseur.
//
// Grounded on the teacher's `init::init_logging_and_env` (default RUST_LOG to
// "info" before `env_logger::init()`) and the original `main.py` (read env
// config once, fail fast, then start the four subsystems).

use roteador::{config, state, supervisor};

fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let identity = match config::read_identity() {
        Ok(identity) => identity,
        Err(e) => {
            log::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    let neighbors = match config::read_neighbor_table() {
        Ok(table) => table,
        Err(e) => {
            log::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    log::info!("starting roteador {} ({}) with {} configured neighbor(s)", identity.id, identity.ip, neighbors.len());

    let shared_state = state::SharedState::new(identity, neighbors);
    if let Err(e) = supervisor::run(shared_state).await {
        log::error!("fatal startup error: {e}");
        std::process::exit(1);
    }
}
