pub mod addr;
pub mod config;
pub mod dijkstra;
pub mod error;
pub mod lsa;
pub mod neighbor;
pub mod route;
pub mod state;
pub mod supervisor;
pub mod types;
