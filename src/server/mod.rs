mod handlers;
pub mod models;
mod overlay;
mod params;
mod state;
mod util;

pub use handlers::run_server;
