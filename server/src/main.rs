mod errors;
mod relay;
mod tests;

use crate::relay::Relay;
use common::CONFIG;
use std::env;

#[tokio::main]
async fn main() {
    env::set_var("RUST_LOG", CONFIG.get_log_level());
    env_logger::init();
    let server = if CONFIG.get_server_ip() == "server" {
        Relay::new("0.0.0.0".to_string(), CONFIG.get_server_port())
    } else {
        Relay::new(CONFIG.get_server_ip(), CONFIG.get_server_port())
    };

    server.listen().await;
}
