use clap::Parser;

use orderdesk::gateway::{self, OrderGatewayConfig};

#[derive(Parser)]
#[command(name = "orderdesk-gateway")]
#[command(version)]
#[command(about = "Orderdesk HTTP gateway")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:3000", env = "ORDERDESK_BIND_ADDR")]
    bind_addr: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = OrderGatewayConfig {
        bind_addr: cli.bind_addr,
    };

    if let Err(e) = gateway::start(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
