use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use smart_transit::api::{AppState, router};
use smart_transit::fleet::{FleetStore, sample_fleet, simulator};
use smart_transit::payment::SimulatedGateway;
use smart_transit::store::{BookingStore, MemoryKv};

/// Real-time bus tracking and ticket booking service.
#[derive(Parser)]
struct Args {
    /// Address to serve the API on.
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Seconds between simulated GPS updates.
    #[arg(long, default_value_t = simulator::TICK_INTERVAL.as_secs())]
    fleet_tick_secs: u64,

    /// Simulated payment processing time in milliseconds.
    #[arg(long, default_value_t = SimulatedGateway::DEFAULT_DELAY.as_millis() as u64)]
    payment_delay_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let (buses, routes) = sample_fleet();
    tracing::info!(buses = buses.len(), routes = routes.len(), "fleet provisioned");

    let fleet = Arc::new(FleetStore::new(buses, routes));
    let bookings = Arc::new(BookingStore::new(Arc::new(MemoryKv::new())));
    let gateway = Arc::new(SimulatedGateway::new(Duration::from_millis(
        args.payment_delay_ms,
    )));

    tokio::spawn(simulator::run(
        fleet.clone(),
        Duration::from_secs(args.fleet_tick_secs),
    ));

    let app = router(AppState {
        fleet,
        bookings,
        gateway,
    });

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(addr = %args.listen, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
