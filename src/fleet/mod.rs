use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub mod seed;
pub mod simulator;

pub use seed::sample_fleet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusStatus {
    Running,
    Delayed,
    Maintenance,
    Stopped,
}

impl BusStatus {
    /// Only moving buses receive simulated GPS updates.
    pub fn is_moving(self) -> bool {
        matches!(self, BusStatus::Running | BusStatus::Delayed)
    }
}

/// A tracked transit unit. Position and speed belong to the simulator;
/// status also to the driver endpoint; everything else is fixed at
/// provisioning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub bus_id: String,
    pub route_number: String,
    pub driver_id: String,
    pub driver_name: String,
    pub status: BusStatus,
    pub capacity: usize,
    pub occupancy: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub order: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub route_number: String,
    pub route_name: String,
    pub stops: Vec<Stop>,
    pub color: String,
}

/// Owner of all mutable fleet state. Reads take a snapshot; every mutation,
/// simulator tick or driver action alike, goes through [`FleetStore::apply`].
pub struct FleetStore {
    buses: RwLock<Vec<Bus>>,
    routes: Vec<Route>,
}

impl FleetStore {
    pub fn new(buses: Vec<Bus>, routes: Vec<Route>) -> Self {
        debug_assert!(buses.iter().all(|b| b.occupancy <= b.capacity));
        Self {
            buses: RwLock::new(buses),
            routes,
        }
    }

    pub async fn snapshot(&self) -> Vec<Bus> {
        self.buses.read().await.clone()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub async fn bus(&self, bus_id: &str) -> Option<Bus> {
        self.buses
            .read()
            .await
            .iter()
            .find(|b| b.bus_id == bus_id)
            .cloned()
    }

    /// The single mutation entry point.
    pub async fn apply<R>(&self, f: impl FnOnce(&mut [Bus]) -> R) -> R {
        let mut buses = self.buses.write().await;
        f(&mut buses)
    }

    /// Driver action: change one bus's operational status. Returns the
    /// updated bus, or `None` for an unknown id.
    pub async fn set_status(&self, bus_id: &str, status: BusStatus) -> Option<Bus> {
        self.apply(|buses| {
            buses.iter_mut().find(|b| b.bus_id == bus_id).map(|bus| {
                bus.status = status;
                bus.last_updated = Utc::now();
                bus.clone()
            })
        })
        .await
    }
}
