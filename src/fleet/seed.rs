use chrono::Utc;

use crate::fleet::{Bus, BusStatus, Route, Stop};

/// Built-in demonstration fleet: three Bengaluru routes and five buses
/// spread over them. Stands in for a provisioning feed.
pub fn sample_fleet() -> (Vec<Bus>, Vec<Route>) {
    let routes = vec![
        route(
            "R1",
            "42A",
            "Majestic - Whitefield",
            "#2563eb",
            &[
                ("S1", "Majestic", 12.9767, 77.5713),
                ("S2", "Cubbon Park", 12.9763, 77.5929),
                ("S3", "Indiranagar", 12.9784, 77.6408),
                ("S4", "Marathahalli", 12.9591, 77.6974),
                ("S5", "Whitefield", 12.9698, 77.7500),
            ],
        ),
        route(
            "R2",
            "201K",
            "Shivajinagar - Electronic City",
            "#16a34a",
            &[
                ("S6", "Shivajinagar", 12.9857, 77.6057),
                ("S7", "Richmond Circle", 12.9591, 77.5937),
                ("S8", "BTM Layout", 12.9166, 77.6101),
                ("S9", "Electronic City", 12.8452, 77.6602),
            ],
        ),
        route(
            "R3",
            "500D",
            "Hebbal - Banashankari",
            "#dc2626",
            &[
                ("S10", "Hebbal", 13.0358, 77.5970),
                ("S11", "Mekhri Circle", 13.0068, 77.5813),
                ("S12", "Chickpet", 12.9698, 77.5776),
                ("S13", "Banashankari", 12.9250, 77.5731),
            ],
        ),
    ];

    let buses = vec![
        bus("BUS001", "42A", "DRV01", "Manjunath K", BusStatus::Running, 40, 23, 12.9767, 77.5713, 32.0),
        bus("BUS002", "42A", "DRV02", "Ravi Kumar", BusStatus::Delayed, 40, 35, 12.9784, 77.6408, 18.0),
        bus("BUS003", "201K", "DRV03", "Suresh Babu", BusStatus::Running, 50, 41, 12.9591, 77.5937, 27.0),
        bus("BUS004", "500D", "DRV04", "Lakshmi N", BusStatus::Maintenance, 40, 0, 13.0358, 77.5970, 0.0),
        bus("BUS005", "500D", "DRV05", "Imran Pasha", BusStatus::Running, 36, 12, 12.9698, 77.5776, 41.0),
    ];

    (buses, routes)
}

fn route(
    route_id: &str,
    route_number: &str,
    route_name: &str,
    color: &str,
    stops: &[(&str, &str, f64, f64)],
) -> Route {
    Route {
        route_id: route_id.into(),
        route_number: route_number.into(),
        route_name: route_name.into(),
        stops: stops
            .iter()
            .enumerate()
            .map(|(i, (stop_id, name, latitude, longitude))| Stop {
                stop_id: (*stop_id).into(),
                name: (*name).into(),
                latitude: *latitude,
                longitude: *longitude,
                order: i as u32,
            })
            .collect(),
        color: color.into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn bus(
    bus_id: &str,
    route_number: &str,
    driver_id: &str,
    driver_name: &str,
    status: BusStatus,
    capacity: usize,
    occupancy: usize,
    latitude: f64,
    longitude: f64,
    speed: f64,
) -> Bus {
    Bus {
        bus_id: bus_id.into(),
        route_number: route_number.into(),
        driver_id: driver_id.into(),
        driver_name: driver_name.into(),
        status,
        capacity,
        occupancy,
        latitude,
        longitude,
        speed,
        last_updated: Utc::now(),
    }
}
