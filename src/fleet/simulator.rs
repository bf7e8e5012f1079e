use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;

use crate::fleet::{Bus, FleetStore};

/// How often positions are refreshed unless overridden.
pub const TICK_INTERVAL: Duration = Duration::from_secs(3);

/// Buses never report faster than city traffic allows.
pub const MAX_SPEED_KMH: f64 = 60.0;

const POSITION_JITTER_DEG: f64 = 0.001;
const SPEED_JITTER_KMH: f64 = 5.0;

/// One simulated GPS reading: nudge position and speed, stamp the time.
/// Buses that are not moving are left untouched.
pub fn jitter(bus: &mut Bus, rng: &mut impl Rng) {
    if !bus.status.is_moving() {
        return;
    }

    bus.latitude += rng.gen_range(-POSITION_JITTER_DEG..POSITION_JITTER_DEG);
    bus.longitude += rng.gen_range(-POSITION_JITTER_DEG..POSITION_JITTER_DEG);

    let delta = rng.gen_range(-SPEED_JITTER_KMH..SPEED_JITTER_KMH).floor();
    bus.speed = (bus.speed + delta).clamp(0.0, MAX_SPEED_KMH);
    bus.last_updated = Utc::now();
}

/// Runs forever, perturbing every moving bus once per tick. Purely cosmetic;
/// spawn it and forget it.
pub async fn run(store: Arc<FleetStore>, tick: Duration) {
    let mut ticker = tokio::time::interval(tick);
    loop {
        ticker.tick().await;
        store
            .apply(|buses| {
                let mut rng = rand::thread_rng();
                for bus in buses {
                    jitter(bus, &mut rng);
                }
            })
            .await;
        tracing::trace!("fleet positions updated");
    }
}
