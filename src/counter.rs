mod config;
mod direction;
mod identity;
mod line_counter;
mod tracked;

pub use config::{CounterConfig, DEFAULT_STALE_AFTER};
pub use direction::{Crossing, Direction};
pub use identity::{DEFAULT_CELL_SIZE, GridResolver, IdentityResolver, VehicleKey};
pub use line_counter::{CountResult, LineCounter};
pub use tracked::TrackedVehicle;
