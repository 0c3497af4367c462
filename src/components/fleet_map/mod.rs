mod component;
mod hubs;
mod keyed;
mod render;
pub mod scale;
mod state;
mod timeline;
mod types;
mod vehicles;

pub use component::{FleetMapCanvas, now_ms};
pub use state::FleetScene;
pub use types::{Envelope, FleetSnapshot, Hub, Inconsistency, Movement};
