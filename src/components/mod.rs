pub mod fleet_map;
pub mod inconsistency_panel;
