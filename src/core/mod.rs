pub mod building;
pub mod building_manager;
pub mod meter_reading;
