pub mod boiler;
pub mod boiler_catalog;
pub mod heat_pump;
