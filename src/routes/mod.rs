pub mod analyze_route;
pub mod default_route;
pub mod export_route;
