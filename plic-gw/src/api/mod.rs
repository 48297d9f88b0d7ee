//! HTTP API handlers for plic-gw

pub mod analyze;
pub mod buildinfo;
pub mod catalog;
pub mod health;
pub mod ui;

pub use analyze::analysis_routes;
pub use buildinfo::get_build_info;
pub use catalog::get_catalog;
pub use health::health_routes;
pub use ui::ui_routes;
