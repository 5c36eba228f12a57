//! Configuration loading and management

mod doctor_config;
mod hierarchical_loader;

pub use doctor_config::{
    CoreConfig, DatabaseConfig, DoctorConfig, ReportConfig, SiteConfig, UninstallConfig,
};
pub use hierarchical_loader::HierarchicalConfigLoader;
