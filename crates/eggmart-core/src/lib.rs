use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod order_number;
pub mod orders;
pub mod pricing;
pub mod ratings;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use order_number::generate_order_number;
pub use orders::{DeliveryMethod, OrderStatus, Role, SaleStatus};
pub use pricing::FeeSchedule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
