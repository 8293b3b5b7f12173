pub mod app_config;
pub mod config;
pub mod result;
pub mod status;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use result::{AnalysisResult, HighlightItem, PropertyDetails, Recommendation, RiskItem};
pub use status::AnalysisStatus;
