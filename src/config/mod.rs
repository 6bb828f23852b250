mod env_overrides;
pub mod hot_reload;
mod loader;
pub mod schema;
#[cfg(test)]
pub(crate) mod test_env;

pub use hot_reload::ConfigHandle;
pub use schema::{
    ClickBudgetConfig, GateConfig, ObservabilityConfig, SessionConfig, SupabaseConfig,
    VersionGateConfig,
};
