//! # Server Configuration
//!
//! Configuration for the server binary. The library core consumes no
//! environment variables; everything environmental is read here, once,
//! at startup.

/// Configuration for the API server process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the listener binds, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `INTAKE_BIND_ADDR` overrides the default bind address.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("INTAKE_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:8080".to_string() }
    }
}
