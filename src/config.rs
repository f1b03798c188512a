//! Environment configuration for the binaries.
use envconfig::Envconfig;

/// Environment for the panel client.
#[derive(Envconfig)]
pub struct Environment {
    /// Base URL of the light service.
    #[envconfig(from = "LIGHT_URL", default = "http://127.0.0.1:4000")]
    pub light_url: String,

    /// Poll period in seconds.
    #[envconfig(from = "POLL_INTERVAL", default = "5")]
    pub poll_interval: u64,
}

impl Environment {
    /// Load the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable.
    pub fn load() -> Result<Self, envconfig::Error> {
        Self::init_from_env()
    }
}

/// Environment for the light service.
#[derive(Envconfig)]
pub struct ServerEnvironment {
    /// Address the HTTP listener binds to.
    #[envconfig(from = "HTTP_LISTENER_ADDRESS", default = "127.0.0.1:4000")]
    pub http_listener_address: String,
}

impl ServerEnvironment {
    /// Load the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable.
    pub fn load() -> Result<Self, envconfig::Error> {
        Self::init_from_env()
    }
}
