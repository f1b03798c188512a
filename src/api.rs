//! Client for the light service REST endpoints.
use lightwatch_common::status::SystemStatus;

/// Where the light service lives.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the light service, without a trailing slash.
    pub base_url: String,
}

/// Read the current status of the light.
///
/// Any transport failure, non-2xx response or malformed payload is an error.
pub async fn get_status(config: &Config) -> Result<SystemStatus, reqwest::Error> {
    let url = format!("{}/api/system/status", config.base_url);

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await?;

    response.error_for_status()?.json().await
}

/// Flip the power state of the light. The response body is ignored.
pub async fn toggle(config: &Config) -> Result<(), reqwest::Error> {
    let url = format!("{}/api/system/toggle", config.base_url);

    let client = reqwest::Client::new();
    let response = client.post(url).send().await?;

    response.error_for_status()?;
    Ok(())
}
