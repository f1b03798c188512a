#![warn(missing_docs)]
//! Watch and control a smart light over its REST interface.

pub mod api;
pub mod config;
pub mod panel;
pub mod pipes;
pub mod server;
pub mod ui;

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::debug;

pub(crate) const PIPE_SIZE: usize = 10;

/// Spawn a named task and log when it finishes.
pub fn spawn<T>(name: &str, future: T) -> JoinHandle<()>
where
    T: Future<Output = ()> + Send + 'static,
{
    let name = name.to_string();

    tokio::spawn(async move {
        future.await;
        debug!("{name}: task finished");
    })
}
