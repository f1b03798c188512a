//! Stateful pipe carrying the latest panel state to subscribers.

use thiserror::Error;
use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::error;

use crate::spawn;
use crate::PIPE_SIZE;

enum SendMessage<T> {
    Set(T),
}

enum ReceiveMessage<T> {
    Get(oneshot::Sender<Option<T>>),
    Subscribe(oneshot::Sender<(broadcast::Receiver<T>, Option<T>)>),
}

/// Send a value to an entity.
#[derive(Clone)]
pub struct Sender<T> {
    name: String,
    tx: mpsc::Sender<SendMessage<T>>,
}

impl<T: Send> Sender<T> {
    /// Send data to the entity or fail if the buffer is full.
    pub fn try_send(&self, data: T) {
        let msg = SendMessage::Set(data);
        if let Err(err) = self.tx.try_send(msg) {
            error!("{}: send failed: {}", self.name, err);
        }
    }
}

/// Receive a value from an entity.
#[derive(Clone)]
pub struct Receiver<T> {
    name: String,
    tx: mpsc::Sender<ReceiveMessage<T>>,
}

impl<T: Send + Clone> Receiver<T> {
    /// Retrieve the most recent value from the entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity is disconnected.
    pub async fn get(&self) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        let msg = ReceiveMessage::Get(tx);
        if let Err(err) = self.tx.send(msg).await {
            error!("{}: get/send failed: {}", self.name, err);
            panic!("get failed");
        };
        if let Ok(v) = rx.await {
            v
        } else {
            error!("{}: get/await failed", self.name);
            panic!("get failed");
        }
    }

    /// Subscribe to this entity.
    ///
    /// The subscription yields the current value first, then every change.
    ///
    /// # Panics
    ///
    /// Panics if the entity is disconnected.
    pub async fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = oneshot::channel();
        let msg = ReceiveMessage::Subscribe(tx);
        if let Err(err) = self.tx.send(msg).await {
            error!("{}: subscribe/send failed: {}", self.name, err);
            panic!("subscribe failed");
        };
        if let Ok((rx, initial)) = rx.await {
            Subscription { rx, initial }
        } else {
            error!("{}: subscribe/await failed", self.name);
            panic!("subscribe failed");
        }
    }
}

/// Something went wrong in Receiver.
#[derive(Error, Debug)]
pub enum RecvError {
    /// The pipe was closed.
    #[error("The pipe was closed")]
    Closed,
}

/// A subscription to receive data from an entity.
pub struct Subscription<T> {
    rx: broadcast::Receiver<T>,
    initial: Option<T>,
}

impl<T: Send + Clone> Subscription<T> {
    /// Wait for the next value from the entity.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Closed` if the entity is closed.
    pub async fn recv(&mut self) -> Result<T, RecvError> {
        let initial = self.initial.take();
        if let Some(initial) = initial {
            return Ok(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(v) => return Ok(v),
                Err(err) => match err {
                    broadcast::error::RecvError::Closed => return Err(RecvError::Closed),
                    broadcast::error::RecvError::Lagged(_) => {
                        error!("recv failed: The pipe was lagged");
                    }
                },
            }
        }
    }

    /// Get the next value but don't wait for it. Returns `None` if there is no value.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Closed` if the entity is closed.
    pub fn try_recv(&mut self) -> Result<Option<T>, RecvError> {
        let initial = self.initial.take();
        if let Some(initial) = initial {
            return Ok(Some(initial));
        }
        loop {
            match self.rx.try_recv() {
                Ok(v) => return Ok(Some(v)),
                Err(err) => match err {
                    broadcast::error::TryRecvError::Closed => {
                        return Err(RecvError::Closed);
                    }
                    broadcast::error::TryRecvError::Empty => return Ok(None),
                    broadcast::error::TryRecvError::Lagged(_) => {
                        error!("try_recv failed: The pipe was lagged");
                    }
                },
            }
        }
    }
}

/// Create a stateful entity that only produces messages when there is a change.
///
/// The entity lives as long as its [`Sender`]; once every sender is dropped
/// pending subscriptions see `RecvError::Closed`.
#[must_use]
pub fn create_stateful_entity<T: Clone + Eq + Send + 'static>(
    name: &str,
) -> (Sender<T>, Receiver<T>) {
    let (send_tx, mut send_rx) = mpsc::channel::<SendMessage<T>>(PIPE_SIZE);
    let (receive_tx, mut receive_rx) = mpsc::channel::<ReceiveMessage<T>>(PIPE_SIZE);
    let (out_tx, out_rx) = broadcast::channel::<T>(PIPE_SIZE);

    drop(out_rx);

    let name = name.to_string();

    let sender = Sender {
        tx: send_tx,
        name: name.clone(),
    };
    let receiver = Receiver {
        tx: receive_tx,
        name: name.clone(),
    };

    let task_name = name.clone();
    spawn(&task_name, async move {
        let mut saved_data: Option<T> = None;

        loop {
            select! {
                msg = send_rx.recv() => {
                    match msg {
                        Some(SendMessage::Set(data)) => {
                            let changed = match saved_data {
                                Some(ref saved_data) => data != *saved_data,
                                None => true,
                            };
                            if changed {
                                saved_data = Some(data.clone());
                                if let Err(err) = out_tx.send(data) {
                                    // It is not an error if there are no subscribers.
                                    debug!("{name}: send to broadcast failed: {err} (not an error)");
                                }
                            };
                        }
                        None => {
                            debug!("{name}: all senders closed");
                            break;
                        }
                    }
                }
                Some(msg) = receive_rx.recv() => {
                    match msg {
                        ReceiveMessage::Get(tx) => {
                            if tx.send(saved_data.clone()).is_err() {
                                error!("{name}: get send failed");
                            };
                        }
                        ReceiveMessage::Subscribe(tx) => {
                            let rx = out_tx.subscribe();
                            if tx.send((rx, saved_data.clone())).is_err() {
                                error!("{name}: subscribe send failed");
                            };
                        }
                    }
                }
            }
        }
    });

    (sender, receiver)
}
