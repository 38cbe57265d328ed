//! Replay-buffered stream of scroll positions
//!
//! Every emitted position is kept. A subscriber that attaches late first
//! receives the full history, then live positions, and finally the closed
//! signal. Replay and live emission share one lock, so a subscriber can never
//! observe a gap or a reordering.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::error::ResolveError;

#[derive(Debug, Clone)]
enum Signal {
    Position(f64),
    Failed(ResolveError),
}

#[derive(Debug, Default)]
struct Channel {
    history: Vec<f64>,
    subscribers: Vec<UnboundedSender<Signal>>,
    closed: bool,
    error: Option<ResolveError>,
}

/// Multicast, unbounded-history position stream
///
/// Cloning yields another handle to the same stream.
#[derive(Debug, Clone, Default)]
pub struct PositionStream {
    shared: Arc<Mutex<Channel>>,
}

impl PositionStream {
    /// Create an open stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream that is already closed and will never emit
    pub fn closed() -> Self {
        let stream = Self::new();
        stream.close();
        stream
    }

    /// Create a closed stream carrying an error
    pub fn failed(error: ResolveError) -> Self {
        let stream = Self::new();
        {
            let mut channel = stream.lock();
            channel.error = Some(error);
            channel.closed = true;
        }
        stream
    }

    fn lock(&self) -> MutexGuard<'_, Channel> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Push a position to the history and every live subscriber
    ///
    /// Returns `false` without recording anything once the stream is closed.
    pub fn emit(&self, position: f64) -> bool {
        let mut channel = self.lock();
        if channel.closed {
            return false;
        }
        channel.history.push(position);
        channel
            .subscribers
            .retain(|tx| tx.send(Signal::Position(position)).is_ok());
        true
    }

    /// Close the stream, ending every subscription
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let mut channel = self.lock();
        if channel.closed {
            return false;
        }
        channel.closed = true;
        channel.subscribers.clear();
        true
    }

    /// Attach a subscriber, replaying everything emitted so far
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut channel = self.lock();
        for position in &channel.history {
            let _ = tx.send(Signal::Position(*position));
        }
        if channel.closed {
            if let Some(error) = &channel.error {
                let _ = tx.send(Signal::Failed(error.clone()));
            }
        } else {
            channel.subscribers.push(tx);
        }
        Subscription { rx }
    }

    /// Positions emitted so far
    pub fn history(&self) -> Vec<f64> {
        self.lock().history.clone()
    }

    /// Most recent position, if any
    pub fn last(&self) -> Option<f64> {
        self.lock().history.last().copied()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn error(&self) -> Option<ResolveError> {
        self.lock().error.clone()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

/// Receiving end of a [`PositionStream`]
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<Signal>,
}

impl Subscription {
    /// Wait for the next position
    ///
    /// Returns `None` once the stream is closed and fully drained.
    pub async fn recv(&mut self) -> Option<Result<f64, ResolveError>> {
        self.rx.recv().await.map(Self::into_item)
    }

    /// Take the next buffered position without waiting
    pub fn try_recv(&mut self) -> Option<Result<f64, ResolveError>> {
        match self.rx.try_recv() {
            Ok(signal) => Some(Self::into_item(signal)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Whether the stream has closed and every item has been taken
    pub fn is_finished(&self) -> bool {
        self.rx.is_closed() && self.rx.is_empty()
    }

    /// Everything currently buffered, or the stream's error if one is queued
    pub fn drain(&mut self) -> Result<Vec<f64>, ResolveError> {
        let mut positions = Vec::new();
        while let Some(item) = self.try_recv() {
            positions.push(item?);
        }
        Ok(positions)
    }

    /// Wait for the stream to close and return every position received
    pub async fn collect(mut self) -> Result<Vec<f64>, ResolveError> {
        let mut positions = Vec::new();
        while let Some(item) = self.recv().await {
            positions.push(item?);
        }
        Ok(positions)
    }

    fn into_item(signal: Signal) -> Result<f64, ResolveError> {
        match signal {
            Signal::Position(position) => Ok(position),
            Signal::Failed(error) => Err(error),
        }
    }
}
