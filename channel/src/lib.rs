use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::time::Duration;

pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Senders block while `capacity` events are waiting.
    Bounded,
    Unbounded,
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub kind: ChannelKind,
    pub capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            kind: ChannelKind::Bounded,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ChannelConfig {
    pub fn bounded(capacity: usize) -> Self {
        Self {
            kind: ChannelKind::Bounded,
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            kind: ChannelKind::Unbounded,
            capacity: 0,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ChannelError {
    #[error("send failed: receiver disconnected")]
    SendFailed,
    #[error("channel is full")]
    Full,
    #[error("receive failed: all senders disconnected")]
    RecvFailed,
}

/// Anything events can be pushed into.
pub trait EventSink<T>: Send {
    fn send(&self, value: T) -> Result<(), ChannelError>;
}

#[derive(Debug)]
enum SenderInner<T> {
    Bounded(SyncSender<T>),
    Unbounded(Sender<T>),
}

impl<T> Clone for SenderInner<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Bounded(tx) => Self::Bounded(tx.clone()),
            Self::Unbounded(tx) => Self::Unbounded(tx.clone()),
        }
    }
}

#[derive(Debug)]
pub struct EventSender<T> {
    inner: SenderInner<T>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> EventSender<T> {
    /// Non-blocking send; a full bounded channel reports [`ChannelError::Full`].
    pub fn try_send(&self, value: T) -> Result<(), ChannelError> {
        match &self.inner {
            SenderInner::Bounded(tx) => tx.try_send(value).map_err(|err| match err {
                mpsc::TrySendError::Full(_) => ChannelError::Full,
                mpsc::TrySendError::Disconnected(_) => ChannelError::SendFailed,
            }),
            SenderInner::Unbounded(tx) => tx.send(value).map_err(|_| ChannelError::SendFailed),
        }
    }
}

impl<T: Send> EventSink<T> for EventSender<T> {
    fn send(&self, value: T) -> Result<(), ChannelError> {
        match &self.inner {
            SenderInner::Bounded(tx) => tx.send(value).map_err(|_| ChannelError::SendFailed),
            SenderInner::Unbounded(tx) => tx.send(value).map_err(|_| ChannelError::SendFailed),
        }
    }
}

#[derive(Debug)]
pub struct EventReceiver<T> {
    receiver: Receiver<T>,
}

impl<T> EventReceiver<T> {
    pub fn try_recv(&self) -> Result<Option<T>, ChannelError> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ChannelError::RecvFailed),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>, ChannelError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Ok(Some(value)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ChannelError::RecvFailed),
        }
    }

    /// Everything currently queued, oldest first. Stops quietly on disconnect.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

pub fn event_channel<T>(config: &ChannelConfig) -> (EventSender<T>, EventReceiver<T>) {
    match config.kind {
        ChannelKind::Bounded => {
            let capacity = config.capacity.max(1);
            let (tx, rx) = mpsc::sync_channel(capacity);
            (
                EventSender {
                    inner: SenderInner::Bounded(tx),
                },
                EventReceiver { receiver: rx },
            )
        }
        ChannelKind::Unbounded => {
            let (tx, rx) = mpsc::channel();
            (
                EventSender {
                    inner: SenderInner::Unbounded(tx),
                },
                EventReceiver { receiver: rx },
            )
        }
    }
}

/// Sends and logs instead of failing; for notifications nobody may be listening to.
pub fn send_or_log<T, S: EventSink<T> + ?Sized>(sink: &S, value: T, what: &str) {
    if let Err(err) = sink.send(value) {
        log::debug!("dropping {what} notification: {err}");
    }
}
