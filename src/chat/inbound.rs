//! The inbound path: messages arriving from the platform.
//!
//! [`inbound_events`] watches the session's current channel and turns new
//! messages into a stream of [`InboundEvent`]s.  [`spawn_poller`] drives that
//! stream on its own task and feeds a queue; [`spawn_printer`] drains the
//! queue onto the shared [`Console`].  Neither task touches the session's
//! context; they only see the channel id it publishes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::chat::console::Console;
use crate::chat::notify::Notifier;
use crate::observability::{INBOUND_EVENTS, INBOUND_POLL_ERRORS, NOTIFY_ERRORS};
use crate::transport::{MESSAGE_FETCH_LIMIT, Transport};
use crate::types::{Message, snowflake_cmp};

/// Capacity of the queue between the poller and the printer.
pub const EVENT_QUEUE_DEPTH: usize = 256;

/// Something that arrived for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Recent history shown when a channel is selected.
    Backlog(Message),
    /// A message posted since the channel was selected.
    Message(Message),
}

impl InboundEvent {
    /// Returns the message carried by the event.
    pub fn message(&self) -> &Message {
        match self {
            InboundEvent::Backlog(message) | InboundEvent::Message(message) => message,
        }
    }
}

struct PollState<T: Transport + ?Sized> {
    transport: Arc<T>,
    channel_rx: watch::Receiver<Option<String>>,
    channel: Option<String>,
    cursor: Option<String>,
    synced: bool,
    started: bool,
    pending: VecDeque<InboundEvent>,
    ticker: Interval,
    backlog: u8,
}

impl<T: Transport + ?Sized> PollState<T> {
    async fn switch_to(&mut self, channel: Option<String>) {
        self.channel = channel;
        self.cursor = None;
        self.synced = false;
        self.pending.clear();
        self.sync().await;
    }

    async fn sync(&mut self) {
        let Some(channel) = self.channel.clone() else {
            return;
        };
        let limit = self.backlog.max(1);
        match self.transport.fetch_messages(&channel, None, limit).await {
            Ok(mut messages) => {
                messages.sort_by(|a, b| snowflake_cmp(&a.id, &b.id));
                self.cursor = messages.last().map(|m| m.id.clone());
                self.synced = true;
                let skip = messages.len().saturating_sub(usize::from(self.backlog));
                self.pending
                    .extend(messages.into_iter().skip(skip).map(InboundEvent::Backlog));
            }
            Err(err) => {
                INBOUND_POLL_ERRORS.click();
                tracing::warn!(%err, %channel, "could not load channel history");
            }
        }
    }

    async fn poll(&mut self) {
        if !self.synced {
            self.sync().await;
            return;
        }
        let Some(channel) = self.channel.clone() else {
            return;
        };
        let fetched = self
            .transport
            .fetch_messages(&channel, self.cursor.as_deref(), MESSAGE_FETCH_LIMIT)
            .await;
        match fetched {
            Ok(mut messages) => {
                messages.sort_by(|a, b| snowflake_cmp(&a.id, &b.id));
                if let Some(last) = messages.last() {
                    self.cursor = Some(last.id.clone());
                }
                self.pending
                    .extend(messages.into_iter().map(InboundEvent::Message));
            }
            Err(err) => {
                INBOUND_POLL_ERRORS.click();
                tracing::warn!(%err, %channel, "could not poll channel");
            }
        }
    }
}

/// Streams messages posted to whichever channel `channel_rx` names.
///
/// When the channel changes, up to `backlog` recent messages are yielded as
/// [`InboundEvent::Backlog`], oldest first.  After that the channel is polled
/// every `interval` for newer messages.  The stream ends when the sender
/// side of `channel_rx` is dropped.
pub fn inbound_events<T: Transport + ?Sized + 'static>(
    transport: Arc<T>,
    channel_rx: watch::Receiver<Option<String>>,
    backlog: u8,
    interval: Duration,
) -> impl Stream<Item = InboundEvent> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let state = PollState {
        transport,
        channel_rx,
        channel: None,
        cursor: None,
        synced: false,
        started: false,
        pending: VecDeque::new(),
        ticker,
        backlog,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                INBOUND_EVENTS.click();
                return Some((event, state));
            }

            if !state.started {
                state.started = true;
                let channel = state.channel_rx.borrow_and_update().clone();
                state.switch_to(channel).await;
                // The first tick fires immediately; the sync above stands in for it.
                state.ticker.reset();
                continue;
            }

            tokio::select! {
                changed = state.channel_rx.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    let channel = state.channel_rx.borrow_and_update().clone();
                    state.switch_to(channel).await;
                    state.ticker.reset();
                }
                _ = state.ticker.tick() => {
                    state.poll().await;
                }
            }
        }
    })
}

/// Runs [`inbound_events`] on its own task, forwarding into `events`.
///
/// The task ends when the channel sender or the event receiver goes away.
pub fn spawn_poller<T: Transport + ?Sized + 'static>(
    transport: Arc<T>,
    channel_rx: watch::Receiver<Option<String>>,
    backlog: u8,
    interval: Duration,
    events: mpsc::Sender<InboundEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let stream = inbound_events(transport, channel_rx, backlog, interval);
        futures::pin_mut!(stream);
        while let Some(event) = stream.next().await {
            if events.send(event).await.is_err() {
                break;
            }
        }
    })
}

/// Prints every queued event; notifies about new messages from other users.
pub fn spawn_printer(
    mut events: mpsc::Receiver<InboundEvent>,
    console: Console,
    notifier: Option<Notifier>,
    self_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            console.print_message(event.message());
            if let (InboundEvent::Message(message), Some(notifier)) = (&event, &notifier)
                && message.author.id != self_id
                && let Err(err) = notifier.notify(message)
            {
                NOTIFY_ERRORS.click();
                tracing::warn!(%err, "notification failed");
            }
        }
    })
}
