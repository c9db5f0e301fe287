use crate::domain::amount::Amount;
use crate::domain::message::{ActorName, Message};
use crate::domain::order::{LogEntry, OrderId, OrderStatus};
use crate::domain::ports::{AuditStoreBox, TransferExecutorBox};
use crate::error::{BridgeError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, Span, debug, error, info, warn};

pub const ORDER_RECEIVED: &str = "order received as message";
pub const INVALID_MESSAGE: &str = "invalid message";
pub const CAST_FAILED: &str = "failed to cast amount";
pub const BRIDGE_FAILED: &str = "bridge failed";
pub const BRIDGED: &str = "successfully bridged";

/// Settlement actor for the destination side of the relay.
///
/// `Bridge` consumes messages one at a time and drives each one to a terminal
/// order status: it validates the message, converts the raw amount, sends the
/// transfer through the wallet and records every step in the audit store.
///
/// Validation, conversion and transfer failures are recorded and the order is
/// marked `FAILED`; the loop then waits for the next message. Any audit store
/// failure stops the loop and is returned by [`Bridge::run`].
pub struct Bridge {
    actor: ActorName,
    wallet: TransferExecutorBox,
    db: AuditStoreBox,
    inbox: mpsc::Receiver<Message>,
    shutdown: watch::Receiver<bool>,
    span: Span,
}

impl Bridge {
    /// Creates a bridge reading from `inbox` and stopping once `shutdown`
    /// turns `true`.
    ///
    /// Events are emitted in a `bridge` span tagged with the actor name; use
    /// [`Bridge::with_span`] to supply another one.
    ///
    /// # Arguments
    ///
    /// * `actor` - The relay side this bridge settles for. Messages addressed
    ///   elsewhere are rejected.
    /// * `wallet` - Executes transfers. Released once when the bridge stops.
    /// * `db` - Audit log and order status store. Any failure is fatal.
    /// * `inbox` - Messages to settle, consumed in delivery order.
    /// * `shutdown` - Cancellation signal, observed between messages.
    pub fn new(
        actor: ActorName,
        wallet: TransferExecutorBox,
        db: AuditStoreBox,
        inbox: mpsc::Receiver<Message>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let span = tracing::info_span!("bridge", actor = %actor);
        Self {
            actor,
            wallet,
            db,
            inbox,
            shutdown,
            span,
        }
    }

    /// Creates a bridge together with the handle used to feed and stop it.
    ///
    /// # Arguments
    ///
    /// * `actor` - The relay side this bridge settles for.
    /// * `wallet` - Executes transfers.
    /// * `db` - Audit log and order status store.
    /// * `capacity` - Bound of the inbox; [`BridgeHandle::send`] waits when it
    ///   is full.
    pub fn channel(
        actor: ActorName,
        wallet: TransferExecutorBox,
        db: AuditStoreBox,
        capacity: usize,
    ) -> (Self, BridgeHandle) {
        let (messages, inbox) = mpsc::channel(capacity);
        let (cancel, shutdown) = watch::channel(false);
        let bridge = Self::new(actor, wallet, db, inbox, shutdown);
        let handle = BridgeHandle {
            messages,
            cancel: CancelHandle(Arc::new(cancel)),
        };
        (bridge, handle)
    }

    /// Replaces the span all bridge events are emitted in.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Runs the actor until cancellation, inbox closure or a fatal audit
    /// store error.
    ///
    /// Cancellation is only observed between messages. When a message and the
    /// cancellation signal are ready at the same time either may be picked.
    pub async fn run(mut self) -> Result<()> {
        let span = self.span.clone();
        async move {
            info!("starting bridge");
            let mut cancellable = true;
            loop {
                tokio::select! {
                    changed = self.shutdown.changed(), if cancellable => {
                        if changed.is_err() {
                            debug!("cancellation sender dropped");
                            cancellable = false;
                            continue;
                        }
                        if *self.shutdown.borrow() {
                            info!("stopping bridge");
                            self.wallet.release().await;
                            return Ok(());
                        }
                    }
                    msg = self.inbox.recv() => {
                        let Some(msg) = msg else {
                            info!("inbox closed, stopping bridge");
                            self.wallet.release().await;
                            return Ok(());
                        };
                        let order_id = msg.payload.id.clone();
                        if let Err(err) = self.process_message(msg).await {
                            error!(%order_id, %err, "error while processing message in bridge");
                            return Err(err);
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process_message(&self, msg: Message) -> Result<()> {
        let order_id = msg.payload.id.clone();
        info!(%order_id, "new message received for process");

        self.append(self.entry(&order_id, ORDER_RECEIVED), None)
            .await?;

        if let Err(err) = msg.validate(&self.actor) {
            warn!(%order_id, %err, "received an invalid message");
            return self.fail(&order_id, INVALID_MESSAGE, err.to_string()).await;
        }

        let payload = &msg.payload;
        let amount = match Amount::try_from(payload.raw_amount) {
            Ok(amount) => amount,
            Err(err) => {
                warn!(%order_id, %err, raw_amount = %payload.raw_amount, "failed to cast amount");
                return self.fail(&order_id, CAST_FAILED, err.to_string()).await;
            }
        };

        let memo = msg.memo();
        match self.wallet.transfer(&payload.receiver, &memo, amount).await {
            Ok(tx_id) => {
                info!(%order_id, %tx_id, "successful bridge");
                self.append(self.entry(&order_id, BRIDGED).with_trace(&tx_id), None)
                    .await?;
                self.set_status(&order_id, OrderStatus::Complete, None)
                    .await
            }
            Err(err) => {
                error!(%order_id, %err, receiver = %payload.receiver, %amount, "can't send transaction to pactus network");
                self.fail(&order_id, BRIDGE_FAILED, err.to_string()).await
            }
        }
    }

    /// Records a non-fatal failure and marks the order `FAILED`.
    async fn fail(&self, order_id: &OrderId, description: &str, cause: String) -> Result<()> {
        let entry = self.entry(order_id, description).with_trace(cause.as_str());
        self.append(entry, Some(&cause)).await?;
        self.set_status(order_id, OrderStatus::Failed, Some(&cause))
            .await
    }

    fn entry(&self, order_id: &OrderId, description: &str) -> LogEntry {
        LogEntry::new(order_id.clone(), self.actor.as_str(), description)
    }

    async fn append(&self, entry: LogEntry, while_handling: Option<&str>) -> Result<()> {
        let order_id = entry.order_id.clone();
        self.db
            .add_log(entry)
            .await
            .map_err(|source| BridgeError::Persistence {
                order_id,
                source,
                while_handling: while_handling.map(str::to_owned),
            })
    }

    async fn set_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        while_handling: Option<&str>,
    ) -> Result<()> {
        self.db
            .update_order_status(order_id, status)
            .await
            .map_err(|source| BridgeError::Persistence {
                order_id: order_id.clone(),
                source,
                while_handling: while_handling.map(str::to_owned),
            })
    }
}

/// Stops a running bridge. Cloneable; cancelling more than once is a no-op.
#[derive(Clone, Debug)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Sending side of a bridge created with [`Bridge::channel`].
pub struct BridgeHandle {
    messages: mpsc::Sender<Message>,
    cancel: CancelHandle,
}

impl BridgeHandle {
    /// Enqueues a message, waiting for inbox capacity.
    pub async fn send(&self, message: Message) -> Result<()> {
        self.messages
            .send(message)
            .await
            .map_err(|_| BridgeError::InboxClosed)
    }

    pub fn canceller(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Signals cancellation. The bridge stops before its next message.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Closes the inbox. The bridge drains queued messages, then stops.
    pub fn close(self) -> CancelHandle {
        self.cancel
    }
}
