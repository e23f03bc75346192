//! Channel-backed event sink
//!
//! Bridges an invocation to a transport: the chain writes into a
//! [`ChannelSink`], the transport consumes the paired stream.
//!
//! ```rust,ignore
//! let (sink, mut events) = event_channel();
//! let handle = tokio::spawn(async move { chain.invoke_streaming(request, &sink).await });
//! while let Some(event) = events.next().await {
//!     socket.send(serde_json::to_string(&event)?).await?;
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! ```

use convqa_kernel::{EventSink, StreamEvent};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Event sink writing into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }

    /// Whether the consuming side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: StreamEvent) {
        // A disconnected client drops the rest of the sequence
        let _ = self.tx.send(event);
    }
}

/// Create a sink and the stream of events written to it.
pub fn event_channel() -> (ChannelSink, UnboundedReceiverStream<StreamEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink::new(tx), UnboundedReceiverStream::new(rx))
}
