//! The boundary between argument values and whatever moves them.
//!
//! The codec never touches bytes on a wire. A transport takes finished
//! [`Envelope`]s, turns them into frames with a [`Codec`], and hands
//! received envelopes back. [`ArgTransport`] is that boundary;
//! [`LoopbackTransport`] is an in-process implementation that queues
//! frames for the same process to read back.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use busarg_codec::{Codec, CodecError, JsonCodec};

use crate::Envelope;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Turning an envelope into a frame, or a frame back into an
    /// envelope, failed.
    #[error("bad frame: {0}")]
    Frame(#[source] CodecError),

    /// Another thread panicked while holding the frame queue.
    #[error("frame queue poisoned")]
    Poisoned,
}

/// Sends and receives envelopes.
///
/// Implementations must be usable from several threads at once; inbound
/// envelopes have no ordering guarantee relative to other threads.
pub trait ArgTransport: Send + Sync + 'static {
    /// Queues an envelope for delivery.
    ///
    /// # Errors
    /// [`TransportError::ConnectionClosed`] once closed, or
    /// [`TransportError::Frame`] if the envelope cannot be encoded.
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError>;

    /// Takes the next received envelope.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    /// [`TransportError::Frame`] if a received frame does not decode.
    fn recv(&self) -> Result<Option<Envelope>, TransportError>;
}

// ---------------------------------------------------------------------------
// LoopbackTransport
// ---------------------------------------------------------------------------

/// An [`ArgTransport`] whose sends are received by the same process.
///
/// Every envelope goes through the codec both ways, so what comes out of
/// [`recv`](ArgTransport::recv) is a freshly decoded and re-validated tree.
#[derive(Debug, Default)]
pub struct LoopbackTransport<C: Codec = JsonCodec> {
    codec: C,
    frames: Mutex<VecDeque<Vec<u8>>>,
    closed: AtomicBool,
}

impl LoopbackTransport<JsonCodec> {
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl<C: Codec> LoopbackTransport<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            frames: Mutex::new(VecDeque::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Stops accepting sends. Frames already queued can still be received.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::debug!("loopback transport closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of frames waiting to be received.
    ///
    /// # Errors
    /// [`TransportError::Poisoned`].
    pub fn pending(&self) -> Result<usize, TransportError> {
        let frames = self.frames.lock().map_err(|_| TransportError::Poisoned)?;
        Ok(frames.len())
    }

    /// Queues raw bytes as if they had arrived from a peer.
    ///
    /// # Errors
    /// [`TransportError::Poisoned`].
    pub fn inject(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.frames
            .lock()
            .map_err(|_| TransportError::Poisoned)?
            .push_back(frame);
        Ok(())
    }
}

impl<C: Codec> ArgTransport for LoopbackTransport<C> {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed(format!(
                "cannot send {} (seq {})",
                envelope.member, envelope.seq
            )));
        }
        let frame = self.codec.encode(envelope).map_err(TransportError::Frame)?;
        tracing::debug!(
            seq = envelope.seq,
            member = %envelope.member,
            bytes = frame.len(),
            "frame sent"
        );
        self.inject(frame)
    }

    fn recv(&self) -> Result<Option<Envelope>, TransportError> {
        let frame = self
            .frames
            .lock()
            .map_err(|_| TransportError::Poisoned)?
            .pop_front();
        let Some(frame) = frame else {
            return Ok(None);
        };
        let envelope: Envelope = self.codec.decode(&frame).map_err(TransportError::Frame)?;
        tracing::debug!(
            seq = envelope.seq,
            member = %envelope.member,
            bytes = frame.len(),
            "frame received"
        );
        Ok(Some(envelope))
    }
}
