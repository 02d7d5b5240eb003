// src/scanner/mod.rs
//! Live QR-scan channel.
//!
//! Camera frames arrive on a producer path (the camera pipeline is an
//! external collaborator) while verification runs on a consumer path. The
//! shared state between them is exactly one mutable slot holding the most
//! recently decoded payload, guarded by a mutex. The discipline is
//! check-and-clear: a decode must be consumed and cleared under the lock
//! before any further decode is accepted, so no stale or duplicate
//! verification can fire and no decode is silently overwritten.

use crate::error::CertError;
use crate::models::certificate::VerificationResult;
use crate::services::verifier::Verifier;
use std::sync::{Arc, Mutex};

/// Decodes a QR payload from a single grayscale camera frame.
///
/// Returns the payload of the first QR code found, or `None` if the frame
/// contains no decodable code.
pub fn decode_frame(frame: &image::GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare(frame.clone());
    let grids = prepared.detect_grids();
    let grid = grids.first()?;
    match grid.decode() {
        Ok((_meta, payload)) if !payload.is_empty() => Some(payload),
        _ => None,
    }
}

/// States of the live-scan channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No scan in progress
    Idle,
    /// Waiting for a frame to produce a non-empty decode
    Scanning,
    /// A payload has been taken from the slot, verification pending
    Decoded,
    /// Verification invoked exactly once for the taken payload
    Resolved,
}

/// Single-slot mailbox for the most recently decoded QR payload.
///
/// `publish` and `take` both hold the same lock, making the check-and-clear
/// atomic: a torn read between the producer writing a new decode and the
/// consumer reading it is impossible.
#[derive(Default)]
pub struct DecodeSlot {
    slot: Mutex<Option<String>>,
}

impl DecodeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a decoded payload to the consumer.
    ///
    /// Empty payloads are ignored. A payload is accepted only while the
    /// slot is empty; while a previous decode awaits consumption the offer
    /// is rejected and `false` is returned, so the producer can re-offer on
    /// a later frame instead of overwriting an unconsumed decode.
    pub fn publish(&self, payload: &str) -> bool {
        if payload.is_empty() {
            return false;
        }
        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            return false;
        }
        *slot = Some(payload.to_string());
        true
    }

    /// Atomically takes and clears the pending payload, if any.
    pub fn take(&self) -> Option<String> {
        self.slot.lock().unwrap().take()
    }

    /// Whether a decode is currently awaiting consumption.
    pub fn is_occupied(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}

/// Consumer side of the live-scan channel.
///
/// Drives `Idle -> Scanning -> Decoded -> Resolved` and resets to `Idle`
/// after each detection: one decode triggers exactly one verification
/// attempt, never a continuous stream of verifications.
pub struct LiveScanner {
    slot: Arc<DecodeSlot>,
    verifier: Arc<Verifier>,
    state: ScanState,
}

impl LiveScanner {
    pub fn new(slot: Arc<DecodeSlot>, verifier: Arc<Verifier>) -> Self {
        Self {
            slot,
            verifier,
            state: ScanState::Idle,
        }
    }

    /// Current state of the channel.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Begins a scan; the channel stays in `Scanning` until a non-empty
    /// decode arrives in the slot.
    pub fn start(&mut self) {
        self.state = ScanState::Scanning;
    }

    /// Producer entry point: decodes one frame and offers any payload to
    /// the slot. Returns whether a payload was accepted.
    pub fn on_frame(&self, frame: &image::GrayImage) -> bool {
        match decode_frame(frame) {
            Some(payload) => self.slot.publish(&payload),
            None => false,
        }
    }

    /// Consumer step: if a decode is pending, verifies it exactly once and
    /// resets to `Idle` for the next scan.
    ///
    /// Returns `Ok(None)` while no decode has arrived. A ledger failure
    /// still consumes the payload and resets the channel; each scan fails
    /// independently.
    pub async fn poll(&mut self) -> Result<Option<VerificationResult>, CertError> {
        if self.state != ScanState::Scanning {
            return Ok(None);
        }
        let Some(payload) = self.slot.take() else {
            return Ok(None);
        };

        self.state = ScanState::Decoded;
        let outcome = self.verifier.verify(&payload).await;
        self.state = ScanState::Resolved;

        // Single-shot per detection: back to Idle regardless of outcome.
        self.state = ScanState::Idle;
        outcome.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_fields, MockLedger};
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;
    use std::thread;

    #[test]
    fn test_publish_take_is_check_and_clear() {
        let slot = DecodeSlot::new();
        assert!(slot.publish("payload-a"));
        assert!(slot.is_occupied());
        assert_eq!(slot.take().as_deref(), Some("payload-a"));
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_publish_rejected_while_occupied() {
        let slot = DecodeSlot::new();
        assert!(slot.publish("first"));
        assert!(!slot.publish("second"));
        assert_eq!(slot.take().as_deref(), Some("first"));
        // Cleared, so the next decode is accepted again
        assert!(slot.publish("second"));
    }

    #[test]
    fn test_empty_payload_is_ignored() {
        let slot = DecodeSlot::new();
        assert!(!slot.publish(""));
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_fifty_decodes_each_consumed_exactly_once() {
        let slot = Arc::new(DecodeSlot::new());
        const EVENTS: usize = 50;

        let producer = {
            let slot = slot.clone();
            thread::spawn(move || {
                for i in 0..EVENTS {
                    let payload = format!("decode-{}", i);
                    // Re-offer until the consumer has cleared the slot.
                    while !slot.publish(&payload) {
                        thread::yield_now();
                    }
                }
            })
        };

        let consumer = {
            let slot = slot.clone();
            thread::spawn(move || {
                let mut seen = Vec::with_capacity(EVENTS);
                while seen.len() < EVENTS {
                    if let Some(payload) = slot.take() {
                        seen.push(payload);
                    } else {
                        thread::yield_now();
                    }
                }
                seen
            })
        };

        producer.join().unwrap();
        let seen = consumer.join().unwrap();

        // No duplicate, no dropped event.
        assert_eq!(seen.len(), EVENTS);
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), EVENTS);
        assert!(!slot.is_occupied());
    }

    #[tokio::test]
    async fn test_live_scanner_verifies_each_decode_exactly_once() {
        let ledger = Arc::new(MockLedger::new());
        let fields = sample_fields();
        let id = fields.derive_id();
        ledger.insert(&id, &fields, "QmArtifact");

        let slot = Arc::new(DecodeSlot::new());
        let verifier = Arc::new(Verifier::new(ledger.clone()));
        let mut scanner = LiveScanner::new(slot.clone(), verifier);

        // Nothing to do while idle
        assert_eq!(scanner.poll().await.unwrap(), None);

        scanner.start();
        assert_eq!(scanner.state(), ScanState::Scanning);

        // Scanning persists until a decode arrives
        assert_eq!(scanner.poll().await.unwrap(), None);
        assert_eq!(scanner.state(), ScanState::Scanning);

        assert!(slot.publish(id.as_str()));
        let outcome = scanner.poll().await.unwrap().unwrap();
        assert_eq!(outcome, VerificationResult::Valid(fields));
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(ledger.query_calls.load(Ordering::SeqCst), 1);

        // The same decode can never fire twice
        scanner.start();
        assert_eq!(scanner.poll().await.unwrap(), None);
        assert_eq!(ledger.query_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_frame_decode_feeds_the_slot() {
        use crate::artifact::renderer::qr_pixels;

        let ledger = Arc::new(MockLedger::new());
        let slot = Arc::new(DecodeSlot::new());
        let verifier = Arc::new(Verifier::new(ledger));
        let mut scanner = LiveScanner::new(slot, verifier);
        scanner.start();

        let (side, pixels) = qr_pixels("deadbeef").unwrap();
        let frame = image::GrayImage::from_raw(side, side, pixels).unwrap();
        assert!(scanner.on_frame(&frame));

        // Never issued, so the scan resolves to NotFound
        let outcome = scanner.poll().await.unwrap().unwrap();
        assert_eq!(outcome, VerificationResult::NotFound);
    }
}
