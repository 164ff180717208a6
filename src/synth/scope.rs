//! Audio → UI tap for meters and oscilloscopes.

use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::OutputSample;

/// Producer half, owned by the audio callback.
///
/// Pushing never blocks: once the ring is full the rest of the block is
/// dropped until the UI catches up.
pub struct ScopeTap {
    tx: Producer<f32>,
    dropped: u64,
}

/// Create a tap and its reader with room for `capacity` samples.
pub fn scope(capacity: usize) -> (ScopeTap, Consumer<f32>) {
    let (tx, rx) = RingBuffer::new(capacity);
    (ScopeTap { tx, dropped: 0 }, rx)
}

impl ScopeTap {
    /// Push a rendered block as normalised `-1.0..1.0` samples.
    pub fn push_block<S: OutputSample>(&mut self, block: &[S]) {
        let room = self.tx.slots().min(block.len());
        for &sample in &block[..room] {
            // cannot fail: `room` slots were free
            let _ = self.tx.push(sample.to_unit());
        }
        self.dropped += (block.len() - room) as u64;
    }

    /// Samples discarded because the reader fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
