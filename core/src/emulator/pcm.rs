use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::ShellError;

/// Default bound on queued audio: about 370 ms of 44.1 kHz mono.
pub const DEFAULT_MAX_QUEUED_BYTES: usize = 32 * 1024;

struct PcmInner {
    chunks: VecDeque<Vec<u8>>,
    /// Read offset into the front chunk.
    pos: usize,
    /// Total bytes of all queued chunks, including the consumed part of the front one.
    queued: usize,
    max_queued: usize,
    dropped: u64,
}

impl PcmInner {
    fn pop_front(&mut self) {
        if let Some(chunk) = self.chunks.pop_front() {
            self.queued -= chunk.len();
        }
        self.pos = 0;
    }
}

/// Queue of 16-bit little-endian mono PCM chunks. The engine thread pushes
/// whole chunks; the audio output drains them sample by sample.
///
/// With nothing draining it the queue keeps only the newest
/// `max_queued_bytes`; older chunks are dropped whole.
#[derive(Clone)]
pub struct PcmQueue {
    inner: Arc<Mutex<PcmInner>>,
}

impl Default for PcmQueue {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_QUEUED_BYTES)
    }
}

impl PcmQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_queued_bytes: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PcmInner {
                chunks: VecDeque::new(),
                pos: 0,
                queued: 0,
                max_queued: max_queued_bytes,
                dropped: 0,
            })),
        }
    }

    pub fn push(&self, chunk: &[u8]) -> Result<(), ShellError> {
        if chunk.is_empty() {
            return Ok(());
        }
        let mut inner = self.lock()?;
        inner.chunks.push_back(chunk.to_vec());
        inner.queued += chunk.len();

        // The newest chunk always stays, even if it alone exceeds the limit.
        while inner.queued > inner.max_queued && inner.chunks.len() > 1 {
            inner.pop_front();
            inner.dropped += 1;
            if inner.dropped == 1 {
                log::warn!("pcm queue full, dropping old audio");
            }
        }
        Ok(())
    }

    /// Fill `out` with queued samples, padding with silence when the queue
    /// runs dry. Returns the number of real samples written.
    pub fn drain_into(&self, out: &mut [i16]) -> Result<usize, ShellError> {
        let mut inner = self.lock()?;
        let mut written = 0;

        while written < out.len() {
            let pos = inner.pos;
            let Some(front) = inner.chunks.front() else {
                break;
            };
            if pos + 1 >= front.len() {
                // Exhausted (a trailing odd byte is dropped)
                inner.pop_front();
                continue;
            }
            out[written] = i16::from_le_bytes([front[pos], front[pos + 1]]);
            inner.pos += 2;
            written += 1;
        }

        out[written..].fill(0);
        Ok(written)
    }

    pub fn clear(&self) -> Result<(), ShellError> {
        let mut inner = self.lock()?;
        inner.chunks.clear();
        inner.pos = 0;
        inner.queued = 0;
        Ok(())
    }

    pub fn pending_chunks(&self) -> Result<usize, ShellError> {
        Ok(self.lock()?.chunks.len())
    }

    /// Bytes not yet drained.
    pub fn pending_bytes(&self) -> Result<usize, ShellError> {
        let inner = self.lock()?;
        Ok(inner.queued - inner.pos)
    }

    /// Chunks discarded because the queue was full.
    pub fn dropped_chunks(&self) -> Result<u64, ShellError> {
        Ok(self.lock()?.dropped)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PcmInner>, ShellError> {
        self.inner
            .lock()
            .map_err(|_| ShellError::LockPoisoned("pcm queue"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_across_chunk_boundaries() {
        let q = PcmQueue::new();
        q.push(&[0x01, 0x00, 0x02, 0x00]).unwrap();
        q.push(&[0xFF, 0xFF]).unwrap();

        let mut out = [7i16; 4];
        assert_eq!(q.drain_into(&mut out).unwrap(), 3);
        assert_eq!(out, [1, 2, -1, 0]);
        assert_eq!(q.pending_chunks().unwrap(), 0);
    }

    #[test]
    fn partial_drain_keeps_position() {
        let q = PcmQueue::new();
        q.push(&[0x10, 0x00, 0x20, 0x00, 0x30, 0x00]).unwrap();

        let mut out = [0i16; 2];
        q.drain_into(&mut out).unwrap();
        assert_eq!(out, [0x10, 0x20]);

        let mut out = [0i16; 2];
        assert_eq!(q.drain_into(&mut out).unwrap(), 1);
        assert_eq!(out, [0x30, 0]);
    }

    #[test]
    fn undrained_queue_stays_bounded() {
        let q = PcmQueue::new();
        for i in 0..100_000u32 {
            q.push(&(i as i16).to_le_bytes().repeat(441)).unwrap();
        }
        assert!(q.pending_bytes().unwrap() <= DEFAULT_MAX_QUEUED_BYTES);
        assert!(q.dropped_chunks().unwrap() > 99_000);

        // What survives is the newest audio.
        let pending = q.pending_bytes().unwrap() / 2;
        let mut out = vec![0i16; pending];
        assert_eq!(q.drain_into(&mut out).unwrap(), pending);
        assert_eq!(*out.last().unwrap(), 99_999u32 as i16);
    }

    #[test]
    fn oversized_chunk_is_kept_alone() {
        let q = PcmQueue::with_limit(4);
        q.push(&[1, 0]).unwrap();
        q.push(&[2, 0, 3, 0, 4, 0]).unwrap();
        assert_eq!(q.pending_chunks().unwrap(), 1);

        let mut out = [0i16; 3];
        assert_eq!(q.drain_into(&mut out).unwrap(), 3);
        assert_eq!(out, [2, 3, 4]);
        assert_eq!(q.pending_bytes().unwrap(), 0);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let q = PcmQueue::new();
        q.push(&[0x05, 0x00, 0x99]).unwrap();
        q.push(&[0x06, 0x00]).unwrap();

        let mut out = [0i16; 2];
        assert_eq!(q.drain_into(&mut out).unwrap(), 2);
        assert_eq!(out, [5, 6]);
    }
}
