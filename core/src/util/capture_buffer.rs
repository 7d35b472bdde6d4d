use std::sync::{Arc, Mutex, MutexGuard};

/// Byte buffer that keeps the first `cap` bytes pushed into it and counts
/// the rest. Shared between a pump task and the invoker so output captured
/// so far is still readable if the pump is aborted.
pub struct CaptureBuffer {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Default)]
struct Inner {
    bytes: Vec<u8>,
    total: u64,
}

impl CaptureBuffer {
    pub fn new(cap: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
            cap,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, data: &[u8]) {
        let mut g = self.lock();
        let room = self.cap.saturating_sub(g.bytes.len());
        let keep = data.len().min(room);
        g.bytes.extend_from_slice(&data[..keep]);
        g.total += data.len() as u64;
    }

    pub fn len(&self) -> usize {
        self.lock().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes the writer produced, including those dropped past the cap.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    pub fn truncated(&self) -> bool {
        let g = self.lock();
        g.total > g.bytes.len() as u64
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock().bytes).into_owned()
    }
}
