/// What the download percentage is computed against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressBasis {
    /// Server announced the body size
    ContentLength(u64),
    /// No Content-Length: time-based guess, never reaches 100 before the end
    Heuristic {
        expected_bytes: u64,
        throughput_bytes_per_sec: u64,
        cap: u8,
    },
}

pub const DEFAULT_ASSUMED_THROUGHPUT: u64 = 512 * 1024;
pub const DEFAULT_HEURISTIC_CAP: u8 = 95;

impl ProgressBasis {
    pub fn heuristic(expected_bytes: u64) -> Self {
        ProgressBasis::Heuristic {
            expected_bytes,
            throughput_bytes_per_sec: DEFAULT_ASSUMED_THROUGHPUT,
            cap: DEFAULT_HEURISTIC_CAP,
        }
    }

    /// Content-Length when present, otherwise `heuristic`.
    pub fn choose(content_length: Option<u64>, heuristic: ProgressBasis) -> Self {
        match content_length {
            Some(total) => ProgressBasis::ContentLength(total),
            None => heuristic,
        }
    }
}

/// Percentage of a running download. Reported values never decrease.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    basis: ProgressBasis,
    received: u64,
    started_at_ms: f64,
    last_percent: u8,
}

impl ProgressTracker {
    pub fn new(basis: ProgressBasis, started_at_ms: f64) -> Self {
        Self {
            basis,
            received: 0,
            started_at_ms,
            last_percent: 0,
        }
    }

    pub fn basis(&self) -> ProgressBasis {
        self.basis
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn percent(&self) -> u8 {
        self.last_percent
    }

    pub fn on_chunk(&mut self, len: usize, now_ms: f64) -> u8 {
        self.received = self.received.saturating_add(len as u64);
        self.tick(now_ms)
    }

    /// Recomputes the percentage; for the heuristic basis this moves with time alone.
    pub fn tick(&mut self, now_ms: f64) -> u8 {
        let raw = match self.basis {
            ProgressBasis::ContentLength(0) => 100,
            ProgressBasis::ContentLength(total) => {
                (self.received.saturating_mul(100) / total).min(100) as u8
            }
            ProgressBasis::Heuristic {
                expected_bytes,
                throughput_bytes_per_sec,
                cap,
            } => {
                let elapsed_s = ((now_ms - self.started_at_ms) / 1000.0).max(0.0);
                let expected = expected_bytes.max(1) as f64;
                let pct = elapsed_s * throughput_bytes_per_sec as f64 * 100.0 / expected;
                pct.min(cap as f64).floor() as u8
            }
        };
        self.last_percent = self.last_percent.max(raw);
        self.last_percent
    }

    pub fn complete(&mut self) -> u8 {
        self.last_percent = 100;
        self.last_percent
    }
}
