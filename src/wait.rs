use std::time::{Duration, Instant};

use log::trace;

use crate::error::WaitTimeout;

/// Why an explicit wait gave up.
#[derive(Debug)]
pub enum WaitError {
    Timeout(WaitTimeout),
    /// The condition itself failed, not just "not yet".
    Probe(anyhow::Error),
}

/// Bounded polling: succeeds as soon as the condition holds, fails once
/// `timeout` has elapsed.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    timeout: Duration,
    poll: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn until<F>(&self, condition: &str, mut check: F) -> Result<(), WaitError>
    where
        F: FnMut() -> anyhow::Result<bool>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            if check().map_err(WaitError::Probe)? {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(WaitError::Timeout(WaitTimeout {
                    condition: condition.to_string(),
                    timeout: self.timeout,
                }));
            }
            trace!("[Wait] {condition} not met yet");
            std::thread::sleep(self.poll.min(deadline - now));
        }
    }
}
