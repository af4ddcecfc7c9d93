//! Test doubles for the bus, the clock and the tick observer.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use super::clock::Clock;
use super::poll_loop::{TickObserver, TickReport};
use super::transport::{BusTransport, TransportError};

/// Virtual clock that only moves when something sleeps on it
#[derive(Debug, Default)]
pub struct FakeClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for FakeClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Write { bytes: Vec<u8>, at: Duration },
    Read { len: usize, at: Duration },
}

#[derive(Debug, Default)]
struct FakeBusState {
    responses: VecDeque<Vec<u8>>,
    ops: Vec<BusOp>,
    fail_writes: bool,
    write_limit: Option<usize>,
    block_reads: bool,
    released: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<FakeBusState>,
    unblocked: Condvar,
}

/// Inspection handle that outlives the transport it was created with
#[derive(Debug, Clone)]
pub struct FakeBus {
    shared: Arc<Shared>,
}

impl FakeBus {
    fn state(&self) -> MutexGuard<'_, FakeBusState> {
        self.shared.state.lock().unwrap()
    }

    /// Queues the bytes returned by the next read
    pub fn push_response(&self, bytes: &[u8]) {
        self.state().responses.push_back(bytes.to_vec());
    }

    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    /// Accept at most `limit` bytes per write
    pub fn limit_writes(&self, limit: usize) {
        self.state().write_limit = Some(limit);
    }

    /// Reads are recorded, then park until [`FakeBus::unblock_reads`]
    pub fn block_reads(&self) {
        self.state().block_reads = true;
    }

    pub fn unblock_reads(&self) {
        self.state().block_reads = false;
        self.shared.unblocked.notify_all();
    }

    pub fn ops(&self) -> Vec<BusOp> {
        self.state().ops.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                BusOp::Write { bytes, .. } => Some(bytes),
                BusOp::Read { .. } => None,
            })
            .collect()
    }

    pub fn is_released(&self) -> bool {
        self.state().released
    }
}

/// Scripted transport: reads pop queued responses, every call is recorded
pub struct FakeTransport {
    shared: Arc<Shared>,
    clock: Arc<FakeClock>,
}

impl FakeTransport {
    pub fn new(clock: Arc<FakeClock>) -> (Self, FakeBus) {
        let shared = Arc::new(Shared::default());
        let bus = FakeBus {
            shared: shared.clone(),
        };
        (Self { shared, clock }, bus)
    }
}

impl BusTransport for FakeTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.shared.state.lock().unwrap();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device not acknowledging").into());
        }
        state.ops.push(BusOp::Write {
            bytes: bytes.to_vec(),
            at: self.clock.elapsed(),
        });
        Ok(state.write_limit.map_or(bytes.len(), |limit| limit.min(bytes.len())))
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.shared.state.lock().unwrap();
        state.ops.push(BusOp::Read {
            len: buffer.len(),
            at: self.clock.elapsed(),
        });
        let mut state = self
            .shared
            .unblocked
            .wait_while(state, |state| state.block_reads)
            .unwrap();
        let response = state
            .responses
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted response"))?;
        let count = response.len().min(buffer.len());
        buffer[..count].copy_from_slice(&response[..count]);
        Ok(count)
    }
}

impl Drop for FakeTransport {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.lock() {
            state.released = true;
        }
    }
}

/// Observer that keeps every report it sees
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    reports: Arc<Mutex<Vec<TickReport>>>,
}

impl RecordingObserver {
    pub fn reports(&self) -> Vec<TickReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl TickObserver for RecordingObserver {
    fn on_tick(&mut self, report: &TickReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
