//! Batch coordinator: fans the grading pipeline across devices.
//!
//! Every device runs the same four stages (fetch, normalize, derive,
//! evaluate+classify) as an independent unit of work on a bounded worker
//! pool. Adapter I/O is the only stage allowed to block; it is bounded by a
//! per-device timeout. Results are merged by input index, so report order
//! always matches discovery order regardless of completion order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, bounded, unbounded};
use tracing::{info, info_span, warn};

use dgt_adapter::{AdapterError, DeviceAdapter, DeviceHandle};
use dgt_model::{GradeStatus, GradedDevice, ReasonCode};
use dgt_normalize::{NormalizeError, derive, normalize};
use dgt_rules::{Thresholds, classify, error_device, evaluate};

/// Tuning knobs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads; 0 sizes the pool from the host's parallelism.
    /// Adapter latency dominates, so the pool is deliberately small.
    pub workers: usize,
    /// Budget for one adapter fetch. A device that exceeds it grades as
    /// `Error` without stalling the rest of the batch.
    pub device_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            device_timeout: Duration::from_secs(30),
        }
    }
}

impl BatchOptions {
    fn effective_workers(&self, devices: usize) -> usize {
        let auto = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4)
            .min(8);
        let configured = if self.workers == 0 { auto } else { self.workers };
        configured.clamp(1, devices.max(1))
    }
}

/// Cooperative cancellation for a whole batch. Workers finish the device in
/// hand and stop; completed results are retained.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress of one batch, reported after each device completes.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub device: String,
    pub status: GradeStatus,
}

/// The ordered result set of one batch run.
#[derive(Debug, Default)]
pub struct GradedBatch {
    devices: Vec<GradedDevice>,
}

impl GradedBatch {
    pub fn devices(&self) -> &[GradedDevice] {
        &self.devices
    }

    pub fn into_devices(self) -> Vec<GradedDevice> {
        self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Any device graded `Error` (read failure, identity failure, or
    /// insufficient data).
    pub fn has_errors(&self) -> bool {
        self.devices
            .iter()
            .any(|device| device.status == GradeStatus::Error)
    }

    /// Any device graded `Fail`.
    pub fn has_failures(&self) -> bool {
        self.devices
            .iter()
            .any(|device| device.status == GradeStatus::Fail)
    }

    /// Any passing device carrying flags.
    pub fn has_flags(&self) -> bool {
        self.devices
            .iter()
            .any(|device| device.status == GradeStatus::Pass && !device.flag_codes.is_empty())
    }

    /// (pass, flagged, fail, error) counts using the display status.
    pub fn status_counts(&self) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for device in &self.devices {
            match device.display_status() {
                GradeStatus::Pass => counts.0 += 1,
                GradeStatus::Flagged => counts.1 += 1,
                GradeStatus::Fail => counts.2 += 1,
                GradeStatus::Error => counts.3 += 1,
            }
        }
        counts
    }
}

/// Runs the full pipeline for one device. Never panics and never escapes an
/// error: every failure mode collapses into an `Error`-status result.
pub fn grade_device(
    adapter: &Arc<dyn DeviceAdapter>,
    handle: &DeviceHandle,
    thresholds: &Thresholds,
    timeout: Duration,
) -> GradedDevice {
    let span = info_span!("device", name = %handle.name);
    let _guard = span.enter();

    let bag = match fetch_with_timeout(adapter, handle, timeout) {
        Ok(bag) => bag,
        Err(error) => {
            warn!(device = %handle.name, %error, "adapter fetch failed");
            return error_device(handle.name.clone(), ReasonCode::DataReadError);
        }
    };

    let mut record = match normalize(&bag) {
        Ok(record) => record,
        Err(error @ NormalizeError::IdentityUnresolved { .. }) => {
            warn!(device = %handle.name, %error, "identity unresolved");
            return error_device(handle.name.clone(), ReasonCode::IdentityUnresolved);
        }
    };
    derive::apply(&mut record);

    let evaluation = evaluate(&record, thresholds);
    classify(handle.name.clone(), record, evaluation)
}

/// Waits for one fetch with a deadline. The fetch runs on its own thread;
/// when the deadline passes, the batch moves on and the straggler is left
/// to the adapter's own timeout, its result discarded.
fn fetch_with_timeout(
    adapter: &Arc<dyn DeviceAdapter>,
    handle: &DeviceHandle,
    timeout: Duration,
) -> Result<dgt_adapter::RawAttributeBag, AdapterError> {
    let (tx, rx) = bounded(1);
    let adapter = Arc::clone(adapter);
    let thread_handle = handle.clone();
    std::thread::spawn(move || {
        let _ = tx.send(adapter.fetch(&thread_handle));
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(AdapterError::Timeout {
            device: handle.name.clone(),
            seconds: timeout.as_secs(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(AdapterError::Timeout {
            device: handle.name.clone(),
            seconds: timeout.as_secs(),
        }),
    }
}

/// Grades every device, in bounded parallel, returning results in input
/// order.
pub fn run_batch(
    adapter: &Arc<dyn DeviceAdapter>,
    handles: &[DeviceHandle],
    thresholds: &Thresholds,
    options: &BatchOptions,
) -> GradedBatch {
    run_batch_with(adapter, handles, thresholds, options, &CancelToken::new(), |_| {})
}

/// [`run_batch`] with a cancel token and a per-device progress callback.
///
/// Cancellation is cooperative: devices already graded stay in the result
/// set, devices not yet started are skipped, and the in-flight fetches are
/// bounded by their own timeout.
pub fn run_batch_with(
    adapter: &Arc<dyn DeviceAdapter>,
    handles: &[DeviceHandle],
    thresholds: &Thresholds,
    options: &BatchOptions,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(BatchProgress),
) -> GradedBatch {
    let total = handles.len();
    if total == 0 {
        return GradedBatch::default();
    }
    let workers = options.effective_workers(total);
    info!(devices = total, workers, "batch started");

    let (job_tx, job_rx) = unbounded::<(usize, DeviceHandle)>();
    let (result_tx, result_rx) = unbounded::<(usize, GradedDevice)>();
    for job in handles.iter().cloned().enumerate() {
        // Unbounded channel; the sends cannot block.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let mut indexed: Vec<(usize, GradedDevice)> = Vec::with_capacity(total);
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let adapter = Arc::clone(adapter);
            scope.spawn(move || {
                while let Ok((index, handle)) = job_rx.recv() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let graded =
                        grade_device(&adapter, &handle, thresholds, options.device_timeout);
                    if result_tx.send((index, graded)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut completed = 0usize;
        while let Ok((index, graded)) = result_rx.recv() {
            completed += 1;
            on_progress(BatchProgress {
                completed,
                total,
                device: graded.device.clone(),
                status: graded.display_status(),
            });
            indexed.push((index, graded));
        }
    });

    // Deterministic merge: input order, not completion order.
    indexed.sort_by_key(|(index, _)| *index);
    let batch = GradedBatch {
        devices: indexed.into_iter().map(|(_, graded)| graded).collect(),
    };
    let (pass, flagged, fail, error) = batch.status_counts();
    info!(pass, flagged, fail, error, "batch finished");
    batch
}
