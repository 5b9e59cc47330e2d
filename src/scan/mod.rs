//! Parallel discovery across many roots.
//!
//! Each root becomes one discovery task on a bounded rayon pool. Workers
//! report through a channel; the calling thread aggregates events, owns the
//! progress table and pushes snapshots to a [`ScanObserver`] on a fixed
//! cadence. Results come back in root submission order.

pub mod progress;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, tick, unbounded};
use serde::Serialize;
use tracing::Span;

use crate::dicom;
use crate::discovery::{self, DiscoveryOptions, Validator};
use crate::error::RtscanError;

pub use progress::{
    IndicatifObserver, ProgressEntry, ProgressTable, ScanObserver, ScanSnapshot, SilentObserver,
    TaskId,
};

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 40;

/// Default aggregator wake-up interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Options for [`scan_roots`].
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Number of worker threads.
    pub workers: usize,
    /// How often the observer is refreshed.
    pub poll_interval: Duration,
    /// File name glob passed to each discovery task.
    pub pattern: String,
    /// Give up when tasks are still running after this long.
    pub timeout: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            pattern: discovery::DEFAULT_PATTERN.to_string(),
            timeout: None,
        }
    }
}

/// Messages sent from workers to the aggregator.
#[derive(Debug)]
pub(crate) enum ScanEvent {
    Progress {
        task: TaskId,
        completed: u64,
        total: u64,
    },
    Finished {
        task: TaskId,
        result: Result<Vec<PathBuf>, RtscanError>,
    },
}

/// Number of matches found under one root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RootSummary {
    pub root: PathBuf,
    pub files: usize,
}

/// The aggregated result of a scan.
#[derive(Clone, Debug, Serialize)]
pub struct ScanOutcome {
    /// Matching paths, grouped by root in submission order.
    pub paths: Vec<PathBuf>,
    pub per_root: Vec<RootSummary>,
    pub elapsed: Duration,
}

/// Finds RTSTRUCT files under every root.
pub fn scan_roots<P: AsRef<Path>>(
    roots: &[P],
    options: &ScanOptions,
    observer: &mut dyn ScanObserver,
) -> Result<ScanOutcome, RtscanError> {
    let validator: Validator = Arc::new(|path: &Path| dicom::is_rtstruct(path));
    scan_roots_with(roots, options, validator, observer)
}

/// Like [`scan_roots`], with a caller-supplied file predicate.
pub fn scan_roots_with<P: AsRef<Path>>(
    roots: &[P],
    options: &ScanOptions,
    validator: Validator,
    observer: &mut dyn ScanObserver,
) -> Result<ScanOutcome, RtscanError> {
    let started = Instant::now();
    if options.workers == 0 {
        return Err(RtscanError::InvalidOptions {
            message: "worker count must be at least 1".to_string(),
        });
    }
    glob::Pattern::new(&options.pattern).map_err(|source| RtscanError::InvalidPattern {
        pattern: options.pattern.clone(),
        source,
    })?;

    let roots: Vec<PathBuf> = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();
    let scan_span = tracing::info_span!("scan", roots = roots.len(), workers = options.workers);
    let _entered = scan_span.enter();

    if roots.is_empty() {
        return Ok(ScanOutcome {
            paths: Vec::new(),
            per_root: Vec::new(),
            elapsed: started.elapsed(),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|i| format!("rtscan-scan-{i}"))
        .build()?;

    let discovery_options = DiscoveryOptions {
        recursive: true,
        yield_directories: false,
        pattern: options.pattern.clone(),
    };

    let (tx, rx) = unbounded::<ScanEvent>();
    for (index, root) in roots.iter().enumerate() {
        let tx = tx.clone();
        let root = root.clone();
        let validator = Arc::clone(&validator);
        let discovery_options = discovery_options.clone();
        // rayon threads do not inherit the caller's span, so parent it explicitly.
        let span = tracing::info_span!(
            parent: &scan_span,
            "scan_root",
            task = index,
            root = %root.display()
        );

        pool.spawn(move || {
            let task = TaskId(index);
            let _ = tx.send(ScanEvent::Progress {
                task,
                completed: 0,
                total: 1,
            });
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                discover_root(&root, &discovery_options, validator, span)
            }))
            .unwrap_or_else(|payload| {
                Err(RtscanError::WorkerPanicked {
                    root: root.clone(),
                    message: panic_message(payload.as_ref()),
                })
            });
            let _ = tx.send(ScanEvent::Progress {
                task,
                completed: 1,
                total: 1,
            });
            let _ = tx.send(ScanEvent::Finished { task, result });
        });
    }
    drop(tx);

    let results = aggregate(&roots, &rx, options, started, observer)?;

    let mut paths = Vec::new();
    let mut per_root = Vec::with_capacity(roots.len());
    for (root, result) in roots.into_iter().zip(results) {
        let found = result.map_err(|source| RtscanError::Scan {
            root: root.clone(),
            source: Box::new(source),
        })?;
        per_root.push(RootSummary {
            root,
            files: found.len(),
        });
        paths.extend(found);
    }

    let elapsed = started.elapsed();
    tracing::info!(
        found = paths.len(),
        "Scan finished in {:.3}s",
        elapsed.as_secs_f64()
    );
    Ok(ScanOutcome {
        paths,
        per_root,
        elapsed,
    })
}

fn discover_root(
    root: &Path,
    options: &DiscoveryOptions,
    validator: Validator,
    span: Span,
) -> Result<Vec<PathBuf>, RtscanError> {
    let found = discovery::find_files(root, options)?
        .with_shared_validator(validator)
        .with_span(span.clone())
        .collect::<Result<Vec<_>, _>>()?;
    span.in_scope(|| tracing::debug!(found = found.len(), "Root scanned"));
    Ok(found)
}

type TaskResult = Result<Vec<PathBuf>, RtscanError>;

/// Drains worker events until every task has finished, refreshing the
/// observer on each tick. Returns one result per task in submission order.
fn aggregate(
    roots: &[PathBuf],
    rx: &crossbeam_channel::Receiver<ScanEvent>,
    options: &ScanOptions,
    started: Instant,
    observer: &mut dyn ScanObserver,
) -> Result<Vec<TaskResult>, RtscanError> {
    let task_count = roots.len();
    let mut table = ProgressTable::new(roots.to_vec());
    let mut slots: Vec<Option<TaskResult>> = (0..task_count).map(|_| None).collect();
    let ticker = tick(options.poll_interval);
    let deadline = options.timeout.map(|timeout| started + timeout);

    while table.finished() < task_count {
        select! {
            recv(rx) -> event => match event {
                Ok(ScanEvent::Progress { task, completed, total }) => {
                    table.update(task, completed, total);
                }
                Ok(ScanEvent::Finished { task, result }) => {
                    if let Some(slot) = slots.get_mut(task.0) {
                        *slot = Some(result);
                        table.mark_finished();
                    }
                }
                // Every sender is gone; unfilled slots are reported below.
                Err(_) => break,
            },
            recv(ticker) -> _ => {
                observer.refresh(&table.snapshot());
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    return Err(RtscanError::ScanTimedOut {
                        elapsed: started.elapsed(),
                        finished: table.finished(),
                        total: task_count,
                    });
                }
            }
        }
    }
    observer.finish(&table.snapshot());

    Ok(slots
        .into_iter()
        .zip(roots)
        .map(|(slot, root)| {
            slot.unwrap_or_else(|| {
                Err(RtscanError::WorkerPanicked {
                    root: root.clone(),
                    message: "worker exited without reporting a result".to_string(),
                })
            })
        })
        .collect())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn accept_all() -> Validator {
        Arc::new(|_: &Path| -> Result<bool, RtscanError> { Ok(true) })
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let options = ScanOptions {
            workers: 0,
            ..Default::default()
        };
        let err = scan_roots(&["."], &options, &mut SilentObserver).unwrap_err();
        assert!(matches!(err, RtscanError::InvalidOptions { .. }));
    }

    #[test]
    fn test_no_roots_is_empty() {
        let roots: [&str; 0] = [];
        let outcome = scan_roots(&roots, &ScanOptions::default(), &mut SilentObserver).unwrap();
        assert!(outcome.paths.is_empty());
        assert!(outcome.per_root.is_empty());
    }

    #[test]
    fn test_results_follow_submission_order() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(a.path().join("1.dcm"), b"x").unwrap();
        fs::write(b.path().join("2.dcm"), b"x").unwrap();
        fs::write(b.path().join("3.dcm"), b"x").unwrap();

        let roots = [b.path(), a.path()];
        let outcome =
            scan_roots_with(&roots, &ScanOptions::default(), accept_all(), &mut SilentObserver)
                .unwrap();

        assert_eq!(
            outcome.paths,
            vec![
                b.path().join("2.dcm"),
                b.path().join("3.dcm"),
                a.path().join("1.dcm")
            ]
        );
        assert_eq!(outcome.per_root[0].files, 2);
        assert_eq!(outcome.per_root[1].files, 1);
    }

    #[test]
    fn test_worker_panic_fails_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("boom.dcm"), b"x").unwrap();

        let validator: Validator = Arc::new(|_: &Path| -> Result<bool, RtscanError> {
            panic!("predicate exploded")
        });
        let err = scan_roots_with(
            &[dir.path()],
            &ScanOptions::default(),
            validator,
            &mut SilentObserver,
        )
        .unwrap_err();

        let RtscanError::Scan { root, source } = err else {
            panic!("expected a scan error");
        };
        assert_eq!(root, dir.path());
        assert!(matches!(*source, RtscanError::WorkerPanicked { ref message, .. }
            if message.contains("predicate exploded")));
    }

    #[test]
    fn test_panic_message_extracts_strings() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
