//! Progress reporting for multi-root scans.
//!
//! The scan aggregator owns the [`ProgressTable`] and is its only writer.
//! Observers receive read-only snapshots on the aggregator's cadence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;

/// Index of a discovery task, in root submission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

/// Progress of one task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    pub completed: u64,
    pub total: u64,
}

impl ProgressEntry {
    pub fn is_done(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Per-task progress, indexed by [`TaskId`].
#[derive(Clone, Debug)]
pub struct ProgressTable {
    roots: Vec<PathBuf>,
    entries: Vec<ProgressEntry>,
    finished: usize,
}

impl ProgressTable {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let entries = vec![ProgressEntry::default(); roots.len()];
        Self {
            roots,
            entries,
            finished: 0,
        }
    }

    pub(crate) fn update(&mut self, task: TaskId, completed: u64, total: u64) {
        if let Some(entry) = self.entries.get_mut(task.0) {
            *entry = ProgressEntry { completed, total };
        }
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished += 1;
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    pub fn task_count(&self) -> usize {
        self.entries.len()
    }

    pub fn snapshot(&self) -> ScanSnapshot<'_> {
        ScanSnapshot {
            roots: &self.roots,
            entries: &self.entries,
            finished: self.finished,
        }
    }
}

/// A read-only view of the progress table at one instant.
#[derive(Clone, Copy, Debug)]
pub struct ScanSnapshot<'a> {
    pub roots: &'a [PathBuf],
    pub entries: &'a [ProgressEntry],
    pub finished: usize,
}

impl ScanSnapshot<'_> {
    pub fn task_count(&self) -> usize {
        self.entries.len()
    }

    /// Tasks that have started but not finished.
    pub fn in_progress(&self) -> impl Iterator<Item = (TaskId, &Path, &ProgressEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.total > 0 && !entry.is_done())
            .map(|(index, entry)| (TaskId(index), self.roots[index].as_path(), entry))
    }
}

/// Receives progress snapshots from the scan aggregator.
pub trait ScanObserver {
    /// Called on every tick of the aggregator.
    fn refresh(&mut self, snapshot: &ScanSnapshot<'_>);

    /// Called once after the last task has reported.
    fn finish(&mut self, snapshot: &ScanSnapshot<'_>) {
        self.refresh(snapshot);
    }
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentObserver;

impl ScanObserver for SilentObserver {
    fn refresh(&mut self, _snapshot: &ScanSnapshot<'_>) {}
}

/// Draws an overall bar plus one spinner per running task.
pub struct IndicatifObserver {
    multi: MultiProgress,
    overall: Option<ProgressBar>,
    tasks: HashMap<TaskId, ProgressBar>,
}

impl IndicatifObserver {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// An observer that renders nothing, for non-interactive runs.
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            overall: None,
            tasks: HashMap::new(),
        }
    }

    fn overall(&mut self, len: usize) -> &ProgressBar {
        self.overall.get_or_insert_with(|| {
            let pb = self.multi.add(ProgressBar::new(len as u64));
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} roots",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
            );
            pb
        })
    }

    fn task_bar(&mut self, task: TaskId, root: &Path) -> &ProgressBar {
        let multi = &self.multi;
        self.tasks.entry(task).or_insert_with(|| {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(
                ProgressStyle::with_template("  {spinner:.green} {msg} [{elapsed}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(root.display().to_string());
            pb
        })
    }
}

impl Default for IndicatifObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for IndicatifObserver {
    fn refresh(&mut self, snapshot: &ScanSnapshot<'_>) {
        self.overall(snapshot.task_count())
            .set_position(snapshot.finished as u64);

        let running: Vec<TaskId> = snapshot
            .in_progress()
            .map(|(task, root, _)| {
                self.task_bar(task, root).tick();
                task
            })
            .collect();

        let multi = &self.multi;
        self.tasks.retain(|task, pb| {
            let keep = running.contains(task);
            if !keep {
                pb.finish_and_clear();
                multi.remove(pb);
            }
            keep
        });
    }

    fn finish(&mut self, snapshot: &ScanSnapshot<'_>) {
        self.refresh(snapshot);
        if let Some(pb) = &self.overall {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_running_tasks() {
        let mut table = ProgressTable::new(vec!["a".into(), "b".into(), "c".into()]);
        table.update(TaskId(0), 1, 1);
        table.mark_finished();
        table.update(TaskId(1), 0, 1);

        let snapshot = table.snapshot();
        let running: Vec<TaskId> = snapshot.in_progress().map(|(task, _, _)| task).collect();
        assert_eq!(running, vec![TaskId(1)]);
        assert_eq!(snapshot.finished, 1);
        assert_eq!(snapshot.task_count(), 3);
    }

    #[test]
    fn test_unknown_task_is_ignored() {
        let mut table = ProgressTable::new(vec!["a".into()]);
        table.update(TaskId(5), 1, 1);
        assert_eq!(table.snapshot().entries, &[ProgressEntry::default()]);
    }

    #[test]
    fn test_hidden_observer_tracks_and_clears_bars() {
        let mut observer = IndicatifObserver::hidden();
        let mut table = ProgressTable::new(vec!["a".into(), "b".into()]);

        table.update(TaskId(0), 0, 1);
        table.update(TaskId(1), 0, 1);
        observer.refresh(&table.snapshot());
        assert_eq!(observer.tasks.len(), 2);

        table.update(TaskId(0), 1, 1);
        table.mark_finished();
        observer.refresh(&table.snapshot());
        assert_eq!(observer.tasks.len(), 1);

        table.update(TaskId(1), 1, 1);
        table.mark_finished();
        observer.finish(&table.snapshot());
        assert!(observer.tasks.is_empty());
    }
}
