use std::time::Instant;
use tracing::info;

/// Counts completed uploads. Owned by the single loop that collects upload
/// results, so it needs no locking.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    start_time: Instant,
    total_bytes: u64,
    processed_bytes: u64,
    total_files: usize,
    processed_files: usize,
}

impl ProgressTracker {
    pub fn new(total_files: usize, total_bytes: u64) -> Self {
        Self {
            start_time: Instant::now(),
            total_bytes,
            processed_bytes: 0,
            total_files,
            processed_files: 0,
        }
    }

    pub fn update(&mut self, file_size: u64) {
        self.processed_bytes += file_size;
        self.processed_files += 1;
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files
    }

    pub fn processed_bytes(&self) -> u64 {
        self.processed_bytes
    }

    pub fn remaining_files(&self) -> usize {
        self.total_files.saturating_sub(self.processed_files)
    }

    fn format_bytes(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;
        const TB: u64 = GB * 1024;

        if bytes >= TB {
            format!("{:.1} TiB", bytes as f64 / TB as f64)
        } else if bytes >= GB {
            format!("{:.1} GiB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MiB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KiB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }

    /// One-line status, e.g. `3/10 files, 1.5 MiB/~4.0 MiB`
    pub fn status(&self) -> String {
        format!(
            "{}/{} files, {}/~{}",
            self.processed_files,
            self.total_files,
            Self::format_bytes(self.processed_bytes),
            Self::format_bytes(self.total_bytes)
        )
    }

    pub fn finish(&self) {
        let total_time = self.start_time.elapsed().as_secs_f64();
        let speed = if total_time > 0.0 {
            self.processed_bytes as f64 / total_time
        } else {
            0.0
        };

        info!(
            "Transfer completed: {} in {} file(s) transferred in {:.1}s ({}/s)",
            Self::format_bytes(self.processed_bytes),
            self.processed_files,
            total_time,
            Self::format_bytes(speed as u64)
        );

        if self.remaining_files() > 0 {
            info!("{} file(s) were not uploaded", self.remaining_files());
        }
    }
}
