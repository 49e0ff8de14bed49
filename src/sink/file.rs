use super::{SinkError, format_event, rotation};
use crate::config::FileSinkSpec;
use crate::domain::LogEvent;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// File sink with size/count-bounded rotation.
///
/// The active file is `<path>/<prefix>`. The drain task owns the handle
/// exclusively; rotation runs on the same task, immediately before the
/// write that would overflow `max_size`.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    max_size: u64,
    max_files: u32,
    file: File,
    size: u64,
}

impl FileSink {
    /// Opens the active file. `append = false` truncates it once, here;
    /// `append = true` preserves existing content, whose size counts
    /// toward `max_size` immediately.
    pub async fn open(spec: &FileSinkSpec) -> std::io::Result<Self> {
        let active = spec.path.join(&spec.prefix);
        let file = if spec.append {
            OpenOptions::new().create(true).append(true).open(&active).await?
        } else {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&active)
                .await?
        };
        let size = file.metadata().await?.len();

        Ok(Self {
            dir: spec.path.clone(),
            prefix: spec.prefix.clone(),
            max_size: spec.max_size,
            max_files: spec.max_files,
            file,
            size,
        })
    }

    pub async fn write(&mut self, event: &LogEvent) -> Result<(), SinkError> {
        let mut line = format_event(event);
        line.push('\n');
        let incoming = line.len() as u64;

        if rotation::should_rotate(self.size, incoming, self.max_size) {
            self.rotate().await?;
        }

        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        self.size += incoming;
        Ok(())
    }

    async fn rotate(&mut self) -> Result<(), SinkError> {
        self.file.flush().await.map_err(SinkError::Rotation)?;
        self.file.sync_data().await.map_err(SinkError::Rotation)?;

        // max_files == 1 keeps no history: skip the shift and let the
        // truncating reopen below discard the active file's content.
        if self.max_files > 1 {
            rotation::rotate(&self.dir, &self.prefix, self.max_files)
                .await
                .map_err(SinkError::Rotation)?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.dir.join(&self.prefix))
            .await
            .map_err(SinkError::Rotation)?;
        self.size = 0;
        Ok(())
    }
}
