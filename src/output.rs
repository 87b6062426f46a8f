use anyhow::Context;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;

    /// Human-readable description of where a location key ends up, for logging.
    fn describe_location(&self, location_key: &str, file_extension: &str) -> String {
        format!("{location_key}.{file_extension}")
    }

    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to `<directory>/<key>.<extension>`, replacing any existing file.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
}

impl FileOutput {
    /// Use `directory_path` as the output directory, creating it if it does not exist.
    pub fn create(directory_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let directory_path = directory_path.into();
        std::fs::create_dir_all(&directory_path).with_context(|| {
            format!(
                "Could not create output directory {}",
                directory_path.display()
            )
        })?;

        Ok(Self { directory_path })
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }

    fn path_for(&self, location_key: &str, file_extension: &str) -> PathBuf {
        self.directory_path
            .join(format!("{location_key}.{file_extension}"))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let path = self.path_for(location_key, file_extension);
        let file = File::create(&path)
            .with_context(|| format!("Could not create output file {}", path.display()))?;

        Ok(BufWriter::new(file))
    }

    fn describe_location(&self, location_key: &str, file_extension: &str) -> String {
        self.path_for(location_key, file_extension)
            .display()
            .to_string()
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }

    fn describe_location(&self, location_key: &str, file_extension: &str) -> String {
        <FileOutput as Output>::describe_location(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
