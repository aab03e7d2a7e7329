use anyhow::anyhow;
use formatx::formatx;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::str::from_utf8;
use std::sync::Arc;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each output to its own file in a directory. The template takes the
/// location key then the file extension, e.g. `"house_{}.{}"`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn file_name(&self, location_key: &str, file_extension: &str) -> anyhow::Result<String> {
        formatx!(&self.file_template, location_key, file_extension).map_err(|err| {
            anyhow!(
                "Could not build a file name from template '{}': {err:?}",
                self.file_template
            )
        })
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = self.file_name(location_key, file_extension)?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
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

/// Keeps every "file" in memory, keyed by `{location_key}.{file_extension}`,
/// for callers that want the CSVs as strings rather than on disk.
#[derive(Clone, Debug, Default)]
pub struct StringOutput(Arc<Mutex<IndexMap<String, String>>>);

impl StringOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, file_name: &str) -> Option<String> {
        self.0.lock().get(file_name).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.0.lock().keys().cloned().collect()
    }
}

impl Output for StringOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = format!("{location_key}.{file_extension}");
        // a fresh writer replaces anything previously written under the same name
        self.0.lock().insert(file_name.clone(), String::new());
        Ok(FileLikeStringWriter {
            files: self.0.clone(),
            file_name,
        })
    }
}

impl Output for &StringOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <StringOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// Represents a writer for an individual "file" within a [`StringOutput`].
struct FileLikeStringWriter {
    files: Arc<Mutex<IndexMap<String, String>>>,
    file_name: String,
}

impl Write for FileLikeStringWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let utf8 = from_utf8(buf).map_err(|_| {
            io::Error::new(ErrorKind::InvalidData, "Tried to write out invalid UTF-8.")
        })?;
        self.files
            .lock()
            .entry(self.file_name.clone())
            .or_default()
            .push_str(utf8);
        Ok(utf8.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_collect_files_in_memory() {
        let output = StringOutput::new();
        {
            let mut writer = output.writer_for_location_key("results", "csv").unwrap();
            write!(writer, "a,b\n1,2\n").unwrap();
        }
        let mut writer = output
            .writer_for_location_key("results_summary", "csv")
            .unwrap();
        writer.write_all(b"total\n").unwrap();

        assert_eq!(
            output.file_names(),
            vec!["results.csv".to_string(), "results_summary.csv".to_string()]
        );
        assert_eq!(output.get("results.csv").unwrap(), "a,b\n1,2\n");
        assert_eq!(output.get("results_summary.csv").unwrap(), "total\n");
        assert!(!output.is_noop());
    }

    #[rstest]
    fn should_reject_invalid_utf8() {
        let output = StringOutput::new();
        let mut writer = output.writer_for_location_key("results", "csv").unwrap();
        assert!(writer.write(&[0xff, 0xfe]).is_err());
    }

    #[rstest]
    fn should_fill_file_template() {
        let output = FileOutput::new(PathBuf::from("/tmp"), "house_{}.{}".to_string());
        assert_eq!(
            output.file_name("results_summary", "csv").unwrap(),
            "house_results_summary.csv"
        );
    }

    #[rstest]
    fn should_discard_everything_in_sink() {
        let output = SinkOutput;
        assert!(output.is_noop());
        let mut writer = output.writer_for_location_key("results", "csv").unwrap();
        writer.write_all(b"ignored").unwrap();
    }
}
