use crate::core::attributes::AttributeSchema;
use crate::core::example::Example;
use crate::streams::ExampleStream;
use std::fs::File;
use std::io::{BufRead, BufReader, Error, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Finite stream over a delimiter-separated text file, interpreted through an
/// [`AttributeSchema`].
///
/// Each non-empty, non-comment line must carry one field per schema entry,
/// the target last. Discrete tokens are mapped through the schema
/// vocabularies; lines with unknown tokens or malformed numbers are skipped
/// and counted, so a typo in a large file does not end the run.
pub struct DelimitedFileStream {
    schema: Arc<AttributeSchema>,
    path: PathBuf,
    reader: BufReader<File>,
    delimiter: char,
    exhausted: bool,
    skipped: u64,
}

impl DelimitedFileStream {
    pub fn open<P: AsRef<Path>>(
        path: P,
        schema: Arc<AttributeSchema>,
        delimiter: char,
    ) -> Result<Self, Error> {
        let file = File::open(path.as_ref())?;
        Ok(Self {
            schema,
            path: path.as_ref().to_path_buf(),
            reader: BufReader::new(file),
            delimiter,
            exhausted: false,
            skipped: 0,
        })
    }

    /// Lines rejected so far for not conforming to the schema.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExampleStream for DelimitedFileStream {
    fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    fn has_more_examples(&self) -> bool {
        !self.exhausted
    }

    fn next_example(&mut self) -> Option<Example> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    self.exhausted = true;
                    return None;
                }
                Ok(_) => {}
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.schema.parse_line(trimmed, self.delimiter) {
                Ok(example) => return Some(example),
                Err(_) => {
                    self.skipped += 1;
                    continue;
                }
            }
        }
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.exhausted = false;
        self.skipped = 0;
        Ok(())
    }
}
