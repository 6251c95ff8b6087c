use crate::evaluation::Snapshot;
use serde_json::json;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

pub enum CurveFormat {
    Csv,
    Tsv,
    Json,
}

/// Sequence of [`Snapshot`]s taken during an evaluation run.
#[derive(Default)]
pub struct LearningCurve {
    entries: Vec<Snapshot>,
}

impl LearningCurve {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn export<P: AsRef<Path>>(&self, path: P, format: CurveFormat) -> Result<(), Error> {
        match format {
            CurveFormat::Csv => self.export_with_delimiter(path, ','),
            CurveFormat::Tsv => self.export_with_delimiter(path, '\t'),
            CurveFormat::Json => self.export_json(path),
        }
    }

    fn export_with_delimiter<P: AsRef<Path>>(&self, path: P, delimiter: char) -> Result<(), Error> {
        let mut w = File::create(path)?;
        write!(w, "examples_seen")?;
        if let Some(first) = self.entries.first() {
            for m in &first.metrics {
                write!(w, "{delimiter}{}", m.name)?;
            }
        }
        writeln!(w, "{delimiter}ram_hours{delimiter}seconds")?;
        for s in &self.entries {
            write!(w, "{}", s.examples_seen)?;
            for m in &s.metrics {
                write!(w, "{delimiter}{:.12}", m.value)?;
            }
            writeln!(w, "{delimiter}{:.12}{delimiter}{:.6}", s.ram_hours, s.seconds)?;
        }
        Ok(())
    }

    fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut w = File::create(path)?;
        let rows: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|s| {
                let mut row = serde_json::Map::new();
                row.insert("examples_seen".into(), json!(s.examples_seen));
                for m in &s.metrics {
                    row.insert(m.name.clone(), json!(m.value));
                }
                row.insert("ram_hours".into(), json!(s.ram_hours));
                row.insert("seconds".into(), json!(s.seconds));
                serde_json::Value::Object(row)
            })
            .collect();
        serde_json::to_writer_pretty(&mut w, &rows).map_err(Error::other)?;
        writeln!(w)?;
        Ok(())
    }
}
