use super::{
    feed_rows::{
        AgencyRow, CalendarDateRow, CalendarRow, FareRow, FareRuleRow, FeedRow, FrequencyRow,
        RouteRow, ShapePointRow, StopRow, StopTimeRow, TripRow,
    },
    FeedError,
};
use gtfs_merge_core::dataset::{Dataset, HasTable};
use std::{fs::File, io::Write, path::Path};
use zip::{write::SimpleFileOptions, ZipWriter};

/// every table this writer produces, in GTFS file order.
const TABLE_FILENAMES: [&str; 11] = [
    AgencyRow::FILENAME,
    RouteRow::FILENAME,
    TripRow::FILENAME,
    StopTimeRow::FILENAME,
    StopRow::FILENAME,
    ShapePointRow::FILENAME,
    CalendarRow::FILENAME,
    CalendarDateRow::FILENAME,
    FrequencyRow::FILENAME,
    FareRow::FILENAME,
    FareRuleRow::FILENAME,
];

/// writes a dataset as a GTFS feed. the output is a zip archive when its
/// extension is `.zip` and a directory otherwise. empty tables are not
/// written; when a directory is overwritten its previous tables are removed
/// first, so none of them outlive the new feed.
pub fn write_dataset(dataset: &Dataset, output: &Path, overwrite: bool) -> Result<(), FeedError> {
    let output_str = output.display().to_string();
    if output.exists() && !overwrite {
        return Err(FeedError::OutputExists(output_str));
    }
    let is_zip = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or_default();
    if is_zip {
        write_archive(dataset, output)?;
    } else {
        if overwrite && output.is_dir() {
            remove_tables(output)?;
        }
        write_directory(dataset, output)?;
    }
    log::info!("wrote '{}' to {}", dataset.name, output_str);
    Ok(())
}

/// receives each non-empty table of a dataset as csv bytes.
trait TableSink {
    fn write_table(&mut self, filename: &str, bytes: &[u8]) -> Result<(), FeedError>;
}

struct ArchiveSink {
    zip: ZipWriter<File>,
    path: String,
}

impl TableSink for ArchiveSink {
    fn write_table(&mut self, filename: &str, bytes: &[u8]) -> Result<(), FeedError> {
        self.zip
            .start_file(filename, SimpleFileOptions::default())
            .map_err(|e| write_error(&self.path, e))?;
        self.zip
            .write_all(bytes)
            .map_err(|e| write_error(&self.path, e))
    }
}

struct DirectorySink<'a> {
    dir: &'a Path,
}

impl TableSink for DirectorySink<'_> {
    fn write_table(&mut self, filename: &str, bytes: &[u8]) -> Result<(), FeedError> {
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(|e| write_error(&path.display().to_string(), e))
    }
}

fn write_archive(dataset: &Dataset, output: &Path) -> Result<(), FeedError> {
    let path = output.display().to_string();
    let file = File::create(output).map_err(|e| write_error(&path, e))?;
    let mut sink = ArchiveSink {
        zip: ZipWriter::new(file),
        path,
    };
    write_tables(dataset, &mut sink)?;
    sink.zip.finish().map_err(|e| write_error(&sink.path, e))?;
    Ok(())
}

fn write_directory(dataset: &Dataset, output: &Path) -> Result<(), FeedError> {
    std::fs::create_dir_all(output)
        .map_err(|e| write_error(&output.display().to_string(), e))?;
    write_tables(dataset, &mut DirectorySink { dir: output })
}

/// removes the GTFS tables of an existing output directory. other files are
/// left alone.
fn remove_tables(dir: &Path) -> Result<(), FeedError> {
    for filename in TABLE_FILENAMES {
        let path = dir.join(filename);
        if path.is_file() {
            log::debug!("removing previous {}", path.display());
            std::fs::remove_file(&path)
                .map_err(|e| write_error(&path.display().to_string(), e))?;
        }
    }
    Ok(())
}

fn write_tables(dataset: &Dataset, sink: &mut dyn TableSink) -> Result<(), FeedError> {
    write_table::<AgencyRow>(dataset, sink)?;
    write_table::<RouteRow>(dataset, sink)?;
    write_table::<TripRow>(dataset, sink)?;
    write_table::<StopTimeRow>(dataset, sink)?;
    write_table::<StopRow>(dataset, sink)?;
    write_table::<ShapePointRow>(dataset, sink)?;
    write_table::<CalendarRow>(dataset, sink)?;
    write_table::<CalendarDateRow>(dataset, sink)?;
    write_table::<FrequencyRow>(dataset, sink)?;
    write_table::<FareRow>(dataset, sink)?;
    write_table::<FareRuleRow>(dataset, sink)
}

fn write_table<R: FeedRow>(dataset: &Dataset, sink: &mut dyn TableSink) -> Result<(), FeedError>
where
    Dataset: HasTable<R::Entity>,
{
    let entities = <Dataset as HasTable<R::Entity>>::table(dataset).values();
    if entities.is_empty() {
        return Ok(());
    }
    let mut writer = csv::Writer::from_writer(vec![]);
    for entity in entities.iter() {
        writer
            .serialize(R::from_entity(entity))
            .map_err(|e| write_error(R::FILENAME, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| write_error(R::FILENAME, e))?;
    log::debug!("writing {} rows to {}", entities.len(), R::FILENAME);
    sink.write_table(R::FILENAME, &bytes)
}

fn write_error(path: &str, e: impl std::fmt::Display) -> FeedError {
    FeedError::WriteError {
        path: path.to_string(),
        msg: e.to_string(),
    }
}
