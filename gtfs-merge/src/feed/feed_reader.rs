use super::{
    feed_rows::{
        self, AgencyRow, CalendarDateRow, CalendarRow, FareRow, FareRuleRow, FeedRow,
        FrequencyRow, RouteRow, RowContext, ShapePointRow, StopRow, StopTimeRow, TripRow,
    },
    FeedError, FeedSource,
};
use gtfs_merge_core::{
    dataset::{Dataset, HasTable},
    model::SurrogateKey,
};
use itertools::Itertools;
use kdam::{Bar, BarExt};
use std::path::Path;

/// number of tables read per feed, agency.txt included.
const TABLE_COUNT: usize = 11;

/// reads a GTFS directory or zip archive into a [`Dataset`].
///
/// identifiers are scoped to `namespace`, which defaults to the id of the
/// first agency and then to the file stem. rows of tables without a natural
/// identifier receive surrogate keys counting from 1 in file order.
pub fn read_dataset(path: &Path, namespace: Option<&str>) -> Result<Dataset, FeedError> {
    let source = FeedSource::new(path)?;
    let agencies = read_rows::<AgencyRow>(&source, true)?;
    let namespace = namespace
        .map(String::from)
        .or_else(|| agencies.first().map(|a| a.local_id().to_string()))
        .or_else(|| source.stem())
        .unwrap_or_else(|| String::from("feed"));
    let default_agency = match agencies.as_slice() {
        [single] => Some(single.local_id().to_string()),
        _ => None,
    };
    let ctx = RowContext {
        namespace,
        default_agency,
    };
    let name = source.stem().unwrap_or_else(|| ctx.namespace.clone());
    log::info!(
        "reading GTFS feed '{}' with namespace '{}'",
        path.display(),
        ctx.namespace
    );

    let mut bar = Bar::builder()
        .desc(format!("read {name}"))
        .total(TABLE_COUNT)
        .build()
        .map_err(FeedError::ProgressBarError)?;

    let dataset = Dataset::new(&name);
    insert_rows(&dataset, agencies, &ctx)?;
    let _ = bar.update(1);
    load_table::<RouteRow>(&dataset, &source, &ctx, true)?;
    let _ = bar.update(1);
    load_table::<TripRow>(&dataset, &source, &ctx, true)?;
    let _ = bar.update(1);
    load_table::<StopTimeRow>(&dataset, &source, &ctx, true)?;
    let _ = bar.update(1);
    load_table::<StopRow>(&dataset, &source, &ctx, true)?;
    let _ = bar.update(1);
    load_table::<ShapePointRow>(&dataset, &source, &ctx, false)?;
    let _ = bar.update(1);
    load_table::<CalendarRow>(&dataset, &source, &ctx, false)?;
    let _ = bar.update(1);
    load_table::<CalendarDateRow>(&dataset, &source, &ctx, false)?;
    let _ = bar.update(1);
    load_table::<FrequencyRow>(&dataset, &source, &ctx, false)?;
    let _ = bar.update(1);
    load_table::<FareRow>(&dataset, &source, &ctx, false)?;
    let _ = bar.update(1);
    load_table::<FareRuleRow>(&dataset, &source, &ctx, false)?;
    let _ = bar.update(1);
    eprintln!();

    let counts = dataset
        .table_counts()
        .iter()
        .map(|(table, n)| format!("{table}={n}"))
        .join(", ");
    log::info!("read '{}': {}", dataset.name, counts);
    Ok(dataset)
}

fn read_rows<R: FeedRow>(source: &FeedSource, required: bool) -> Result<Vec<R>, FeedError> {
    match source.read_table(R::FILENAME)? {
        Some(bytes) => feed_rows::parse_rows::<R>(&bytes),
        None if required => Err(FeedError::MissingTable {
            path: source.path().display().to_string(),
            filename: R::FILENAME,
        }),
        None => {
            log::debug!(
                "'{}' has no {}, skipping",
                source.path().display(),
                R::FILENAME
            );
            Ok(vec![])
        }
    }
}

fn load_table<R: FeedRow>(
    dataset: &Dataset,
    source: &FeedSource,
    ctx: &RowContext,
    required: bool,
) -> Result<(), FeedError>
where
    Dataset: HasTable<R::Entity>,
{
    let rows = read_rows::<R>(source, required)?;
    insert_rows(dataset, rows, ctx)
}

fn insert_rows<R: FeedRow>(
    dataset: &Dataset,
    rows: Vec<R>,
    ctx: &RowContext,
) -> Result<(), FeedError>
where
    Dataset: HasTable<R::Entity>,
{
    let entities = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_number = idx + 1;
            row.into_entity(ctx, SurrogateKey(row_number as u64))
                .map_err(|msg| FeedError::InvalidRow {
                    filename: R::FILENAME,
                    row: row_number,
                    msg,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    dataset.extend(entities)?;
    Ok(())
}
