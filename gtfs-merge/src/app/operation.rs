use super::{load_merge_config, MergeAppError, MergeOverrides};
use crate::feed::{self, FeedSummary};
use clap::Subcommand;
use gtfs_merge_core::merge::GtfsMerger;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum GtfsMergeOperation {
    /// merge the routes of a secondary feed missing from a priority feed
    Merge {
        /// GTFS directory or zip archive whose content is always kept
        #[arg(long)]
        priority: String,
        /// GTFS directory or zip archive that new routes are taken from
        #[arg(long)]
        secondary: String,
        /// merged feed, a zip archive when the name ends in .zip and a
        /// directory otherwise
        #[arg(long, default_value_t = String::from("MERGED_GTFS.zip"))]
        output: String,
        /// TOML file with merge settings
        #[arg(long)]
        config_file: Option<String>,
        /// namespace of priority identifiers, defaults to the first agency id
        #[arg(long)]
        priority_namespace: Option<String>,
        /// namespace of secondary identifiers, defaults to the first agency id
        #[arg(long)]
        secondary_namespace: Option<String>,
        /// prefix marking identifiers copied from the secondary feed
        #[arg(long)]
        marker: Option<String>,
        /// added to the numeric keys of rows copied from the secondary feed
        #[arg(long)]
        surrogate_offset: Option<u64>,
        #[arg(long)]
        parallelism: Option<usize>,
        /// timezone assigned to every agency of the merged feed
        #[arg(long)]
        timezone: Option<String>,
        /// do not merge fare rules or fares
        #[arg(long)]
        skip_fare_rules: bool,
        #[arg(long)]
        show_progress: bool,
        #[arg(long)]
        overwrite: bool,
        /// reload the written feed with gtfs-structures and print its counts
        #[arg(long)]
        summarize: bool,
    },
    /// summarize attributes of GTFS feeds
    Summary {
        /// GTFS directories, zip archives or URLs
        #[arg(long, required = true)]
        input: Vec<String>,
        #[arg(long, default_value_t = 1)]
        parallelism: usize,
    },
}

impl GtfsMergeOperation {
    pub fn run(&self) -> Result<(), MergeAppError> {
        match self {
            GtfsMergeOperation::Merge {
                priority,
                secondary,
                output,
                config_file,
                priority_namespace,
                secondary_namespace,
                marker,
                surrogate_offset,
                parallelism,
                timezone,
                skip_fare_rules,
                show_progress,
                overwrite,
                summarize,
            } => {
                let overrides = MergeOverrides {
                    marker: marker.clone(),
                    surrogate_offset: *surrogate_offset,
                    parallelism: *parallelism,
                    skip_fare_rules: *skip_fare_rules,
                    normalized_timezone: timezone.clone(),
                    show_progress: *show_progress,
                };
                let config = load_merge_config(config_file.as_deref(), &overrides)?;
                let output_path = Path::new(output);
                if output_path.exists() && !overwrite {
                    return Err(feed::FeedError::OutputExists(output.clone()).into());
                }
                let merger = GtfsMerger::new(config)?;

                let (priority_dataset, secondary_dataset) = rayon::join(
                    || feed::read_dataset(Path::new(priority), priority_namespace.as_deref()),
                    || feed::read_dataset(Path::new(secondary), secondary_namespace.as_deref()),
                );
                let (merged, summary) = merger.merge(priority_dataset?, &secondary_dataset?)?;
                println!("{summary}");

                feed::write_dataset(&merged, output_path, *overwrite)?;
                if *summarize {
                    let result = feed::summarize(output);
                    if !result.is_success() {
                        return Err(MergeAppError::SummaryError {
                            input: output.clone(),
                            message: result.message,
                        });
                    }
                    println!("{}", FeedSummary::HEADER);
                    println!("{output},{result}");
                }
                Ok(())
            }
            GtfsMergeOperation::Summary { input, parallelism } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*parallelism)
                    .build()
                    .map_err(|e| MergeAppError::WorkerPoolError(e.to_string()))?;
                let results: Vec<(&String, FeedSummary)> = pool.install(|| {
                    input
                        .par_iter()
                        .map(|i| (i, feed::summarize(i)))
                        .collect()
                });
                println!("{}", FeedSummary::HEADER);
                for (i, summary) in results.iter() {
                    if !summary.is_success() {
                        log::error!("failed loading '{i}': {}", summary.message);
                    }
                    println!("{i},{summary}");
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_merge_core::model::FeedId;
    use std::path::PathBuf;

    fn write_feed(dir: &Path, agency: &str, routes: &[(&str, &str)]) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join("agency.txt"),
            format!("agency_id,agency_name,agency_url,agency_timezone\n{agency},{agency},https://example.com,Europe/Rome\n"),
        )
        .unwrap();
        let mut route_rows = String::from("route_id,route_short_name,route_type\n");
        let mut trip_rows = String::from("route_id,service_id,trip_id\n");
        let mut stop_time_rows =
            String::from("trip_id,arrival_time,departure_time,stop_id,stop_sequence\n");
        for (route_id, short_name) in routes {
            route_rows.push_str(&format!("{route_id},{short_name},3\n"));
            trip_rows.push_str(&format!("{route_id},WK,T{route_id}\n"));
            stop_time_rows.push_str(&format!("T{route_id},08:00:00,08:00:00,S{route_id},1\n"));
        }
        let stop_rows = routes
            .iter()
            .map(|(route_id, _)| format!("S{route_id},stop {route_id},41.9,12.5\n"))
            .collect::<String>();
        std::fs::write(dir.join("routes.txt"), route_rows).unwrap();
        std::fs::write(dir.join("trips.txt"), trip_rows).unwrap();
        std::fs::write(dir.join("stop_times.txt"), stop_time_rows).unwrap();
        std::fs::write(
            dir.join("stops.txt"),
            format!("stop_id,stop_name,stop_lat,stop_lon\n{stop_rows}"),
        )
        .unwrap();
        std::fs::write(
            dir.join("calendar.txt"),
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\nWK,1,1,1,1,1,0,0,20240101,20241231\n",
        )
        .unwrap();
        dir.to_path_buf()
    }

    fn merge_op(
        priority: &Path,
        secondary: &Path,
        output: &Path,
        overwrite: bool,
    ) -> GtfsMergeOperation {
        GtfsMergeOperation::Merge {
            priority: priority.display().to_string(),
            secondary: secondary.display().to_string(),
            output: output.display().to_string(),
            config_file: None,
            priority_namespace: None,
            secondary_namespace: None,
            marker: None,
            surrogate_offset: None,
            parallelism: Some(2),
            timezone: None,
            skip_fare_rules: false,
            show_progress: false,
            overwrite,
            summarize: false,
        }
    }

    #[test]
    fn test_merge_writes_novel_routes() {
        let dir = tempfile::tempdir().unwrap();
        let priority = write_feed(&dir.path().join("rome"), "ATAC", &[("R1", "10")]);
        let secondary = write_feed(
            &dir.path().join("lazio"),
            "COTRAL",
            &[("R2", "10"), ("R3", "20")],
        );
        let output = dir.path().join("MERGED_GTFS.zip");
        merge_op(&priority, &secondary, &output, false).run().unwrap();

        let merged = feed::read_dataset(&output, Some("MERGED")).unwrap();
        let route_ids = merged
            .routes()
            .values()
            .iter()
            .map(|r| r.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            route_ids,
            vec![
                FeedId::original("MERGED", "R1"),
                FeedId::original("MERGED", "OTHER_COTRAL_R3")
            ]
        );
        assert!(merged.stops().contains(&FeedId::original("MERGED", "OTHER_COTRAL_SR3")));
        assert!(!merged.stops().contains(&FeedId::original("MERGED", "OTHER_COTRAL_SR2")));
        assert_eq!(merged.calendars().len(), 2);
    }

    #[test]
    fn test_merge_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let priority = write_feed(&dir.path().join("rome"), "ATAC", &[("R1", "10")]);
        let secondary = write_feed(&dir.path().join("lazio"), "COTRAL", &[("R3", "20")]);
        let output = dir.path().join("MERGED_GTFS.zip");
        std::fs::write(&output, b"").unwrap();
        let result = merge_op(&priority, &secondary, &output, false).run();
        assert!(matches!(
            result,
            Err(MergeAppError::FeedError(feed::FeedError::OutputExists(_)))
        ));
        merge_op(&priority, &secondary, &output, true).run().unwrap();
    }

    #[test]
    fn test_merge_reports_missing_feed() {
        let dir = tempfile::tempdir().unwrap();
        let priority = write_feed(&dir.path().join("rome"), "ATAC", &[("R1", "10")]);
        let output = dir.path().join("out");
        let result = merge_op(&priority, &dir.path().join("absent"), &output, false).run();
        assert!(matches!(result, Err(MergeAppError::FeedError(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_merged_platform_keeps_its_station() {
        let dir = tempfile::tempdir().unwrap();
        let priority = write_feed(&dir.path().join("rome"), "ATAC", &[("R1", "10")]);
        let secondary = write_feed(&dir.path().join("lazio"), "COTRAL", &[("R3", "20")]);
        std::fs::write(
            secondary.join("stops.txt"),
            "stop_id,stop_name,stop_lat,stop_lon,location_type,parent_station\nSR3,platform,41.9,12.5,0,STA\nSTA,station,41.9,12.5,1,\n",
        )
        .unwrap();
        let output = dir.path().join("merged");
        merge_op(&priority, &secondary, &output, false).run().unwrap();

        let merged = feed::read_dataset(&output, Some("MERGED")).unwrap();
        let station = FeedId::original("MERGED", "OTHER_COTRAL_STA");
        assert!(merged.stops().contains(&station));
        let platform = merged
            .stops()
            .get(&FeedId::original("MERGED", "OTHER_COTRAL_SR3"))
            .unwrap();
        assert_eq!(platform.parent_station, Some(station));
    }
}
