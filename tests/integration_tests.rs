#![cfg(feature = "cli")]

use clap::Parser;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::path::Path;
use tempfile::TempDir;
use trip_events::domain::model::EVENT_HEADER;
use trip_events::utils::validation::Validate;
use trip_events::{
    compare_results, CliConfig, EtlEngine, EtlError, LinePipeline, LocalStorage, TablePipeline,
};

const TRIPS: &str = "id,duration,start_date,start_station_name,start_station_id,end_date,end_station_name,end_station_id,bike_id,subscription_type,zip_code
4576,63,8/29/2013 14:13,South Van Ness at Market,66,8/29/2013 14:14,South Van Ness at Market,66,520,Subscriber,94127
4607,70,8/29/2013 14:42,San Jose City Hall,10,8/29/2013 14:43,San Jose City Hall,10,661,Subscriber,95138
4130,71,8/29/2013 10:16,Mountain View City Hall,27,8/29/2013 10:17,Mountain View City Hall,27,48,Subscriber,97214
4251,77,8/29/2013 11:29,San Jose City Hall,10,8/29/2013 11:30,San Jose City Hall,10,26,Subscriber,95060
4299,83,8/29/2013 12:02,South Van Ness at Market,66,8/29/2013 12:04,Market at 10th,67,319,Subscriber,94103
";

fn write_input(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("trip.csv");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn cli(input: &str, output: &Path, extra: &[&str]) -> CliConfig {
    let mut args = vec![
        "trip-events".to_string(),
        "--input".to_string(),
        input.to_string(),
        "--output".to_string(),
        output.to_str().unwrap().to_string(),
    ];
    args.extend(extra.iter().map(|arg| arg.to_string()));
    CliConfig::parse_from(args)
}

fn storage() -> LocalStorage {
    LocalStorage::new(String::new())
}

fn read_parquet(path: &Path) -> Vec<arrow::record_batch::RecordBatch> {
    let file = std::fs::File::open(path).unwrap();
    ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_lines_to_csv_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, TRIPS);
    let output = temp_dir.path().join("result");
    let config = cli(&input, &output, &["--mode", "lines", "--format", "csv"]);
    config.validate().unwrap();

    let engine = EtlEngine::new(LinePipeline::new(storage(), storage(), config));
    let run = engine.run().await.unwrap();

    assert_eq!(run.report.pipeline, "lines");
    assert_eq!(run.report.input_rows, 5);
    assert_eq!(run.report.output_rows, 10);
    assert_eq!(run.report.files_written, vec!["part-00000.csv", "part-00001.csv"]);

    let first = std::fs::read_to_string(output.join("part-00000.csv")).unwrap();
    assert!(first.starts_with(
        "4576,63,8/29/2013 14:13,START,South Van Ness at Market,66,520,Subscriber,94127\n\
         4576,63,8/29/2013 14:14,END,South Van Ness at Market,66,520,Subscriber,94127\n"
    ));
    let second = std::fs::read_to_string(output.join("part-00001.csv")).unwrap();
    assert!(second.ends_with("4299,83,8/29/2013 12:04,END,Market at 10th,67,319,Subscriber,94103\n"));
    assert!(output.join("_SUCCESS").exists());
}

#[tokio::test]
async fn test_lines_to_txt_writes_debug_records() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, TRIPS);
    let output = temp_dir.path().join("result");
    let config = cli(&input, &output, &["--mode", "lines", "--format", "txt", "--partitions", "1"]);

    EtlEngine::new(LinePipeline::new(storage(), storage(), config))
        .run()
        .await
        .unwrap();

    let text = std::fs::read_to_string(output.join("part-00000.txt")).unwrap();
    assert_eq!(text.lines().count(), 10);
    assert!(text.lines().all(|line| line.starts_with("EventRecord {")));
    assert!(text.contains("event_action: End"));
}

#[tokio::test]
async fn test_lines_to_parquet_reads_back() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, TRIPS);
    let output = temp_dir.path().join("result");
    let config = cli(&input, &output, &["--mode", "lines", "--partitions", "3"]);

    EtlEngine::new(LinePipeline::new(storage(), storage(), config))
        .run()
        .await
        .unwrap();

    let mut total = 0;
    for index in 0..3 {
        let batches = read_parquet(&output.join(format!("part-{:05}.parquet", index)));
        for batch in &batches {
            let names: Vec<&str> = batch
                .schema_ref()
                .fields()
                .iter()
                .map(|field| field.name().as_str())
                .collect();
            assert_eq!(names, EVENT_HEADER.to_vec());
            total += batch.num_rows();
        }
    }
    assert_eq!(total, 10);
}

#[tokio::test]
async fn test_both_modes_write_subfolders_and_agree() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, TRIPS);
    let output = temp_dir.path().join("result");
    let config = cli(&input, &output, &["--mode", "both"]);
    config.validate().unwrap();

    let lines = EtlEngine::new(LinePipeline::new(storage(), storage(), config.clone()))
        .run()
        .await
        .unwrap();
    let table = EtlEngine::new(TablePipeline::new(storage(), storage(), config))
        .run()
        .await
        .unwrap();

    assert!(output.join("lines/part-00000.parquet").exists());
    assert!(output.join("lines/part-00001.parquet").exists());
    assert!(output.join("lines/_SUCCESS").exists());
    assert!(output.join("table/part-00000.parquet").exists());
    assert!(output.join("table/_SUCCESS").exists());

    let rows: usize = read_parquet(&output.join("table/part-00000.parquet"))
        .iter()
        .map(|batch| batch.num_rows())
        .sum();
    assert_eq!(rows, 10);

    let comparison = compare_results(&lines.data, &table.data).unwrap();
    assert!(comparison.matched(), "{comparison:?}");
    assert_eq!(comparison.line_rows, 10);
}

#[tokio::test]
async fn test_default_run_keeps_source_text_in_both_outputs() {
    let trips = "id,duration,start_date,start_station_name,start_station_id,end_date,end_station_name,end_station_id,bike_id,subscription_type,zip_code
1,0600,2013-08-29 14:13:00,South Van Ness at Market,066,2013-08-29 14:14:00,Market at 10th,67,520,Subscriber,02134
2,1.50,2013-08-29 14:42:00,San Jose City Hall,10,2013-08-29 14:43:00,San Jose City Hall,10,0661,Customer,00501
";
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, trips);
    let output = temp_dir.path().join("result");
    let config = cli(&input, &output, &["--format", "csv"]);
    config.validate().unwrap();

    let lines = EtlEngine::new(LinePipeline::new(storage(), storage(), config.clone()))
        .run()
        .await
        .unwrap();
    let table = EtlEngine::new(TablePipeline::new(storage(), storage(), config))
        .run()
        .await
        .unwrap();

    let comparison = compare_results(&lines.data, &table.data).unwrap();
    assert!(comparison.matched(), "{comparison:?}");

    let written = std::fs::read_to_string(output.join("table/part-00000.csv")).unwrap();
    assert!(written.contains(
        "1,0600,2013-08-29 14:13:00,START,South Van Ness at Market,066,520,Subscriber,02134"
    ));
    assert!(written.contains(
        "2,1.50,2013-08-29 14:43:00,END,San Jose City Hall,10,0661,Customer,00501"
    ));
}

#[tokio::test]
async fn test_table_csv_matches_line_csv_as_multiset() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, TRIPS);
    let lines_out = temp_dir.path().join("lines");
    let table_out = temp_dir.path().join("table");

    EtlEngine::new(LinePipeline::new(
        storage(),
        storage(),
        cli(&input, &lines_out, &["--mode", "lines", "--format", "csv"]),
    ))
    .run()
    .await
    .unwrap();
    EtlEngine::new(TablePipeline::new(
        storage(),
        storage(),
        cli(&input, &table_out, &["--mode", "table", "--format", "csv"]),
    ))
    .run()
    .await
    .unwrap();

    let mut from_lines: Vec<String> = ["part-00000.csv", "part-00001.csv"]
        .iter()
        .flat_map(|name| {
            std::fs::read_to_string(lines_out.join(name))
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    let mut from_table: Vec<String> = std::fs::read_to_string(table_out.join("part-00000.csv"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();

    from_lines.sort();
    from_table.sort();
    assert_eq!(from_lines, from_table);
}

#[tokio::test]
async fn test_malformed_line_aborts_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &format!("{}9999,10,8/29/2013 14:13\n", TRIPS));
    let output = temp_dir.path().join("result");
    let config = cli(&input, &output, &["--mode", "lines", "--format", "csv"]);

    let result = EtlEngine::new(LinePipeline::new(storage(), storage(), config))
        .run()
        .await;

    match result {
        Err(EtlError::MalformedRecord { expected, found, .. }) => {
            assert_eq!(expected, 11);
            assert_eq!(found, 3);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed input should fail"),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_input_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("result");
    let missing = temp_dir.path().join("missing.csv");
    let config = cli(missing.to_str().unwrap(), &output, &["--mode", "table"]);

    let result = EtlEngine::new(TablePipeline::new(storage(), storage(), config))
        .run()
        .await;

    assert!(matches!(result, Err(EtlError::IoError(_))));
}

#[test]
fn test_table_mode_rejects_txt_at_validation() {
    let config = cli("./trip.csv", Path::new("./result"), &["--mode", "table", "--format", "txt"]);
    assert!(matches!(
        config.validate(),
        Err(EtlError::InvalidConfigValueError { .. })
    ));
}
