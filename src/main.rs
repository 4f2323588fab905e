use clap::Parser;
use trip_events::adapters::location::Location;
use trip_events::core::compare::Comparison;
use trip_events::domain::model::PipelineKind;
use trip_events::domain::ports::{ConfigProvider, Preview};
use trip_events::utils::error::ErrorSeverity;
use trip_events::utils::{logger, validation::Validate};
use trip_events::{
    compare_results, connect, CliConfig, EtlEngine, EtlError, LinePipeline, TablePipeline,
    TomlConfig,
};

const PREVIEW_ROWS: usize = 20;
const MISMATCH_EXIT_CODE: i32 = 4;

struct RunOptions {
    show: bool,
    json_report: bool,
    monitor: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 任務檔 (若有指定)
    let toml = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        },
        None => None,
    };

    let verbose = cli.verbose || toml.as_ref().and_then(|t| t.log_level()) == Some("debug");
    if cli.log_json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    let options = RunOptions {
        show: cli.show,
        json_report: cli.json_report,
        monitor: cli.monitor || toml.as_ref().is_some_and(TomlConfig::monitoring_enabled),
    };
    if options.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = match toml {
        Some(config) => {
            tracing::info!("Starting {} from {:?}", config.app_name(), cli.config);
            execute(config, &options).await
        }
        None => {
            tracing::info!("Starting {}", cli.app_name);
            tracing::debug!("CLI config: {:?}", cli);
            execute(cli, &options).await
        }
    };

    match result {
        Ok(Some(comparison)) if !comparison.matched() => {
            tracing::error!(
                "❌ Outputs differ: {} rows only in lines, {} rows only in table",
                comparison.only_in_lines,
                comparison.only_in_table
            );
            eprintln!("❌ The line and table outputs are not the same multiset of rows");
            std::process::exit(MISMATCH_EXIT_CODE);
        }
        Ok(_) => {
            tracing::info!("✅ Trip events written");
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            std::process::exit(exit_code(e.severity()));
        }
    }

    Ok(())
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

/// Runs the selected pipelines and, with both, compares their outputs.
async fn execute<C>(config: C, options: &RunOptions) -> Result<Option<Comparison>, EtlError>
where
    C: ConfigProvider + Validate + Clone + 'static,
{
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let settings = config.storage_settings();
    let source = connect(&Location::parse(config.input_path())?, settings).await?;
    let sink = connect(&Location::parse(config.output_path())?, settings).await?;
    let mode = config.mode();
    let mut reports = Vec::new();

    let lines = if mode.runs(PipelineKind::Lines) {
        let pipeline = LinePipeline::new(source.clone(), sink.clone(), config.clone());
        let output = EtlEngine::new_with_monitoring(pipeline, options.monitor).run().await?;
        if options.show {
            println!("{}", output.data.preview(PREVIEW_ROWS)?);
        }
        reports.push(output.report);
        Some(output.data)
    } else {
        None
    };

    let table = if mode.runs(PipelineKind::Table) {
        let pipeline = TablePipeline::new(source, sink, config.clone());
        let output = EtlEngine::new_with_monitoring(pipeline, options.monitor).run().await?;
        if options.show {
            println!("{}", output.data.preview(PREVIEW_ROWS)?);
        }
        reports.push(output.report);
        Some(output.data)
    } else {
        None
    };

    let comparison = match (&lines, &table) {
        (Some(lines), Some(table)) => {
            let comparison = compare_results(lines, table)?;
            tracing::info!(
                "🔎 Compared {} line rows with {} table rows: {}",
                comparison.line_rows,
                comparison.table_rows,
                if comparison.matched() { "match" } else { "mismatch" }
            );
            Some(comparison)
        }
        _ => None,
    };

    if options.json_report {
        let report = serde_json::json!({
            "app_name": config.app_name(),
            "mode": mode.to_string(),
            "runs": reports,
            "comparison": comparison,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for report in &reports {
            println!(
                "✅ [{}] {} trips -> {} events in {} ms",
                report.pipeline, report.input_rows, report.output_rows, report.elapsed_ms
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
    }

    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_exits_non_zero() {
        assert_eq!(exit_code(ErrorSeverity::Medium), 2);
        assert_eq!(exit_code(ErrorSeverity::High), 1);
        assert_eq!(exit_code(ErrorSeverity::Critical), 3);
        assert_ne!(MISMATCH_EXIT_CODE, 0);
    }
}
