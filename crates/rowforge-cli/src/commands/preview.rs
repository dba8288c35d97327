use comfy_table::{presets::UTF8_FULL, Table};
use rowforge_core::config::load_generator_config;
use rowforge_core::orchestrator::ModeHints;
use rowforge_core::{api, RunStatus};

use crate::args::{PreviewArgs, EXIT_CONFIG_ERROR, EXIT_OK, EXIT_RUNTIME_ERROR};

pub fn run(args: &PreviewArgs) -> i32 {
    let mut config = match load_generator_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let issues = api::validate_config(&config);
    if !issues.is_empty() {
        eprintln!("Configuration is invalid:");
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        return EXIT_CONFIG_ERROR;
    }

    // Sample in memory: cap the row count and drop the file sinks.
    config.num_of_rows = args.rows.max(1);
    config.file_writer.clear();

    let summary = api::run(config, ModeHints::default(), false);
    if summary.status == RunStatus::Failed {
        eprintln!("Preview run failed");
        return EXIT_RUNTIME_ERROR;
    }

    let rows = summary.data.unwrap_or_default();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(summary.columns.clone());
    for row in &rows {
        let cells: Vec<String> = summary
            .columns
            .iter()
            .map(|col| match row.get(col) {
                Some(serde_json::Value::Null) | None => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
    EXIT_OK
}
