use indicatif::{ProgressBar, ProgressStyle};
use rowforge_core::config::{load_batch_config, load_generator_config, load_stream_config};
use rowforge_core::orchestrator::ModeHints;
use rowforge_core::{api, RunStatus};

use crate::args::{GenerateArgs, EXIT_CONFIG_ERROR, EXIT_OK, EXIT_RUNTIME_ERROR};

pub fn run(args: &GenerateArgs) -> i32 {
    let config = match load_generator_config(&args.config) {
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

    let mut hints = ModeHints::default();
    if let Some(stream_path) = &args.stream {
        match load_stream_config(stream_path) {
            Ok(stream) => hints.stream = Some(stream),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_CONFIG_ERROR;
            }
        }
    }
    if let Some(batch_path) = &args.batch {
        match load_batch_config(batch_path) {
            Ok(batch) => hints.batch = Some(batch),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_CONFIG_ERROR;
            }
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template"),
    );
    spinner.set_message(format!(
        "Generating {} rows for '{}'...",
        config.num_of_rows,
        config.config_name()
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let summary = api::run(config, hints, args.perf);
    spinner.finish_and_clear();

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("Error rendering summary: {}", e),
        }
    } else {
        println!(
            "{}: {} rows in {} chunk(s), columns: [{}]",
            match summary.status {
                RunStatus::Success => "Success",
                RunStatus::Failed => "Failed",
            },
            summary.rows_generated,
            summary.chunks,
            summary.columns.join(", ")
        );
        if let Some(writer) = &summary.writer {
            for file in &writer.files {
                println!("  wrote {}", file.display());
            }
            if let Some(endpoint) = &writer.endpoint {
                println!("  delivered to {}", endpoint);
            }
        }
        let errors = &summary.errors;
        if errors.total() > 0 {
            println!(
                "  issues: {} critical, {} error, {} warning",
                errors.critical, errors.error, errors.warning
            );
        }
        if let Some(perf) = &summary.perf {
            println!("  perf: {} ms total", perf.total_millis);
            for phase in &perf.phases {
                println!("    {}: {} ms", phase.name, phase.millis);
            }
        }
    }

    match summary.status {
        RunStatus::Success => EXIT_OK,
        RunStatus::Failed => EXIT_RUNTIME_ERROR,
    }
}
