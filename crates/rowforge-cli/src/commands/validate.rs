use rowforge_core::api;
use rowforge_core::config::load_generator_config;

use crate::args::{ValidateArgs, EXIT_CONFIG_ERROR, EXIT_OK};

pub fn run(args: &ValidateArgs) -> i32 {
    let config = match load_generator_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let issues = api::validate_config(&config);
    if issues.is_empty() {
        println!(
            "{} is valid: {} column(s), {} rows",
            args.config.display(),
            config.column_name.len(),
            config.num_of_rows
        );
        EXIT_OK
    } else {
        eprintln!("{} has {} issue(s):", args.config.display(), issues.len());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        EXIT_CONFIG_ERROR
    }
}
