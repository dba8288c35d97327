use comfy_table::{presets::UTF8_FULL, Table};
use rowforge_core::api;

use crate::args::{StrategiesArgs, EXIT_OK, EXIT_RUNTIME_ERROR};

pub fn run(args: &StrategiesArgs) -> i32 {
    if args.describe {
        match serde_json::to_string_pretty(&api::describe_strategies()) {
            Ok(rendered) => {
                println!("{}", rendered);
                EXIT_OK
            }
            Err(e) => {
                eprintln!("Error rendering schemas: {}", e);
                EXIT_RUNTIME_ERROR
            }
        }
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Strategy", "Description", "Unique"]);
        for schema in api::describe_strategies().values() {
            table.add_row(vec![
                schema.name,
                schema.description,
                if schema.supports_unique { "yes" } else { "" },
            ]);
        }
        println!("{}", table);
        EXIT_OK
    }
}
