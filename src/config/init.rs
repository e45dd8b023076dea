use anyhow::Result;
use std::path::PathBuf;

use super::schema::validate_config;
use super::{get_config_path, save_config, Config, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::prompt::{prompt_with_default, prompt_yes_no};

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, it is offered as the save location.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Podium Configuration Wizard");
    println!("===========================");
    println!();

    let config = loop {
        println!("The results console talks to the results store over HTTP.");
        let api_url = prompt_with_default("Results store URL", DEFAULT_API_URL)?;

        println!();
        println!("Requests that take longer than this are abandoned (e.g. 15s, 1m).");
        let request_timeout = prompt_with_default("Request timeout", DEFAULT_REQUEST_TIMEOUT)?;

        println!();
        println!("Exported workbooks are written here.");
        let export_dir = prompt_with_default("Export directory", ".")?;
        let export_dir = if export_dir == "." {
            None
        } else {
            Some(PathBuf::from(export_dir))
        };

        let candidate = Config {
            api_url,
            request_timeout,
            export_dir,
        };
        match validate_config(&candidate) {
            Ok(()) => break candidate,
            Err(errors) => {
                println!();
                for e in errors {
                    println!("  Invalid: {}", e);
                }
                println!("  Try again.");
                println!();
            }
        }
    };

    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `podium categories` to check the connection.");

    Ok(())
}
