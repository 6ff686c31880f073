use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!("storage: {}", config.storage.value);
                        println!("  source: {}", config.storage.source);
                        println!("a1c_target: {}", config.a1c_target.value);
                        println!("  source: {}", config.a1c_target.source);
                        println!("calorie_target: {}", config.calorie_target.value);
                        println!("  source: {}", config.calorie_target.source);
                        println!();

                        let analysis = &config.analysis;
                        println!("analysis:");
                        println!("  model: {}", analysis.model);
                        println!("  endpoint: {}", analysis.endpoint);
                        println!(
                            "  api_key: {}",
                            if analysis.api_key.is_some() { "(set)" } else { "(not set)" }
                        );
                        println!("  demo_mode: {}", analysis.demo_mode);
                    }
                }
                Ok(())
            }
        }
    }
}
