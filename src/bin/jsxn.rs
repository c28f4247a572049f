//! jsxn CLI
//!
//! Derives field sets from JSON and fills records against a declared shape.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use jsxn::{Jsxn, JsxnConfig, OutputFormat, Source};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsxn")]
#[command(about = "Build fixed-field JSON records")]
struct Cli {
    /// Config file (layered over jsxn.toml and JSXN_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format, overriding the config
    #[arg(short, long, global = true, value_enum)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the field names a JSON source defines
    Fields {
        /// JSON text, or "-" for stdin
        source: String,
    },

    /// Fill a record of the given fields from a JSON source
    Fill {
        /// Comma-separated field names
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
        /// Schema name
        #[arg(short, long, default_value = "Record")]
        name: String,
        /// JSON text, or "-" for stdin
        source: String,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Compact,
    Pretty,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Compact => OutputFormat::Compact,
            Format::Pretty => OutputFormat::Pretty,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = JsxnConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    let mut jsxn = Jsxn::from_config(&config);

    match cli.command {
        Commands::Fields { source } => {
            let text = read_source(source)?;
            let schema = jsxn.registry_mut().create("Fields", text)?;
            for field in schema.fields() {
                println!("{}", field);
            }
        }

        Commands::Fill { fields, name, source } => {
            let text = read_source(source)?;
            jsxn.registry_mut().create(&name, Source::Names(fields))?;
            let record = jsxn.construct(&name, text)?;
            println!("{}", record.render(config.output.format));
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn read_source(source: String) -> anyhow::Result<String> {
    if source != "-" {
        return Ok(source);
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading stdin")?;
    Ok(text)
}
