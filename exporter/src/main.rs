//! FAOSTAT export CLI
//!
//! # Commands
//!
//! ```bash
//! faostat-export production                     # QCL milk & dairy volumes, 2014-2023
//! faostat-export prices --years 2020-2024       # PP raw milk prices
//! faostat-export codes QCL                      # Item code list as CSV on stdout
//! faostat-export data QCL --item 882 --years 2022,2023
//! ```
//!
//! Global options (`--base-url`, `--lang`, `--set timeout=300`) apply to every
//! command. Progress goes to stderr; exported paths and CSV go to stdout.

use clap::{Args, Parser, Subcommand};
use faostat::config::parse_option;
use faostat::export::presets::parse_years;
use faostat::logs::log_error;
use faostat::{
    export_dataset, get_data, write_csv, write_csv_to, ClientConfig, CodeList, DisplayOptions,
    ErrorKind, ExportError, ExportRequest, FaostatClient, Filters, Language, Table,
    DEFAULT_BASE_URL,
};
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "faostat-export")]
#[command(about = "Export FAOSTAT production and price statistics to CSV", long_about = None)]
struct Cli {
    /// FAOSTAT API root
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Response language (en, fr, es)
    #[arg(long, global = true, default_value = "en")]
    lang: Language,

    /// Client option as KEY=VALUE (repeatable), e.g. --set timeout=300
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    options: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export milk and dairy production volumes (QCL)
    Production(ExportArgs),

    /// Export raw milk producer prices (PP)
    Prices(ExportArgs),

    /// Print a code list as CSV
    Codes {
        /// Domain code
        domain: String,

        /// Classification to list
        #[arg(short, long, default_value = "items")]
        category: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a data table by item codes and years
    Data {
        /// Domain code
        domain: String,

        /// Item codes (repeatable or comma-separated)
        #[arg(long = "item", required = true, value_delimiter = ',')]
        items: Vec<i64>,

        /// Years, e.g. 2014-2023 or 2015,2017
        #[arg(long)]
        years: String,

        /// Include notes and null values
        #[arg(long)]
        verbose_rows: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Domain code (default: the preset's)
    #[arg(long)]
    domain: Option<String>,

    /// Item label (repeatable; replaces the preset's list)
    #[arg(long = "item", value_name = "LABEL")]
    items: Vec<String>,

    /// Years, e.g. 2014-2023 or 2015,2017
    #[arg(long)]
    years: Option<String>,

    /// Filename template ({dataset}, {describe}, {n_items}, {n_years}, {timestamp})
    #[arg(long)]
    template: Option<String>,

    /// Directory for the exported file
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Check one item/year before the full fetch
    #[arg(long, conflicts_with = "no_probe")]
    probe: bool,

    /// Skip the availability check
    #[arg(long)]
    no_probe: bool,
}

impl ExportArgs {
    fn apply(self, preset: ExportRequest) -> Result<ExportRequest, ExportError> {
        let mut request = preset.with_output_dir(self.out_dir);

        if let Some(domain) = self.domain {
            request = request.with_domain(domain);
        }
        if !self.items.is_empty() {
            request = request.with_labels(self.items);
        }
        if let Some(years) = self.years {
            request = request.with_years(parse_years(&years)?);
        }
        if let Some(template) = self.template {
            request = request.with_template(template);
        }
        if self.probe {
            request = request.with_probe(true);
        } else if self.no_probe {
            request = request.with_probe(false);
        }

        Ok(request)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = match build_client(&cli) {
        Ok(client) => match cli.command {
            Commands::Production(args) => cmd_export(&client, ExportRequest::production(), args).await,
            Commands::Prices(args) => cmd_export(&client, ExportRequest::prices(), args).await,
            Commands::Codes {
                domain,
                category,
                output,
            } => cmd_codes(&client, &domain, &category, output.as_deref()).await,
            Commands::Data {
                domain,
                items,
                years,
                verbose_rows,
                output,
            } => cmd_data(&client, &domain, items, &years, verbose_rows, output.as_deref()).await,
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        report_error(e.as_ref());
        std::process::exit(1);
    }
}

fn build_client(cli: &Cli) -> Result<FaostatClient, ExportError> {
    let options = cli
        .options
        .iter()
        .map(|raw| parse_option(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let config = ClientConfig::new(&cli.base_url)?
        .with_language(cli.lang)
        .configure(options)?;

    Ok(FaostatClient::new(config)?)
}

async fn cmd_export(
    client: &FaostatClient,
    preset: ExportRequest,
    args: ExportArgs,
) -> Result<(), Box<dyn Error>> {
    let request = args.apply(preset)?;

    eprintln!(
        "📄 Exporting {}: {} labels, {} years ({}–{})",
        request.domain,
        request.labels.len(),
        request.years.len(),
        request.years.first().copied().unwrap_or_default(),
        request.years.last().copied().unwrap_or_default(),
    );

    let outcome = export_dataset(client, &request).await?;

    eprintln!("\n✨ Done! {} rows, {} items", outcome.table.len(), outcome.codes.len());
    println!("{}", outcome.path.display());
    Ok(())
}

async fn cmd_codes(
    client: &FaostatClient,
    domain: &str,
    category: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let list = CodeList::fetch(client, category, domain).await?;
    write_table(list.table(), output)
}

async fn cmd_data(
    client: &FaostatClient,
    domain: &str,
    items: Vec<i64>,
    years: &str,
    verbose_rows: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let filters = Filters::new()
        .with("item", items)
        .with("year", parse_years(years)?);
    let display = DisplayOptions::default()
        .with_notes(verbose_rows)
        .with_null_values(verbose_rows);

    let table = get_data(client, domain, &filters, &display).await?;
    write_table(&table, output)
}

fn write_table(table: &Table, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            write_csv(table, path)?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => write_csv_to(table, io::stdout().lock())?,
    }
    Ok(())
}

fn report_error(err: &(dyn Error + 'static)) {
    let message = err.to_string();
    log_error(format!("Error: {}", message));

    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            eprintln!("   caused by: {}", text);
        }
        source = cause.source();
    }

    if let Some(export_err) = err.downcast_ref::<ExportError>() {
        for hint in hints(export_err.root_kind()) {
            eprintln!("   💡 {}", hint);
        }
    }
}

fn hints(kind: ErrorKind) -> &'static [&'static str] {
    match kind {
        ErrorKind::NoMatch => &[
            "Compare the labels with `faostat-export codes <DOMAIN>`",
            "Labels must match exactly, including commas and case",
        ],
        ErrorKind::Configuration => &["Client options are set as --set timeout=<seconds>"],
        ErrorKind::ResourceNotFound => &["Check that the domain code exists in FAOSTAT"],
        ErrorKind::RequestTimeout => &[
            "Reduce the scope (fewer items or years)",
            "Raise the timeout with --set timeout=<seconds>",
        ],
        ErrorKind::Http | ErrorKind::Network => &[
            "Check that the domain contains data for the selected items",
            "Retry later; the service may be temporarily unavailable",
        ],
        _ => &[],
    }
}
