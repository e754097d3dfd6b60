use std::io;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pathology_datasets::app::{App, body_format, table_view};
use pathology_datasets::catalog::{CatalogClient, CatalogHttpClient};
use pathology_datasets::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use pathology_datasets::domain::{DatasetId, Structure, TaskCategory};
use pathology_datasets::error::CatalogError;
use pathology_datasets::filter::Selection;
use pathology_datasets::output::{JsonOutput, OutputMode, TextOutput};
use pathology_datasets::site::SiteOptions;
use pathology_datasets::tui::Tui;

#[derive(Parser)]
#[command(name = "pathds")]
#[command(about = "Browse, filter and publish a catalog of pathology imaging datasets")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Catalog directory URL, or the URL of its `_datasets.json`
    #[arg(long, global = true, value_name = "URL")]
    catalog: Option<String>,

    #[arg(long, global = true, value_name = "PATH")]
    config: Option<String>,

    #[arg(long, global = true, value_name = "MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List datasets matching the filters")]
    List(FilterArgs),
    #[command(about = "Show the values available to each filter")]
    Facets,
    #[command(about = "Show one dataset by id or detail-page URL")]
    Show(ShowArgs),
    #[command(about = "Browse the catalog interactively")]
    Browse,
    #[command(about = "Write static HTML pages for the matching datasets")]
    Render(RenderArgs),
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    #[arg(long)]
    organ: Option<String>,

    #[arg(long)]
    staining: Option<String>,

    #[arg(long, value_enum)]
    structure: Vec<Structure>,

    #[arg(long, value_enum)]
    task: Vec<TaskCategory>,

    #[arg(long)]
    year: Option<String>,

    /// Case-insensitive substring of the dataset name
    #[arg(long)]
    name: Option<String>,
}

impl FilterArgs {
    fn selection(self) -> Selection {
        Selection {
            organ: self.organ,
            staining: self.staining,
            structure: self.structure.into_iter().collect(),
            tasks: self.task.into_iter().collect(),
            year: self.year,
            name_query: self.name,
        }
    }
}

#[derive(Args)]
struct ShowArgs {
    #[arg(value_name = "ID_OR_URL")]
    target: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long, value_name = "DIR")]
    out: Utf8PathBuf,

    #[arg(long)]
    title: Option<String>,

    /// Embed descriptions as preformatted text instead of rendered Markdown
    #[arg(long)]
    no_markdown: bool,

    #[command(flatten)]
    filters: FilterArgs,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<CatalogError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CatalogError) -> u8 {
    match error {
        CatalogError::NotFound(_)
        | CatalogError::MissingParameter(_)
        | CatalogError::MissingCatalog => 2,
        CatalogError::Http { .. } | CatalogError::Timeout { .. } | CatalogError::Transport(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let command = match (cli.command, output_mode) {
        (Some(command), _) => command,
        (None, OutputMode::Interactive) => Commands::Browse,
        (None, OutputMode::NonInteractive) => {
            return Err(miette::Report::msg(
                "command required (try `pathds --help`)",
            ));
        }
    };

    let overrides = ConfigOverrides {
        catalog_url: cli.catalog,
        timeout_ms: cli.timeout_ms,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;
    tracing::debug!(
        catalog = %config.location.index_url(),
        timeout_ms = config.timeout.as_millis() as u64,
        "config resolved"
    );
    let client = CatalogHttpClient::new(config.timeout)?;
    let app = App::new(client, config.location.clone());

    match command {
        Commands::List(filters) => run_list(&app, filters.selection(), output_mode),
        Commands::Facets => run_facets(&app, output_mode),
        Commands::Show(args) => run_show(&app, args, output_mode),
        Commands::Browse => run_browse(app, output_mode),
        Commands::Render(args) => run_render(&app, args, &config, output_mode),
    }
}

fn run_list<C: CatalogClient>(
    app: &App<C>,
    selection: Selection,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.list(&selection, &JsonOutput)?;
            JsonOutput::print_list(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let catalog = app.catalog(&TextOutput)?;
            let view = table_view(&catalog, &selection);
            TextOutput::write_list(&mut io::stdout().lock(), catalog.len(), &view)
                .into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_facets<C: CatalogClient>(app: &App<C>, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => {
            let options = app.facets(&JsonOutput)?;
            JsonOutput::print_facets(&options).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let options = app.facets(&TextOutput)?;
            TextOutput::write_facets(&mut io::stdout().lock(), &options).into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_show<C: CatalogClient>(
    app: &App<C>,
    args: ShowArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let id = parse_target(args.target)?;
    match output_mode {
        OutputMode::NonInteractive => {
            let detail = app.detail(&id, &JsonOutput)?;
            JsonOutput::print_detail(&detail).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let detail = app.detail(&id, &TextOutput)?;
            TextOutput::write_detail(&mut io::stdout().lock(), &detail).into_diagnostic()?;
        }
    }
    Ok(())
}

fn run_browse<C: CatalogClient + 'static>(
    app: App<C>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => Err(miette::Report::msg(
            "browse needs an interactive terminal (use `pathds list` instead)",
        )),
        OutputMode::Interactive => Tui::new().browse(app),
    }
}

fn run_render<C: CatalogClient>(
    app: &App<C>,
    args: RenderArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let options = SiteOptions {
        title: args.title.unwrap_or_else(|| config.site_title.clone()),
        body_format: body_format(config.render_markdown && !args.no_markdown),
    };
    let selection = args.filters.selection();
    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.render_site(&selection, &args.out, &options, &JsonOutput)?;
            JsonOutput::print_render(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result = app.render_site(&selection, &args.out, &options, &TextOutput)?;
            TextOutput::write_render(&mut io::stdout().lock(), &result).into_diagnostic()?;
        }
    }
    Ok(())
}

/// Accepts a bare dataset id or a detail-page URL carrying `?id=`.
fn parse_target(target: Option<String>) -> Result<DatasetId, CatalogError> {
    let target = target.ok_or_else(|| CatalogError::MissingParameter("id".to_string()))?;
    if target.contains("://") {
        DatasetId::from_page_url(&target)
    } else {
        target.parse()
    }
}
