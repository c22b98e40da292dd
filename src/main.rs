//! `sql-catalog`: browse and run the SQL files of a catalog root.

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use sql_catalog::diag::convert_diagnostics_to_reports;
use sql_catalog::input::split_assignment;
use sql_catalog::{
    CallableKind, Catalog, Config, ExecError, Executor, OutputFormat, PgConnector, SourceFile,
    SqlFolder, bind_inputs, build_call, collect_metadata, parse_descriptor, parse_metadata,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sql-catalog", version, about = "Browse and run file-defined SQL queries, functions and procedures")]
struct Cli {
    /// Config file (default: ./sql-catalog.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// PostgreSQL connection string
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Catalog root holding queries/, functions/ and procedures/
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Output format: table, json or csv
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every catalog entry with its signature
    List,
    /// Show the metadata of a function or procedure file
    Show { kind: KindArg, stem: String },
    /// Run a file from queries/ as-is
    Query { stem: String },
    /// Call a function with NAME=VALUE arguments
    Function {
        stem: String,
        #[arg(short = 'a', long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
        /// Print the generated SQL before running it
        #[arg(long)]
        show_sql: bool,
    },
    /// Call a procedure with NAME=VALUE arguments
    Procedure {
        stem: String,
        #[arg(short = 'a', long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
        /// Print the generated SQL before running it
        #[arg(long)]
        show_sql: bool,
    },
    /// Run a procedure file's text in one transaction
    ExecProcedureFile { stem: String },
    /// Create every function in functions/ in the database
    Setup,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Function,
    Procedure,
}

impl From<KindArg> for CallableKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Function => CallableKind::Function,
            KindArg::Procedure => CallableKind::Procedure,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).into_diagnostic()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(root) = cli.root {
        config.catalog.root = root;
    }
    if let Some(format) = cli.format {
        config.display.format = format;
    }

    let catalog = Catalog::load(&config.catalog.root).into_diagnostic()?;

    match cli.command {
        Command::List => list(&catalog),
        Command::Show { kind, stem } => show(&catalog, kind.into(), &stem),
        Command::Query { stem } => {
            let sql = lookup(&catalog, SqlFolder::Queries, &stem)?;
            let rows = executor(&config)?.run_query(sql)?;
            println!("{}", output::render_rows(&rows, config.display.format));
            Ok(())
        }
        Command::Function { stem, args, show_sql } => {
            let sql = prepare_call(&catalog, CallableKind::Function, &stem, &args)?;
            if show_sql {
                println!("{sql}");
            }
            let rows = executor(&config)?.run_function(&sql)?;
            println!("{}", output::render_rows(&rows, config.display.format));
            Ok(())
        }
        Command::Procedure { stem, args, show_sql } => {
            let sql = prepare_call(&catalog, CallableKind::Procedure, &stem, &args)?;
            if show_sql {
                println!("{sql}");
            }
            run_procedure(&config, &sql)
        }
        Command::ExecProcedureFile { stem } => {
            let sql = lookup(&catalog, SqlFolder::Procedures, &stem)?;
            run_procedure(&config, sql)
        }
        Command::Setup => setup(&config, &catalog),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn executor(config: &Config) -> Result<Executor<PgConnector>> {
    let connector = PgConnector::new(&config.database.url).map_err(ExecError::classify)?;
    Ok(Executor::new(connector))
}

fn lookup<'c>(catalog: &'c Catalog, folder: SqlFolder, stem: &str) -> Result<&'c str> {
    catalog.source(folder, stem).ok_or_else(|| {
        miette!(
            help = format!("run `sql-catalog list` to see the files under {}", catalog.root().display()),
            "no file '{stem}.sql' in {folder}/"
        )
    })
}

// ============================================================================
// Commands
// ============================================================================

fn list(catalog: &Catalog) -> Result<()> {
    for folder in SqlFolder::ALL {
        let files = catalog.folder(folder);
        println!("{folder}/ ({})", files.len());
        match folder.callable_kind() {
            None => {
                for stem in files.keys() {
                    println!("  {stem}");
                }
            }
            Some(kind) => {
                let found = collect_metadata(kind, files);
                for stem in files.keys() {
                    match found.get(stem).and_then(|m| m.clone().into_descriptor()) {
                        Some(descriptor) => println!("  {stem}  {descriptor}"),
                        None => println!("  {stem}  (no usable metadata)"),
                    }
                }
            }
        }
    }
    Ok(())
}

fn show(catalog: &Catalog, kind: CallableKind, stem: &str) -> Result<()> {
    let source = lookup(catalog, SqlFolder::for_kind(kind), stem)?;
    let result = parse_metadata(kind, source);

    let file = SourceFile::with_name(source, format!("{}/{stem}.sql", SqlFolder::for_kind(kind)));
    for report in convert_diagnostics_to_reports(&result.diagnostics, &file) {
        eprintln!("{report:?}");
    }

    let Some(metadata) = result.metadata else {
        println!(
            "No metadata found. Add a `-- {}` block to the file.",
            kind.syntax().start_marker
        );
        return Ok(());
    };

    println!("kind:        {}", metadata.kind);
    println!("name:        {}", metadata.name.as_deref().unwrap_or("(missing)"));
    println!("description: {}", metadata.description.as_deref().unwrap_or(""));
    println!("returns:     {}", metadata.returns);
    if metadata.parameters.is_empty() {
        println!("params:      none");
    } else {
        println!("params:");
        for param in &metadata.parameters {
            println!("  {param}");
        }
    }
    Ok(())
}

/// Builds the call text for `stem`, refusing files without usable metadata.
fn prepare_call(catalog: &Catalog, kind: CallableKind, stem: &str, raw_args: &[String]) -> Result<String> {
    let source = lookup(catalog, SqlFolder::for_kind(kind), stem)?;
    let descriptor = parse_descriptor(kind, source).ok_or_else(|| {
        miette!(
            help = format!(
                "add a `-- {}` block with a `name:` field to the file",
                kind.syntax().start_marker
            ),
            "no usable metadata in {}/{stem}.sql",
            SqlFolder::for_kind(kind)
        )
    })?;

    let inputs = raw_args
        .iter()
        .map(|raw| split_assignment(raw))
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()?;
    let args = bind_inputs(&descriptor.parameters, &inputs).into_diagnostic()?;
    Ok(build_call(&descriptor, &args))
}

fn run_procedure(config: &Config, sql: &str) -> Result<()> {
    let outcome = executor(config)?.run_procedure(sql)?;
    for notice in &outcome.notices {
        println!("NOTICE: {notice}");
    }
    println!("Procedure executed successfully.");
    Ok(())
}

fn setup(config: &Config, catalog: &Catalog) -> Result<()> {
    let sources = catalog.folder(SqlFolder::Functions);
    if sources.is_empty() {
        return Err(miette!(
            "no function files found in {}",
            catalog.root().join(SqlFolder::Functions.dir_name()).display()
        ));
    }

    let report = executor(config)?.install(sources)?;
    for stem in &report.installed {
        println!("  ok      {stem}");
    }
    for (stem, err) in &report.failed {
        println!("  FAILED  {stem}: {err}");
    }
    println!("{}/{} functions created", report.installed.len(), report.total());

    if report.is_success() {
        Ok(())
    } else {
        Err(miette!(
            help = "functions that already exist with a different signature must be dropped first",
            "{} of {} functions failed to install",
            report.failed.len(),
            report.total()
        ))
    }
}
