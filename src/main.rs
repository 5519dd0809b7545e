use scholar_dal::config::{self, ConnectionConfig, DalConfig};
use scholar_dal::core::db::StatementType;
use scholar_dal::printer::ResultPrinter;
use scholar_dal::{Connector, DalError, Outcome, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

const USAGE: &str =
    "usage: scholar-dal [--config PATH] [--format table|csv|json|markdown] [DATABASE] SQL";

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<String>,
    format: Option<String>,
    database: Option<String>,
    sql: String,
}

fn parse_args(raw: &[String]) -> std::result::Result<Args, String> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().ok_or("--config needs a path")?.clone()),
            "--format" => args.format = Some(iter.next().ok_or("--format needs a value")?.clone()),
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => positional.push(arg.clone()),
        }
    }
    match positional.len() {
        1 => args.sql = positional.remove(0),
        2 => {
            args.sql = positional.remove(1);
            args.database = Some(positional.remove(0));
        }
        _ => return Err(USAGE.to_string()),
    }
    Ok(args)
}

/// Runs the statement; returns its outcome.
fn run(args: &Args) -> Result<Outcome> {
    let config_path = match &args.config {
        Some(path) => Some(PathBuf::from(path)),
        None if args.database.is_none() => config::default_config_path().filter(|p| p.exists()),
        None => None,
    };
    let loaded: Option<DalConfig> = match &config_path {
        Some(path) => Some(config::load_config(path)?),
        None => None,
    };

    let connection = match (&args.database, &loaded) {
        (Some(database), _) => ConnectionConfig::local(database.clone()),
        (None, Some(loaded)) => loaded.connection.clone(),
        (None, None) => {
            return Err(DalError::Config(
                "no database given and no config file found".to_string(),
            ))
        }
    };

    let mut connector = Connector::open(&connection)?;
    if let Some(timeout) = loaded.as_ref().and_then(DalConfig::statement_timeout) {
        connector.set_statement_timeout(Some(timeout));
    }
    let printer = ResultPrinter::new(
        loaded
            .and_then(|c| c.printer)
            .unwrap_or_default(),
    );

    let set = if StatementType::from_sql(&args.sql).returns_rows() {
        connector.get_data(&args.sql, None)?
    } else {
        connector.set_data(&args.sql, None)?
    };

    match args.format.as_deref() {
        None | Some("table") => print!("{}", printer.print_set(&set)),
        Some(format) => print!("{}", printer.export(&set, format)?),
    }
    println!("{}", printer.summary(&set));

    connector.close()?;
    Ok(set.outcome())
}

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    info!("Running statement against {:?}", args.database);
    match run(&args) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
