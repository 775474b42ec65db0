use datatier::config::{self, load_config};
use datatier::{execute, open_with, retrieve_all, retrieve_one, ConnectOptions, Row, Value};
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "usage: datatier [--config PATH] one|all|exec SQL [PARAM...]";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    One,
    All,
    Exec,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    mode: Mode,
    sql: String,
    params: Vec<Value>,
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut rest = args;
    let mut config = None;
    if let Some(flag) = rest.first() {
        if flag == "--config" {
            let path = rest.get(1).ok_or("--config needs a path")?;
            config = Some(PathBuf::from(path));
            rest = &rest[2..];
        }
    }

    let (mode, rest) = match rest.split_first() {
        Some((m, rest)) => {
            let mode = match m.as_str() {
                "one" => Mode::One,
                "all" => Mode::All,
                "exec" => Mode::Exec,
                other => return Err(format!("unknown command: {}", other)),
            };
            (mode, rest)
        }
        None => return Err("missing command".to_string()),
    };

    let (sql, params) = rest.split_first().ok_or("missing SQL")?;
    Ok(Invocation {
        config,
        mode,
        sql: sql.clone(),
        params: params.iter().map(|p| Value::parse_literal(p)).collect(),
    })
}

/// `--config` wins, then the `RDS_*` environment, then the default config file.
fn connect_options(config_path: Option<&PathBuf>) -> datatier::Result<ConnectOptions> {
    if let Some(path) = config_path {
        return Ok(load_config(path)?.connect_options());
    }
    match ConnectOptions::from_env() {
        Ok(options) => Ok(options),
        Err(env_err) => match config::default_config_path().filter(|p| p.exists()) {
            Some(path) => Ok(load_config(path)?.connect_options()),
            None => Err(env_err),
        },
    }
}

fn format_row(row: &Row) -> String {
    row.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\t")
}

fn run(invocation: &Invocation) -> datatier::Result<Vec<String>> {
    let options = connect_options(invocation.config.as_ref())?;
    let conn = open_with(&options)?;
    info!(database = %options.database, "connected");

    let sql = invocation.sql.as_str();
    let params = invocation.params.as_slice();
    let lines = match invocation.mode {
        Mode::One => {
            let row = retrieve_one(&conn, sql, params)?;
            if row.is_empty() {
                Vec::new()
            } else {
                vec![format_row(&row)]
            }
        }
        Mode::All => retrieve_all(&conn, sql, params)?.iter().map(format_row).collect(),
        Mode::Exec => vec![execute(&conn, sql, params)?.to_string()],
    };
    Ok(lines)
}

fn main() {
    // Initialize the logging system; stdout is reserved for results
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    match run(&invocation) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
