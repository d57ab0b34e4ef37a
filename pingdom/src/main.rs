//! Pingdom CLI: list and inspect checks, contacts, teams, probes, and
//! maintenance windows from the terminal.

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use output::OutputFormat;
use pingdom_lib::checks::CheckResponse;
use pingdom_lib::occurrences::ListOccurrenceQuery;
use pingdom_lib::tms::ListTmsQuery;
use pingdom_lib::{format_timestamp_display, Client, ClientConfig, Error, Params, PingdomResponse};
use serde::Serialize;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pingdom")]
#[command(about = "Pingdom CLI: query checks, contacts, teams, probes, and maintenance windows", long_about = None)]
struct Cli {
    /// Output format: plain (human-readable), json (structured).
    #[arg(short, long, default_value = "plain", value_enum, global = true)]
    output: OutputFormatArg,

    /// API token (bearer). Ignored when an API key is also given.
    #[arg(long, env = "PINGDOM_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// API key. Takes precedence over the token.
    #[arg(long, env = "PINGDOM_API_KEY", hide_env_values = true, global = true)]
    key: Option<String>,

    /// Override the API root (e.g. for a proxy).
    #[arg(long, env = "PINGDOM_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Show timestamps in UTC. By default timestamps are shown in local timezone.
    #[arg(long, global = true)]
    utc: bool,

    /// Enable debug logging of API requests (to stderr).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Uptime checks
    Checks {
        #[command(subcommand)]
        action: CheckAction,
    },
    /// Alerting contacts
    Contacts {
        #[command(subcommand)]
        action: ShowAction,
    },
    /// Alerting teams
    Teams {
        #[command(subcommand)]
        action: ShowAction,
    },
    /// List probe servers
    Probes {
        /// Only list active probes
        #[arg(long)]
        only_active: bool,
    },
    /// Maintenance windows
    Maintenance {
        #[command(subcommand)]
        action: ShowAction,
    },
    /// List maintenance occurrences
    Occurrences {
        /// Only occurrences of this maintenance window
        #[arg(long)]
        maintenance_id: Option<i64>,
    },
    /// Transaction (TMS) checks
    Tms {
        #[command(subcommand)]
        action: TmsAction,
    },
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum CheckAction {
    /// List checks
    List {
        /// Only checks carrying these tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one check
    Show { id: i64 },
    /// Delete a check
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ShowAction {
    /// List all
    List,
    /// Show one by id
    Show { id: i64 },
}

#[derive(Subcommand)]
enum TmsAction {
    /// List transaction checks
    List {
        /// Filter by tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one transaction check
    Show { id: i64 },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pingdom_lib=debug,pingdom=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pingdom_lib=warn,pingdom=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if matches!(cli.command, Commands::Version) {
        println!("pingdom {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let config = ClientConfig {
        api_token: cli.token,
        api_key: cli.key,
        base_url: cli.base_url,
        http_client: None,
    };
    let client = match Client::with_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Set PINGDOM_API_TOKEN or PINGDOM_API_KEY, or pass --token / --key.");
            return ExitCode::FAILURE;
        }
    };
    debug!(base_url = client.base_url(), "client ready");

    let printer = Printer {
        format: match cli.output {
            OutputFormatArg::Plain => OutputFormat::Plain,
            OutputFormatArg::Json => OutputFormat::Json,
        },
        use_utc: cli.utc,
    };

    match run(&client, cli.command, &printer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

struct Printer {
    format: OutputFormat,
    use_utc: bool,
}

impl Printer {
    fn list<T, F>(&self, items: &[T], headers: &[&str], row: F) -> Result<(), Error>
    where
        T: Serialize,
        F: Fn(&T) -> Vec<String>,
    {
        match self.format {
            OutputFormat::Plain => {
                let rows: Vec<Vec<String>> = items.iter().map(row).collect();
                print!("{}", output::format_table(headers, &rows));
            }
            OutputFormat::Json => self.json(items)?,
        }
        Ok(())
    }

    fn detail<T: Serialize>(&self, item: &T) -> Result<(), Error> {
        match self.format {
            OutputFormat::Plain => print!("{}", output::format_detail(&serde_json::to_value(item)?)),
            OutputFormat::Json => self.json(item)?,
        }
        Ok(())
    }

    fn message(&self, resp: &PingdomResponse) -> Result<(), Error> {
        match self.format {
            OutputFormat::Plain => println!("{}", resp.message),
            OutputFormat::Json => self.json(resp)?,
        }
        Ok(())
    }

    fn json<T: Serialize + ?Sized>(&self, item: &T) -> Result<(), Error> {
        println!("{}", output::format_json(&serde_json::to_value(item)?)?);
        Ok(())
    }

    fn time(&self, ts: i64) -> String {
        format_timestamp_display(ts, self.use_utc)
    }
}

fn check_row(p: &Printer, c: &CheckResponse) -> Vec<String> {
    vec![
        c.id.to_string(),
        c.name.clone(),
        c.kind
            .as_ref()
            .and_then(|k| k.name())
            .unwrap_or("-")
            .to_string(),
        c.hostname.clone(),
        c.status.clone(),
        c.resolution.to_string(),
        p.time(c.lasttesttime),
    ]
}

fn active_filter_params(only_active: bool) -> Params {
    let mut params = Params::new();
    if only_active {
        params.insert("onlyactive".into(), "true".into());
    }
    params
}

async fn run(client: &Client, cmd: Commands, p: &Printer) -> Result<(), Error> {
    match cmd {
        Commands::Checks { action } => match action {
            CheckAction::List { tags, limit } => {
                let mut params = Params::new();
                if let Some(t) = tags {
                    params.insert("tags".into(), t);
                }
                if let Some(l) = limit {
                    params.insert("limit".into(), l.to_string());
                }
                let checks = client.checks().list(Some(&params)).await?;
                p.list(
                    &checks,
                    &["ID", "NAME", "TYPE", "HOST", "STATUS", "RES", "LAST TEST"],
                    |c| check_row(p, c),
                )?;
            }
            CheckAction::Show { id } => p.detail(&client.checks().read(id).await?)?,
            CheckAction::Delete { id } => p.message(&client.checks().delete(id).await?)?,
        },
        Commands::Contacts { action } => match action {
            ShowAction::List => {
                let contacts = client.contacts().list().await?;
                p.list(&contacts, &["ID", "NAME", "TYPE", "PAUSED", "SMS", "EMAIL"], |c| {
                    vec![
                        c.id.to_string(),
                        c.name.clone(),
                        c.contact_type.clone(),
                        c.paused.to_string(),
                        c.notification_targets.sms.len().to_string(),
                        c.notification_targets.email.len().to_string(),
                    ]
                })?;
            }
            ShowAction::Show { id } => p.detail(&client.contacts().read(id).await?)?,
        },
        Commands::Teams { action } => match action {
            ShowAction::List => {
                let teams = client.teams().list().await?;
                p.list(&teams, &["ID", "NAME", "MEMBERS"], |t| {
                    let members: Vec<&str> = t.members.iter().map(|m| m.name.as_str()).collect();
                    vec![t.id.to_string(), t.name.clone(), members.join(", ")]
                })?;
            }
            ShowAction::Show { id } => p.detail(&client.teams().read(id).await?)?,
        },
        Commands::Probes { only_active } => {
            let params = active_filter_params(only_active);
            let probes = client.probes().list(Some(&params)).await?;
            p.list(
                &probes,
                &["ID", "NAME", "COUNTRY", "REGION", "IP", "ACTIVE"],
                |pr| {
                    vec![
                        pr.id.to_string(),
                        pr.name.clone(),
                        pr.countryiso.clone(),
                        pr.region.clone(),
                        pr.ip.clone(),
                        pr.active.to_string(),
                    ]
                },
            )?;
        }
        Commands::Maintenance { action } => match action {
            ShowAction::List => {
                let windows = client.maintenances().list(None).await?;
                p.list(
                    &windows,
                    &["ID", "DESCRIPTION", "FROM", "TO", "REPEATS"],
                    |m| {
                        vec![
                            m.id.to_string(),
                            m.description.clone(),
                            p.time(m.from.map(|t| t.timestamp()).unwrap_or_default()),
                            p.time(m.to.map(|t| t.timestamp()).unwrap_or_default()),
                            m.recurrencetype
                                .map(|r| r.as_str().to_string())
                                .unwrap_or_else(|| "-".to_string()),
                        ]
                    },
                )?;
            }
            ShowAction::Show { id } => p.detail(&client.maintenances().read(id).await?)?,
        },
        Commands::Occurrences { maintenance_id } => {
            let query = ListOccurrenceQuery {
                maintenance_id,
                ..ListOccurrenceQuery::default()
            };
            let occurrences = client.occurrences().list(&query).await?;
            p.list(&occurrences, &["ID", "MAINTENANCE", "FROM", "TO"], |o| {
                vec![
                    o.id.to_string(),
                    o.maintenanceid.to_string(),
                    p.time(o.from.timestamp()),
                    p.time(o.to.timestamp()),
                ]
            })?;
        }
        Commands::Tms { action } => match action {
            TmsAction::List { tags, limit } => {
                let query = ListTmsQuery {
                    limit,
                    tags,
                    ..ListTmsQuery::default()
                };
                let checks = client.tms_checks().list(&query).await?;
                p.list(
                    &checks,
                    &["ID", "NAME", "TYPE", "STATUS", "ACTIVE", "INTERVAL"],
                    |c| {
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            c.check_type.clone(),
                            c.status.clone(),
                            c.active.to_string(),
                            c.interval.to_string(),
                        ]
                    },
                )?;
            }
            TmsAction::Show { id } => p.detail(&client.tms_checks().read(id).await?)?,
        },
        Commands::Version => {}
    }
    Ok(())
}
