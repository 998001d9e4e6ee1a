//! route-title CLI - validate route tables and simulate navigations

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use route_title::{
    DocumentTitle, EventLog, FixSuggestion, NavigationBus, NavigationScript, RouteSnapshot,
    RouteTable, RouterEvent, SharedSnapshot, Template, TitleError, TitleSession,
};

/// How long a single navigation may take to be handled
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "route-title")]
#[command(about = "Compute document titles from route tables and navigations")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a routes file
    Validate {
        /// Path to routes YAML
        routes: String,
    },

    /// Replay navigations through a title session and print each title
    Simulate {
        /// Path to routes YAML
        routes: String,

        /// Path to navigations YAML
        navigations: String,

        /// Print the session event log as JSON afterwards
        #[arg(long)]
        events: bool,
    },

    /// Format a template skeleton such as "{0}: {1}"
    Format {
        /// Skeleton with {0}-style positional and {name}-style named placeholders
        template: String,

        /// Positional values
        values: Vec<String>,

        /// JSON object for named placeholders
        #[arg(short, long)]
        dict: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let result = match cli.command {
        Commands::Validate { routes } => validate_routes(&routes),
        Commands::Simulate {
            routes,
            navigations,
            events,
        } => simulate(&routes, &navigations, events).await,
        Commands::Format {
            template,
            values,
            dict,
        } => format_template(&template, values, dict.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.downcast_ref::<TitleError>().and_then(|t| t.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load_routes(path: &str) -> Result<RouteTable> {
    let table = RouteTable::load(path).with_context(|| format!("loading routes from {}", path))?;
    table.validate()?;
    Ok(table)
}

fn validate_routes(path: &str) -> Result<()> {
    let table = load_routes(path)?;

    println!("{} Routes '{}' are valid", "✓".green(), path);
    println!(
        "  Default title: {}",
        table.default_title.as_deref().unwrap_or("(none)")
    );
    println!("  Routes: {}", table.route_count());

    Ok(())
}

async fn simulate(routes_path: &str, navigations_path: &str, print_events: bool) -> Result<()> {
    let table = load_routes(routes_path)?;
    let script = NavigationScript::load(navigations_path)
        .with_context(|| format!("loading navigations from {}", navigations_path))?;

    let document = DocumentTitle::new();
    let bus = NavigationBus::default();
    let snapshots = SharedSnapshot::new(RouteSnapshot::root());

    let mut builder = TitleSession::builder();
    if let Some(title) = &table.default_title {
        builder = builder.initial_title(title.clone());
    }
    if print_events {
        builder = builder.event_log(EventLog::new());
    }
    let mut session = builder.start(
        Arc::new(document.clone()),
        bus.events(),
        Arc::new(snapshots.clone()),
    )?;

    for (index, navigation) in script.navigations.iter().enumerate() {
        let id = index as u64 + 1;
        let before = document.publish_count();

        bus.emit(RouterEvent::NavigationStart {
            id,
            url: navigation.url.clone(),
        });
        snapshots.replace(table.activate(&navigation.url, &navigation.resolved));
        bus.emit(RouterEvent::NavigationEnd {
            id,
            url: navigation.url.clone(),
        });

        wait_for_navigations(&session, index + 1).await?;

        let title = document.current().unwrap_or_default();
        if document.publish_count() > before {
            println!("{} {} {} {}", "→".cyan(), navigation.url, "⇒".dimmed(), title.bold());
        } else {
            println!("{} {} {}", "→".cyan(), navigation.url, "(no title)".dimmed());
        }
    }

    session.teardown();

    if let Some(log) = session.events() {
        println!("{}", serde_json::to_string_pretty(&log.to_json())?);
    }

    Ok(())
}

async fn wait_for_navigations(session: &TitleSession, count: usize) -> Result<()> {
    let waited = tokio::time::timeout(NAVIGATION_TIMEOUT, async {
        while session.navigations_handled() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await;
    if waited.is_err() {
        bail!("navigation {} was not handled within {:?}", count, NAVIGATION_TIMEOUT);
    }
    Ok(())
}

fn format_template(skeleton: &str, values: Vec<String>, dict: Option<&str>) -> Result<()> {
    let template = Template::parse(skeleton)?;

    let mut args: Vec<Value> = values.into_iter().map(Value::String).collect();
    if let Some(dict) = dict {
        let dict: Value = serde_json::from_str(dict).map_err(TitleError::from)?;
        if !dict.is_object() {
            bail!("--dict must be a JSON object");
        }
        args.push(dict);
    }

    println!("{}", template.format(&args));
    Ok(())
}
