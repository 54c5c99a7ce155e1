//! # Pilosa CLI Entry Point
//!
//! Runs one client operation against a Pilosa cluster and prints the result.
//!
//! ## Usage
//!
//! ```bash
//! # Create a database, ignoring it if it already exists
//! pilosa create-db repository --ensure
//!
//! # Create a frame with a custom row label
//! pilosa create-frame repository stargazer --row-label repo_id
//!
//! # Run a query against two hosts (round-robin)
//! pilosa -H db1:10101 -H db2:10101 query repository "Bitmap(id=5, frame='stargazer')"
//!
//! # Print the schema
//! pilosa schema | jq .
//! ```
//!
//! Results are written to stdout as JSON; logs go to stderr and are
//! controlled by `RUST_LOG` (default `warn`).

use anyhow::Result;
use argh::FromArgs;
use pilosa_client::{ClientConfig, PilosaClient};
use pilosa_common::{Database, QueryOptions};
use std::time::Duration;

#[derive(FromArgs)]
/// Pilosa - command-line client for Pilosa clusters
struct Cli {
    /// server address, repeat for a cluster (default: $PILOSA_HOSTS or http://localhost:10101)
    #[argh(option, short = 'H', long = "host")]
    hosts: Vec<String>,

    /// request timeout in milliseconds
    #[argh(option, long = "timeout-ms", default = "30000")]
    timeout_ms: u64,

    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Query(QueryArgs),
    Schema(SchemaArgs),
    CreateDb(CreateDbArgs),
    DeleteDb(DeleteDbArgs),
    CreateFrame(CreateFrameArgs),
    DeleteFrame(DeleteFrameArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "query")]
/// run a query and print the results as JSON
struct QueryArgs {
    /// database to query
    #[argh(positional)]
    database: String,

    /// query text, e.g. "Bitmap(id=1, frame='stargazer')"
    #[argh(positional)]
    query: String,

    /// also return the profiles of columns in bitmap results
    #[argh(switch, long = "profiles")]
    profiles: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "schema")]
/// print the databases and frames known to the server
struct SchemaArgs {}

#[derive(FromArgs)]
#[argh(subcommand, name = "create-db")]
/// create a database
struct CreateDbArgs {
    /// database name
    #[argh(positional)]
    name: String,

    /// column label
    #[argh(option, long = "column-label", default = "\"profileID\".into()")]
    column_label: String,

    /// succeed if the database already exists
    #[argh(switch, long = "ensure")]
    ensure: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "delete-db")]
/// delete a database
struct DeleteDbArgs {
    /// database name
    #[argh(positional)]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "create-frame")]
/// create a frame in a database
struct CreateFrameArgs {
    /// database name
    #[argh(positional)]
    database: String,

    /// frame name
    #[argh(positional)]
    name: String,

    /// row label
    #[argh(option, long = "row-label", default = "\"id\".into()")]
    row_label: String,

    /// succeed if the frame already exists
    #[argh(switch, long = "ensure")]
    ensure: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "delete-frame")]
/// delete a frame from a database
struct DeleteFrameArgs {
    /// database name
    #[argh(positional)]
    database: String,

    /// frame name
    #[argh(positional)]
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Logs go to stderr so stdout stays clean for piping to jq
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let env_hosts = std::env::var(pilosa_cli::HOSTS_ENV_VAR).ok();
    let cluster = pilosa_cli::resolve_cluster(&cli.hosts, env_hosts.as_deref())?;
    tracing::debug!("Dispatching to hosts: {:?}", cluster.hosts());

    let config =
        ClientConfig::default().with_request_timeout(Duration::from_millis(cli.timeout_ms));
    let client = PilosaClient::with_config(cluster, config);

    run(&client, cli.command).await
}

async fn run(client: &PilosaClient, command: Commands) -> Result<()> {
    match command {
        Commands::Query(args) => {
            let database = Database::new(args.database)?;
            let options = QueryOptions::default().with_profiles(args.profiles);
            let response = client
                .query_with_options(&database, &args.query, &options)
                .await?
                .into_result()?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Commands::Schema(_) => {
            let schema = client.schema().await?;
            println!("{}", serde_json::to_string(&schema)?);
        }
        Commands::CreateDb(args) => {
            let database = Database::with_column_label(args.name, args.column_label)?;
            if args.ensure {
                client.ensure_database_exists(&database).await?;
            } else {
                client.create_database(&database).await?;
            }
            tracing::info!("Database {} ready", database.name());
        }
        Commands::DeleteDb(args) => {
            let database = Database::new(args.name)?;
            client.delete_database(&database).await?;
            tracing::info!("Database {} deleted", database.name());
        }
        Commands::CreateFrame(args) => {
            let frame = Database::new(args.database)?
                .frame_with_row_label(args.name, args.row_label)?;
            if args.ensure {
                client.ensure_frame_exists(&frame).await?;
            } else {
                client.create_frame(&frame).await?;
            }
            tracing::info!("Frame {} ready", frame.name());
        }
        Commands::DeleteFrame(args) => {
            let frame = Database::new(args.database)?.frame(args.name)?;
            client.delete_frame(&frame).await?;
            tracing::info!("Frame {} deleted", frame.name());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_query() {
        let args: Cli = Cli::from_args(&["pilosa"], &["query", "repository", "Bitmap(id=1)"]).unwrap();
        assert!(args.hosts.is_empty());
        assert_eq!(args.timeout_ms, 30000); // default
        match args.command {
            Commands::Query(QueryArgs { database, query, profiles }) => {
                assert_eq!(database, "repository");
                assert_eq!(query, "Bitmap(id=1)");
                assert!(!profiles);
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_parse_query_with_profiles_and_hosts() {
        let args: Cli = Cli::from_args(&["pilosa"], &[
            "-H", "db1:10101",
            "--host", "db2:10101",
            "--timeout-ms", "500",
            "query", "--profiles", "repository", "Bitmap(id=1)",
        ]).unwrap();
        assert_eq!(args.hosts, vec!["db1:10101".to_string(), "db2:10101".to_string()]);
        assert_eq!(args.timeout_ms, 500);
        match args.command {
            Commands::Query(QueryArgs { profiles, .. }) => assert!(profiles),
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_parse_schema() {
        let args: Cli = Cli::from_args(&["pilosa"], &["schema"]).unwrap();
        assert!(matches!(args.command, Commands::Schema(_)));
    }

    #[test]
    fn test_cli_parse_create_db() {
        let args: Cli = Cli::from_args(&["pilosa"], &["create-db", "repository"]).unwrap();
        match args.command {
            Commands::CreateDb(CreateDbArgs { name, column_label, ensure }) => {
                assert_eq!(name, "repository");
                assert_eq!(column_label, "profileID"); // default
                assert!(!ensure);
            }
            _ => panic!("Expected CreateDb command"),
        }
    }

    #[test]
    fn test_cli_parse_create_db_ensure() {
        let args: Cli = Cli::from_args(&["pilosa"], &[
            "create-db", "repository", "--column-label", "user", "--ensure",
        ]).unwrap();
        match args.command {
            Commands::CreateDb(CreateDbArgs { column_label, ensure, .. }) => {
                assert_eq!(column_label, "user");
                assert!(ensure);
            }
            _ => panic!("Expected CreateDb command"),
        }
    }

    #[test]
    fn test_cli_parse_create_frame() {
        let args: Cli = Cli::from_args(&["pilosa"], &[
            "create-frame", "repository", "stargazer", "--row-label", "repo_id",
        ]).unwrap();
        match args.command {
            Commands::CreateFrame(CreateFrameArgs { database, name, row_label, ensure }) => {
                assert_eq!(database, "repository");
                assert_eq!(name, "stargazer");
                assert_eq!(row_label, "repo_id");
                assert!(!ensure);
            }
            _ => panic!("Expected CreateFrame command"),
        }
    }

    #[test]
    fn test_cli_parse_delete_commands() {
        let args: Cli = Cli::from_args(&["pilosa"], &["delete-db", "repository"]).unwrap();
        assert!(matches!(args.command, Commands::DeleteDb(DeleteDbArgs { ref name }) if name == "repository"));

        let args: Cli = Cli::from_args(&["pilosa"], &["delete-frame", "repository", "stargazer"]).unwrap();
        match args.command {
            Commands::DeleteFrame(DeleteFrameArgs { database, name }) => {
                assert_eq!(database, "repository");
                assert_eq!(name, "stargazer");
            }
            _ => panic!("Expected DeleteFrame command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::from_args(&["pilosa"], &[]).is_err());
    }

    #[test]
    fn test_cli_query_requires_query_text() {
        assert!(Cli::from_args(&["pilosa"], &["query", "repository"]).is_err());
    }
}
