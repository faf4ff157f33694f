//! The `micro` command: read and write settings, or idle as a service.

use clap::{Args, Parser, Subcommand, ValueEnum};
use micro_config::{ConfigService, SettingCodec, Timestamp};
use tracing::info;

use crate::bootstrap::AppContext;
use crate::error::{AppError, AppResult};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "micro", about = "Shared runtime settings for micro services")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a stored setting.
    Get(GetArgs),
    /// Store a setting, replacing any previous value.
    Set(SetArgs),
    /// Stay up until SIGINT or SIGTERM.
    Run,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Setting name.
    name: String,
    /// Printed when the setting is absent.
    #[arg(long)]
    default: Option<String>,
    /// How the stored value is interpreted.
    #[arg(long = "as", value_enum, default_value_t = ValueKind::Text)]
    kind: ValueKind,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Setting name.
    name: String,
    /// New value.
    value: String,
    /// How the value is validated before storing.
    #[arg(long = "as", value_enum, default_value_t = ValueKind::Text)]
    kind: ValueKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ValueKind {
    #[default]
    Text,
    Timestamp,
}

impl Cli {
    /// Execute the parsed command against a bootstrapped context.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails, a value is malformed, or the
    /// signal listener stops.
    pub async fn run(self, context: AppContext) -> AppResult<()> {
        match self.command {
            Command::Get(args) => {
                if let Some(value) = read_setting(context.config(), &args).await? {
                    println!("{value}");
                }
                Ok(())
            }
            Command::Set(args) => write_setting(context.config(), &args).await,
            Command::Run => context.wait_for_shutdown().await,
        }
    }
}

async fn read_setting(config: &ConfigService, args: &GetArgs) -> AppResult<Option<String>> {
    let stored = match args.kind {
        ValueKind::Text => config.get(&args.name).await,
        ValueKind::Timestamp => config
            .get_with(&args.name, Timestamp)
            .await
            .map(|value| value.map(|value| Timestamp.encode(&value))),
    }
    .map_err(|err| AppError::config("cli.get", err))?;
    Ok(stored.or_else(|| args.default.clone()))
}

async fn write_setting(config: &ConfigService, args: &SetArgs) -> AppResult<()> {
    let stored = match args.kind {
        ValueKind::Text => config.set(&args.name, &args.value).await,
        ValueKind::Timestamp => {
            let value = Timestamp
                .decode(&args.value)
                .map_err(|_| AppError::InvalidArgument {
                    field: "value",
                    reason: "malformed_timestamp",
                    value: args.value.clone(),
                })?;
            config.set_with(&args.name, Timestamp, &value).await
        }
    };
    stored.map_err(|err| AppError::config("cli.set", err))?;
    info!(name = %args.name, "setting updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use micro_test_support::fixtures::TempSqlite;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid arguments")
    }

    fn get_args(cli: Cli) -> GetArgs {
        match cli.command {
            Command::Get(args) => args,
            other => panic!("expected get, found {other:?}"),
        }
    }

    fn set_args(cli: Cli) -> SetArgs {
        match cli.command {
            Command::Set(args) => args,
            other => panic!("expected set, found {other:?}"),
        }
    }

    #[test]
    fn parses_get_with_default_and_kind() {
        let args = get_args(parse(&[
            "micro",
            "get",
            "last_run",
            "--default",
            "never",
            "--as",
            "timestamp",
        ]));
        assert_eq!(args.name, "last_run");
        assert_eq!(args.default.as_deref(), Some("never"));
        assert_eq!(args.kind, ValueKind::Timestamp);

        let args = get_args(parse(&["micro", "get", "region"]));
        assert_eq!(args.kind, ValueKind::Text);
        assert!(args.default.is_none());
    }

    #[test]
    fn rejects_unknown_kind_and_missing_value() {
        assert!(Cli::try_parse_from(["micro", "get", "x", "--as", "json"]).is_err());
        assert!(Cli::try_parse_from(["micro", "set", "x"]).is_err());
        assert!(matches!(parse(&["micro", "run"]).command, Command::Run));
    }

    #[tokio::test]
    async fn set_then_get_through_commands() -> anyhow::Result<()> {
        let db = TempSqlite::new()?;
        let config = ConfigService::connect(db.url()).await?;

        write_setting(&config, &set_args(parse(&["micro", "set", "region", "eu"]))).await?;
        let value = read_setting(&config, &get_args(parse(&["micro", "get", "region"]))).await?;
        assert_eq!(value.as_deref(), Some("eu"));

        let missing = get_args(parse(&["micro", "get", "absent", "--default", "none"]));
        assert_eq!(read_setting(&config, &missing).await?.as_deref(), Some("none"));
        Ok(())
    }

    #[tokio::test]
    async fn timestamps_are_canonicalised_on_write() -> anyhow::Result<()> {
        let db = TempSqlite::new()?;
        let config = ConfigService::connect(db.url()).await?;

        let args = set_args(parse(&[
            "micro",
            "set",
            "last_run",
            "2024-05-01 08:00:00.5",
            "--as",
            "timestamp",
        ]));
        write_setting(&config, &args).await?;
        assert_eq!(
            config.get("last_run").await?.as_deref(),
            Some("2024-05-01 08:00:00.500000")
        );

        let read = get_args(parse(&["micro", "get", "last_run", "--as", "timestamp"]));
        assert_eq!(
            read_setting(&config, &read).await?.as_deref(),
            Some("2024-05-01 08:00:00.500000")
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_timestamp_is_rejected_before_writing() -> anyhow::Result<()> {
        let db = TempSqlite::new()?;
        let config = ConfigService::connect(db.url()).await?;

        let args = set_args(parse(&["micro", "set", "last_run", "soon", "--as", "timestamp"]));
        let err = write_setting(&config, &args)
            .await
            .expect_err("malformed timestamp must fail");
        assert!(matches!(
            err,
            AppError::InvalidArgument {
                reason: "malformed_timestamp",
                ..
            }
        ));
        assert_eq!(config.get("last_run").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn reading_malformed_timestamp_fails() -> anyhow::Result<()> {
        let db = TempSqlite::new()?;
        let config = ConfigService::connect(db.url()).await?;
        config.set("last_run", "soon").await?;

        let read = get_args(parse(&[
            "micro",
            "get",
            "last_run",
            "--as",
            "timestamp",
            "--default",
            "never",
        ]));
        let err = read_setting(&config, &read)
            .await
            .expect_err("malformed stored value must fail");
        assert!(matches!(err, AppError::Config { operation: "cli.get", .. }));
        Ok(())
    }
}
