use crate::commands::{run_evaluate, run_import, EvaluateArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use structural_audit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Structural Audit NDT",
    about = "Evaluate non-destructive test readings and serve the NDT wizard API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate NDT readings offline
    Ndt {
        #[command(subcommand)]
        command: NdtCommand,
    },
}

#[derive(Subcommand, Debug)]
enum NdtCommand {
    /// Classify one test's readings and print the tier and recommendation
    Evaluate(EvaluateArgs),
    /// Import a site field log, print its report and optionally submit it
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ndt {
            command: NdtCommand::Evaluate(args),
        } => run_evaluate(args),
        Command::Ndt {
            command: NdtCommand::Import(args),
        } => run_import(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structural_audit::workflows::ndt::{MeasurementValue, NdtTest};

    #[test]
    fn parses_evaluate_with_field_pairs() {
        let cli = Cli::try_parse_from([
            "structural-audit-api",
            "ndt",
            "evaluate",
            "concrete-cover",
            "required_cover=40",
            "measured_cover=29",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Ndt {
                command: NdtCommand::Evaluate(args),
            }) => {
                assert_eq!(args.test, NdtTest::ConcreteCover);
                assert_eq!(
                    args.measurements,
                    vec![
                        ("required_cover".to_string(), MeasurementValue::from("40")),
                        ("measured_cover".to_string(), MeasurementValue::from("29")),
                    ]
                );
                assert!(!args.json);
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_tests() {
        let result = Cli::try_parse_from(["structural-audit-api", "ndt", "evaluate", "radar"]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["structural-audit-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
