use gdrive_audit::config::AuditConfig;
use gdrive_audit::report::AssessmentSelection;
use gdrive_audit::runtime::AuditRuntime;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliMode {
    Run {
        selection: AssessmentSelection,
        file_id: Option<String>,
    },
    Help,
}

fn parse_cli_mode<I>(args: I) -> anyhow::Result<CliMode>
where
    I: IntoIterator<Item = String>,
{
    let mut selection = None;
    let mut file_id = None;
    for arg in args.into_iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return Ok(CliMode::Help),
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other if selection.is_none() => {
                selection = Some(match other {
                    "all" => AssessmentSelection::All,
                    "one" => AssessmentSelection::RootCounts,
                    "two" => AssessmentSelection::NestedCounts,
                    "three" => AssessmentSelection::Copy,
                    _ => anyhow::bail!("unknown assessment: {other} (expected all, one, two or three)"),
                });
            }
            other if file_id.is_none() => file_id = Some(other.to_string()),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }
    Ok(CliMode::Run {
        selection: selection.unwrap_or(AssessmentSelection::All),
        file_id,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (selection, file_id) = match parse_cli_mode(std::env::args())? {
        CliMode::Help => {
            println!("Usage: gdrive-audit [all|one|two|three] [FILE_ID]");
            println!("  one     count direct children of the root folder");
            println!("  two     count nested objects per top-level folder");
            println!("  three   copy the whole tree into a new folder");
            println!("FILE_ID defaults to GDRIVE_PARENT_FILE_ID.");
            return Ok(());
        }
        CliMode::Run { selection, file_id } => (selection, file_id),
    };

    let config = AuditConfig::from_env();
    let runtime = AuditRuntime::bootstrap(config).await?;
    runtime.run(selection, file_id.as_deref()).await
}
