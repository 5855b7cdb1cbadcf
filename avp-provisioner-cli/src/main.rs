use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use avp_provisioner::{
    AvpConfig, AvpSettings, Operation, OperationReport, OperationRequest, ProvisionPlan,
    ProvisionerError, ProvisioningService,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::{debug, error, LevelFilter};

/// Exit code for failures reported by the policy-management service.
const EXIT_REMOTE_FAILURE: u8 = 1;
/// Exit code for configuration and local input errors.
const EXIT_LOCAL_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "avp-provisioner", version)]
#[command(
    about = "Create, delete and populate Amazon Verified Permissions policy stores from deployment pipelines",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print a JSON report line on stdout for each completed operation
    #[arg(long, global = true)]
    json: bool,

    /// Exit 0 even when the service rejects an operation (failures are still logged)
    #[arg(long, global = true)]
    ignore_failures: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SettingsArgs {
    /// Serverless-style manifest with `provider.region` and `custom.avp` settings
    #[arg(long, env = "AVP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Policy store ID to reuse, delete or populate
    #[arg(long, env = "AVP_POLICY_STORE_ID", global = true)]
    policy_store_id: Option<String>,

    /// Validation mode for newly created policy stores (OFF or STRICT)
    #[arg(long, env = "AVP_VALIDATION_MODE", global = true)]
    validation_mode: Option<String>,

    /// Path to the Cedar policy statement file
    #[arg(long, env = "AVP_POLICY_PATH", global = true)]
    policy_path: Option<PathBuf>,

    /// Description attached to the static policy
    #[arg(long, env = "AVP_POLICY_DESCRIPTION", global = true)]
    policy_description: Option<String>,

    /// Path to the Cedar JSON schema file
    #[arg(long, env = "AVP_SCHEMA_PATH", global = true)]
    schema_path: Option<PathBuf>,

    /// AWS region (defaults to the manifest, then the AWS environment)
    #[arg(long, env = "AVP_REGION", global = true)]
    region: Option<String>,

    /// What to do when the policy store existence check fails for a reason other than "not found"
    #[arg(long, env = "AVP_ON_CHECK_FAILURE", value_enum, global = true)]
    on_check_failure: Option<OnCheckFailure>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnCheckFailure {
    Create,
    Abort,
}

impl OnCheckFailure {
    fn as_setting(self) -> &'static str {
        match self {
            OnCheckFailure::Create => "create",
            OnCheckFailure::Abort => "abort",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the policy store unless the configured ID already exists
    CreateStore,
    /// Delete the configured policy store
    DeleteStore,
    /// Add the configured static policy to the policy store
    CreatePolicy,
    /// Replace the policy store schema with the configured schema file
    PutSchema,
    /// Run the operation bound to a lifecycle hook (e.g. createPolicyStore:create)
    Hook {
        /// Lifecycle hook name
        name: String,
    },
    /// Create the store if needed, then put the schema and create the policy when configured
    Provision,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(reports) => {
            if cli.json {
                print_reports(&reports);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code(&err, cli.ignore_failures))
        }
    }
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}

async fn run(cli: &Cli) -> Result<Vec<OperationReport>> {
    let config = load_config(&cli.settings).await?;

    let operation = match &cli.command {
        Commands::CreateStore => Operation::CreatePolicyStore,
        Commands::DeleteStore => Operation::DeletePolicyStore,
        Commands::CreatePolicy => Operation::CreateStaticPolicy,
        Commands::PutSchema => Operation::PutSchema,
        Commands::Hook { name } => Operation::from_hook(name)?,
        Commands::Provision => {
            let plan = ProvisionPlan::prepare(&config).await?;
            let service = ProvisioningService::new(&config)
                .await
                .context("Failed to initialize provisioning service")?;
            return match service.provision(&plan).await {
                Ok(reports) => Ok(reports),
                Err(failure) => {
                    // Steps that finished still get their report lines.
                    if cli.json {
                        print_reports(&failure.completed);
                    }
                    Err(failure.error.into())
                }
            };
        }
    };

    // Local inputs are checked before any AWS client is built.
    let request = OperationRequest::prepare(operation, &config).await?;
    debug!("Running {} ({})", request.operation(), operation.hook());

    let service = ProvisioningService::new(&config)
        .await
        .context("Failed to initialize provisioning service")?;
    let report = service.execute(&request).await?;
    Ok(vec![report])
}

async fn load_config(args: &SettingsArgs) -> Result<AvpConfig> {
    let base = match &args.config {
        Some(path) => AvpSettings::from_manifest(path)
            .await
            .context("Failed to load configuration")?,
        None => AvpSettings::default(),
    };
    let overrides = AvpSettings {
        policy_store_id: args.policy_store_id.clone(),
        validation_mode: args.validation_mode.clone(),
        policy_path: args.policy_path.clone(),
        policy_description: args.policy_description.clone(),
        schema_path: args.schema_path.clone(),
        region: args.region.clone(),
        on_check_failure: args.on_check_failure.map(|p| p.as_setting().to_string()),
    };
    let config = AvpConfig::try_from(base.merge(overrides))?;
    debug!("Resolved configuration: {config:?}");
    Ok(config)
}

fn print_reports(reports: &[OperationReport]) {
    for report in reports {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Failed to serialize report: {e}"),
        }
    }
}

fn exit_code(err: &anyhow::Error, ignore_failures: bool) -> u8 {
    let remote = err
        .downcast_ref::<ProvisionerError>()
        .is_some_and(ProvisionerError::is_remote);
    match (remote, ignore_failures) {
        (true, true) => 0,
        (true, false) => EXIT_REMOTE_FAILURE,
        (false, _) => EXIT_LOCAL_FAILURE,
    }
}
