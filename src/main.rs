use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use wifipay::application::events::TracingObserver;
use wifipay::config::WifiPayConfig;
use wifipay::domain::checkout::CheckoutOutcome;
use wifipay::domain::package::{PackageType, format_price};
use wifipay::domain::payment::PaymentMethod;
use wifipay::domain::voucher::{Countdown, VoucherCode};
use wifipay::error::WifiPayError;
use wifipay::infrastructure::simulated::simulated_pipeline;
use wifipay::interfaces::batch::{run_batch, selection_from_row};
use wifipay::interfaces::csv::checkout_reader::CheckoutRow;
use wifipay::interfaces::trigger::PayTrigger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the simulated provider outcomes (random when omitted).
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Skip the simulated network delays.
    #[arg(long, global = true)]
    instant: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the packages on offer
    Packages,
    /// Buy a package with mobile money
    Checkout {
        #[arg(long)]
        package: Option<PackageType>,
        #[arg(long)]
        method: Option<PaymentMethod>,
        /// Subscriber number; anything but digits is ignored
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Run one checkout per row of a `package,method,phone` CSV file
    Batch {
        input: PathBuf,
    },
    /// Show how long a voucher has left
    Status {
        code: String,
        #[arg(long)]
        package: PackageType,
        /// Seconds since the voucher was issued
        #[arg(long, default_value_t = 0)]
        elapsed_secs: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    wifipay::telemetry::init("info");
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WifiPayConfig::load(path).into_diagnostic()?,
        None => WifiPayConfig::default(),
    };
    if cli.instant {
        config = config.instant();
    }
    let catalog = config.catalog().into_diagnostic()?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let pipeline = simulated_pipeline(&config, rng);

    match cli.command {
        Command::Packages => {
            for package in catalog.entries() {
                println!(
                    "{}\t{}\t{}\t{}",
                    package.package_type(),
                    package.display_name(),
                    package.price_label(),
                    package.package_type().validity_label()
                );
            }
        }
        Command::Checkout {
            package,
            method,
            phone,
            format,
        } => {
            let row = CheckoutRow {
                package,
                method,
                phone: phone.unwrap_or_default(),
            };
            let selection = selection_from_row(&row, &catalog);
            info!("{}", selection.trigger_label());

            let trigger = PayTrigger::new();
            let outcome = trigger
                .press(&pipeline, &selection, &TracingObserver)
                .await
                .ok_or_else(|| miette!("A checkout is already in flight"))?;

            print_outcome(&outcome, format, &config)?;
            if let Some(failure) = outcome.as_failure() {
                return Err(WifiPayError::CheckoutError(failure.clone())).into_diagnostic();
            }
        }
        Command::Batch { input } => {
            let file = File::open(input).into_diagnostic()?;
            let stdout = io::stdout();
            let summary = run_batch(
                &pipeline,
                &catalog,
                &config.country_code,
                &TracingObserver,
                file,
                stdout.lock(),
            )
            .await
            .into_diagnostic()?;
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                skipped = summary.skipped,
                revenue = %format_price(summary.revenue),
                "Batch finished"
            );
            for (method, totals) in &summary.by_method {
                info!(
                    method = %method,
                    succeeded = totals.succeeded,
                    failed = totals.failed,
                    revenue = %format_price(totals.revenue),
                    share_pct = summary.method_share(*method),
                    "Payment method totals"
                );
            }
        }
        Command::Status {
            code,
            package,
            elapsed_secs,
        } => {
            let code = VoucherCode::parse(&code).into_diagnostic()?;
            let countdown =
                Countdown::since_issue(package.validity(), Duration::from_secs(elapsed_secs));
            println!("Voucher: {code}");
            println!(
                "Status: {}",
                if countdown.is_expired() { "expired" } else { "active" }
            );
            println!("Time remaining: {countdown}");
        }
    }

    Ok(())
}

fn print_outcome(
    outcome: &CheckoutOutcome,
    format: OutputFormat,
    config: &WifiPayConfig,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcome).into_diagnostic()?;
            println!("{json}");
        }
        OutputFormat::Text => match outcome {
            CheckoutOutcome::Success(receipt) => {
                let package = receipt.request.package();
                println!("Payment successful!");
                println!("Voucher: {}", receipt.voucher_code);
                println!(
                    "Package: {} ({}), {}",
                    package.display_name(),
                    package.price_label(),
                    package.package_type().validity_label()
                );
                println!(
                    "Sent to: {}",
                    receipt.request.phone().international(&config.country_code)
                );
                println!("Transaction: {}", receipt.transaction_id);
            }
            CheckoutOutcome::Failure { failure } => {
                println!("{}", failure.user_message());
            }
        },
    }
    Ok(())
}
