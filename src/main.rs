use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payflow::application::service::PaymentService;
use payflow::domain::payment::PaymentId;
use payflow::domain::ports::PaymentStoreBox;
use payflow::infrastructure::gateway::SimulatedGateway;
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
#[cfg(feature = "storage-rocksdb")]
use payflow::infrastructure::rocksdb::RocksDbPaymentStore;
use payflow::interfaces::api::{CreatePaymentRequest, PaymentEndpoints};
use payflow::interfaces::csv::record_writer::RecordWriter;
use payflow::interfaces::csv::request_reader::{RequestOp, RequestReader, RequestRecord};
use payflow::interfaces::idempotency::{IdempotencyCache, IdempotencyGuard};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment requests CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Deadline in milliseconds for each settlement charge
    #[arg(long, default_value_t = 5000)]
    charge_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let store: PaymentStoreBox = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Box::new(RocksDbPaymentStore::open(db_path).into_diagnostic()?),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "this build has no persistent storage; rebuild with the storage-rocksdb feature"
            ));
        }
        None => Box::new(InMemoryPaymentStore::new()),
    };

    let service = PaymentService::new(store, Box::new(SimulatedGateway::new()))
        .with_charge_timeout(Duration::from_millis(cli.charge_timeout_ms));
    let endpoints = PaymentEndpoints::new(service, IdempotencyGuard::new(IdempotencyCache::new()));

    // Process requests
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    let mut refs: HashMap<String, PaymentId> = HashMap::new();
    for request_result in reader.requests() {
        match request_result {
            Ok(request) => dispatch(&endpoints, &mut refs, request).await,
            Err(e) => {
                eprintln!("Error reading request: {}", e);
            }
        }
    }

    // Output final state
    let records = endpoints.into_records().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());
    writer.write_records(records).into_diagnostic()?;

    Ok(())
}

async fn dispatch(
    endpoints: &PaymentEndpoints,
    refs: &mut HashMap<String, PaymentId>,
    request: RequestRecord,
) {
    let token = request.idempotency_key.as_deref();
    match request.op {
        RequestOp::Create => {
            let (Some(amount), Some(currency)) = (request.amount, request.currency.as_deref())
            else {
                tracing::warn!(reference = %request.r#ref, "create request missing amount or currency");
                return;
            };

            let response = endpoints
                .create(
                    CreatePaymentRequest {
                        amount,
                        currency: currency.to_string(),
                    },
                    token,
                )
                .await;

            if response.is_success() && !request.r#ref.is_empty() {
                if let Some(id) = created_id(&response.body) {
                    refs.insert(request.r#ref.clone(), id);
                }
            }
            tracing::info!(reference = %request.r#ref, status = response.status, "create handled");
        }
        RequestOp::Confirm => {
            let Some(id) = resolve(refs, &request.r#ref) else {
                tracing::warn!(reference = %request.r#ref, "unknown payment reference");
                return;
            };
            let response = endpoints.confirm(&id.to_string(), token).await;
            tracing::info!(reference = %request.r#ref, status = response.status, "confirm handled");
        }
        RequestOp::Get => {
            let Some(id) = resolve(refs, &request.r#ref) else {
                tracing::warn!(reference = %request.r#ref, "unknown payment reference");
                return;
            };
            let response = endpoints.get(&id.to_string()).await;
            tracing::info!(reference = %request.r#ref, status = response.status, "get handled");
        }
    }
}

/// Resolves a file-local alias bound by an earlier `create`, falling back to
/// parsing the reference as a raw payment id.
fn resolve(refs: &HashMap<String, PaymentId>, reference: &str) -> Option<PaymentId> {
    refs.get(reference)
        .copied()
        .or_else(|| reference.parse().ok())
}

fn created_id(body: &str) -> Option<PaymentId> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["id"].as_str()?.parse().ok()
}
