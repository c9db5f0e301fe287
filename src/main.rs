use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use wrapto_bridge::application::bridge::Bridge;
use wrapto_bridge::domain::message::ActorName;
use wrapto_bridge::domain::ports::AuditStoreBox;
use wrapto_bridge::infrastructure::in_memory::{DryRunWallet, InMemoryAuditStore};
use wrapto_bridge::interfaces::csv::message_reader::MessageReader;
use wrapto_bridge::interfaces::csv::order_writer::OrderWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input messages CSV file (from,to,order_id,receiver,amount)
    input: PathBuf,

    /// Name of the relay side this bridge settles for.
    #[arg(long, default_value = ActorName::PACTUS)]
    actor: String,

    /// Path to persistent audit database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Capacity of the bridge inbox.
    #[arg(long, default_value_t = 64)]
    capacity: usize,
}

fn in_memory_store() -> (AuditStoreBox, AuditStoreBox) {
    let store = InMemoryAuditStore::new();
    (Box::new(store.clone()), Box::new(store))
}

/// Returns two handles on the same audit store: one for the bridge, one for
/// registering orders and reporting.
#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<(AuditStoreBox, AuditStoreBox)> {
    use wrapto_bridge::infrastructure::rocksdb::RocksDBAuditStore;

    if let Some(path) = db_path {
        let store = RocksDBAuditStore::open(path).into_diagnostic()?;
        return Ok((Box::new(store.clone()), Box::new(store)));
    }
    Ok(in_memory_store())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<(AuditStoreBox, AuditStoreBox)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_store())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let (bridge_store, store) = open_store(cli.db_path)?;

    let (bridge, handle) = Bridge::channel(
        ActorName::new(&cli.actor),
        Box::new(DryRunWallet::new()),
        bridge_store,
        cli.capacity.max(1),
    );
    let worker = tokio::spawn(bridge.run());

    let canceller = handle.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling bridge");
            canceller.cancel();
        }
    });

    let file = std::fs::File::open(&cli.input).into_diagnostic()?;
    for msg_result in MessageReader::new(file).messages() {
        let msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                eprintln!("Error reading message: {e}");
                continue;
            }
        };
        let order_id = &msg.payload.id;
        if let Some(existing) = store.get_order(order_id).await.into_diagnostic()? {
            warn!(%order_id, status = %existing.status, "order already registered, skipping");
            continue;
        }
        store.add_order(msg.payload.clone()).await.into_diagnostic()?;
        if handle.send(msg).await.is_err() {
            // The bridge stopped; its result is reported below.
            break;
        }
    }
    handle.close();

    worker.await.into_diagnostic()?.into_diagnostic()?;

    let orders = store.all_orders().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}
