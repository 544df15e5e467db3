use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

/// Pool sizing for the room service's traffic shape: many small, short
/// transactions, dominated by per-player state relay during play. Each
/// request holds a connection only for a handful of point reads/writes, so a
/// modest pool with a short acquire timeout beats a large one; a caller that
/// cannot get a connection within a second is better served by an error than
/// by queueing behind a burst.
const POOL_MAX_CONNECTIONS: u32 = 50;
const POOL_MIN_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(1);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Rooms go quiet between matches; let idle connections drain fairly fast.
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Establish a pooled connection to the database.
///
/// Per-statement sqlx logging stays off: `update_state` traffic would flood
/// the log at play-time call rates. Request-level tracing covers observability.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(POOL_MAX_CONNECTIONS)
        .min_connections(POOL_MIN_CONNECTIONS)
        .connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    Ok(db)
}
