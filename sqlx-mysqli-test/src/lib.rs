use sqlx_mysqli::{ConnectParams, Link};

pub fn setup_if_needed() {
    let _ = dotenvy::dotenv();
    let _ = env_logger::builder().is_test(true).try_init();
}

// Connection parameters from `MYSQL_TEST_*` (or `DATABASE_URL`)
// Ensure [dotenvy] and [env_logger] have been setup
pub fn params() -> anyhow::Result<ConnectParams> {
    setup_if_needed();

    Ok(ConnectParams::from_env()?)
}

// Make a new connection
pub fn new() -> anyhow::Result<Link> {
    let link = Link::connect(&params()?)?;

    log::debug!("connected to {}", link.params().get_host());

    Ok(link)
}

/// Parameters pointing at a local port nothing listens on.
pub fn unreachable() -> ConnectParams {
    setup_if_needed();

    ConnectParams::new().host("127.0.0.1").port(1)
}

/// Drops and re-creates `table` with the given column definitions.
pub fn fresh_table(link: &mut Link, table: &str, columns: &str) -> anyhow::Result<()> {
    link.query(&format!("DROP TABLE IF EXISTS {table}"))?;
    link.query(&format!("CREATE TABLE {table} ({columns})"))?;

    Ok(())
}
