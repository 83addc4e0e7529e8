//! List active users, then open loans due within the next week.
//!
//! Reads the connection settings from `FOLIO_*` variables, a `.env` file or
//! `folio.toml`:
//!
//! ```bash
//! FOLIO_BASE_URL=https://folio-snapshot-okapi.dev.folio.org \
//! FOLIO_TENANT=diku FOLIO_USER=diku_admin FOLIO_PASSWORD=admin \
//! cargo run --example list_users
//! ```

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use folio_client::logging::{self, LogFormat};
use folio_client::{config, FolioClient, LoansApi, UsersApi};
use tracing::info;

fn main() -> Result<()> {
    logging::init(LogFormat::Text);

    let config = config::load().context("failed to load FOLIO configuration")?;
    let mut client = FolioClient::new(config).context("failed to open FOLIO session")?;

    let mut active = 0usize;
    for user in client.iter_users(Some("active==true"))?.take(25) {
        let user = user?;
        active += 1;
        info!(
            username = user["username"].as_str().unwrap_or("-"),
            barcode = user["barcode"].as_str().unwrap_or("-"),
            "user"
        );
    }
    info!(count = active, "listed active users");

    let today = Utc::now().date_naive();
    let start = today.format("%Y-%m-%d").to_string();
    let end = (today + Duration::days(7)).format("%Y-%m-%d").to_string();
    let loans = client.get_open_loans_by_due_date(&start, Some(end.as_str()))?;
    info!(count = loans.len(), %start, %end, "open loans due this week");

    client.close().context("logout failed")?;
    Ok(())
}
