//! `relay-ctl status`.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct StatusResponse {
    users:       usize,
    uptime_secs: u64,
    listen:      String,
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Relay Status");
    println!("═══════════════════════════════════════");
    println!("  Listening on : {}", resp.listen);
    println!("  Users online : {}", resp.users);
    println!("  Uptime       : {}s", resp.uptime_secs);

    Ok(())
}
