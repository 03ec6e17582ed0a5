//! `relay-ctl users` and `relay-ctl user <name>`.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json, user_url};

pub async fn cmd_users(port: u16) -> Result<()> {
    #[derive(Deserialize)]
    struct UsersResponse {
        users: Vec<String>,
    }

    let resp: UsersResponse = get_json(&format!("{}/users", base_url(port))).await?;

    if resp.users.is_empty() {
        println!("No users connected.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Connected Users ({})", resp.users.len());
    println!("═══════════════════════════════════════");
    for name in &resp.users {
        println!("  - {}", name);
    }

    Ok(())
}

pub async fn cmd_user_inspect(port: u16, name: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct InspectResponse {
        name:           String,
        peer_addr:      Option<String>,
        connected_secs: u64,
    }

    let resp: InspectResponse = get_json(user_url(port, name)?.as_str()).await?;

    println!("═══════════════════════════════════════");
    println!("  User Details");
    println!("═══════════════════════════════════════");
    println!("  Name      : {}", resp.name);
    println!("  Peer      : {}", resp.peer_addr.as_deref().unwrap_or("-"));
    println!("  Connected : {}s", resp.connected_secs);

    Ok(())
}
