//! relay-ctl — command-line interface for the relay status API.

use anyhow::{Context, Result};

mod cmd;

const DEFAULT_PORT: u16 = 9101;

fn print_usage() {
    println!("Usage: relay-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status        Show listener address, user count, and uptime");
    println!("  users         List connected users");
    println!("  user <name>   Show one connected user");
    println!();
    println!("Options:");
    println!("  --port <port>   Status API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                => cmd::status::cmd_status(port).await,
        ["users"]                      => cmd::users::cmd_users(port).await,
        ["user", name]                 => cmd::users::cmd_user_inspect(port, name).await,
        ["help"] | ["--help"] | ["-h"] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
