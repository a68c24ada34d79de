//! droplatch-client - interactive companion client
//!
//! Reads one command per prompt, sends it verbatim to the server, then
//! waits up to one second for a reply so the prompt stays responsive
//! even for the fire-and-forget sequence commands. The literal input
//! `quit` ends the session (it is still sent, the server ignores it).

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// How long to wait for a reply before returning to the prompt.
const REPLY_WAIT: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("{}:{}", droplatch::DEFAULT_HOST, droplatch::DEFAULT_PORT));

    let mut stream = TcpStream::connect(&addr).await?;
    eprintln!("connected to {addr}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reply_buf = [0u8; 1000];

    loop {
        eprint!("enter a command > ");

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break, // stdin closed
        };
        if line.is_empty() {
            continue;
        }

        // One write per command, no trailing newline, no retry
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            eprintln!("failed to send all of {line}: {e}");
            break;
        }

        if line == "quit" {
            break;
        }

        // A reply is optional; sequences never send one
        match timeout(REPLY_WAIT, stream.read(&mut reply_buf)).await {
            Ok(Ok(0)) => {
                eprintln!("server closed the connection");
                break;
            }
            Ok(Ok(n)) => println!("{}", String::from_utf8_lossy(&reply_buf[..n])),
            Ok(Err(e)) => {
                eprintln!("read error: {e}");
                break;
            }
            Err(_) => {} // timeout, back to the prompt
        }
    }

    Ok(())
}
