//! Sign commands - sign what the session is waiting for and submit it

use anyhow::{Context, Result};
use offsign_lib::Opcode;

use crate::ui;

/// Sign and submit the session's contract batch.
pub async fn batch(
    api_url: Option<&str>,
    session_id: &str,
    hash: &str,
    uts: &str,
    verbose: bool,
) -> Result<()> {
    let client = super::connect(api_url)?;

    let status = client.upload_status(session_id).await?;
    if verbose {
        ui::info(&format!("Session status: {}", status.status));
    }

    let batch = client
        .fetch_contract_batch(session_id, hash, uts, &status.status)
        .await
        .context("failed to fetch contract batch")?;
    ui::info(&format!("Signing {} contract(s)", batch.len()));

    let spinner = ui::spinner("Submitting signed contracts...");
    let ack = client
        .submit_signed_batch(session_id, hash, &batch, uts, &status.status)
        .await;
    spinner.finish_and_clear();
    ack?;

    ui::success(&format!("Signed {} contract(s)", batch.len()));
    Ok(())
}

/// Sign and submit the unsigned payload the session is waiting for.
pub async fn unsigned(
    api_url: Option<&str>,
    session_id: &str,
    hash: &str,
    uts: &str,
    total_price: Option<i64>,
    verbose: bool,
) -> Result<()> {
    let client = super::connect(api_url)?;

    let status = client.upload_status(session_id).await?;
    let payload = client
        .fetch_unsigned_data(session_id, hash, uts, &status.status)
        .await
        .context("failed to fetch unsigned data")?;
    let opcode = payload.opcode()?;

    if verbose {
        ui::info(&format!(
            "Session status: {}, opcode: {}",
            status.status, opcode
        ));
    }

    let spinner = ui::spinner(&format!("Submitting signed {}...", opcode));
    let ack = match opcode {
        Opcode::PayChannel => {
            let amount = match total_price {
                Some(amount) => amount,
                None => status.total_price()?,
            };
            client
                .submit_signed_channel_commit(session_id, hash, &payload, uts, &status.status, amount)
                .await
        }
        _ => {
            client
                .submit_signed(session_id, hash, &payload, uts, &status.status)
                .await
        }
    };
    spinner.finish_and_clear();
    let ack = ack?;

    ui::success(&format!("Submitted signed {}", opcode));
    if verbose && !ack.is_empty() {
        ui::key_value("Node", String::from_utf8_lossy(&ack).trim());
    }
    Ok(())
}
