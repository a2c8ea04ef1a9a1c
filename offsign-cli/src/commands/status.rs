//! Status command - show an upload session's progress

use anyhow::Result;

use crate::ui;

pub async fn run(api_url: Option<&str>, session_id: &str, json: bool, _verbose: bool) -> Result<()> {
    let client = super::connect(api_url)?;
    let status = client.upload_status(session_id).await?;

    if json {
        ui::json(&serde_json::to_value(&status)?);
        return Ok(());
    }

    ui::header("Upload Session");
    ui::key_value("Session", session_id);
    ui::key_value("Status", &status.status);
    if !status.message.is_empty() {
        ui::key_value("Message", &status.message);
    }
    if !status.file_hash.is_empty() {
        ui::key_value("File Hash", &status.file_hash);
    }

    if status.shards.is_empty() {
        return Ok(());
    }

    ui::separator();
    let mut shards: Vec<_> = status.shards.iter().collect();
    shards.sort_by(|a, b| a.0.cmp(b.0));
    for (name, shard) in shards {
        println!(
            "  {}  host={} contract={} price={} status={}",
            name, shard.host, shard.contract_id, shard.price, shard.status
        );
    }
    ui::separator();
    match status.total_price() {
        Ok(total) => ui::key_value("Total Price", &total.to_string()),
        Err(e) => ui::warning(&e.to_string()),
    }

    Ok(())
}
