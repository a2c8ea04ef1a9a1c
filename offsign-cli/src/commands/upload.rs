//! Upload command - start an upload session

use anyhow::Result;
use offsign_lib::{upload_timestamp, UploadOption};

use crate::ui;

pub async fn run(
    api_url: Option<&str>,
    hash: &str,
    storage_length: Option<u32>,
    online: bool,
    verbose: bool,
) -> Result<()> {
    let client = super::connect(api_url)?;

    if online {
        let spinner = ui::spinner("Starting upload...");
        let session_id = client.start_upload(hash).await;
        spinner.finish_and_clear();

        ui::success("Upload started");
        ui::key_value("Session", &session_id?);
        return Ok(());
    }

    let uts = upload_timestamp();
    let options: Vec<UploadOption> = storage_length
        .map(UploadOption::StorageLength)
        .into_iter()
        .collect();

    if verbose {
        ui::info(&format!("Upload timestamp: {}", uts));
    }

    let spinner = ui::spinner("Starting offline-signed upload...");
    let session_id = client.start_upload_offline(hash, &uts, &options).await;
    spinner.finish_and_clear();
    let session_id = session_id?;

    ui::success("Upload started");
    ui::key_value("Session", &session_id);
    ui::key_value("Hash", hash);
    ui::key_value("Timestamp", &uts);
    println!();
    ui::info(&format!(
        "Next: offsign status {} then offsign sign-batch {} {} --uts {}",
        session_id, session_id, hash, uts
    ));

    Ok(())
}
