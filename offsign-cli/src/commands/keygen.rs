//! Keygen command - generate a signing key pair

use anyhow::Result;
use offsign_lib::generate_keypair;

use crate::ui;

pub fn run(_verbose: bool) -> Result<()> {
    let keypair = generate_keypair();

    ui::header("New Signing Key");
    ui::key_value("Private Key", &keypair.private_key);
    ui::key_value("Public Key", &keypair.public_key);
    println!();
    ui::warning("Keep the private key secret. Export it to enable offline signing:");
    println!("  export OFFSIGN_PRIVATE_KEY={}", keypair.private_key);

    Ok(())
}
