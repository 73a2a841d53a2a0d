//! Remove the stored access token

use crate::util;
use anyhow::{Context, Result};

pub async fn run() -> Result<()> {
    let removed = util::token_store()?
        .delete()
        .context("Failed to delete token")?;

    if removed {
        println!("Successfully logged out!");
    } else {
        println!("No active session found.");
    }
    Ok(())
}
