// UI layer: fills configuration gaps with `dialoguer` prompts when running
// in a terminal. Non-interactive runs fail with a configuration error instead.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password};
use tracing::info;

use crate::config::{self, Config, PartialConfig};

/// Resolve the folder and API key for this run.
///
/// `arg` is the first command-line argument. Environment variables and the
/// saved key file are consulted first; prompts only appear on a TTY.
pub fn resolve_config(arg: Option<String>) -> Result<Config> {
    let key_file = config::key_file_path();
    let mut partial = PartialConfig::gather(arg, |k| std::env::var(k).ok(), &key_file)
        .context("Reading configuration")?;

    if std::io::stdin().is_terminal() {
        if partial.folder.is_none() {
            let folder: String = Input::new()
                .with_prompt("Folder to upload")
                .interact_text()?;
            partial.folder = Some(PathBuf::from(folder));
        }
        if partial.api_key.is_none() {
            // `Password` hides the key as it is typed.
            let key: String = Password::new().with_prompt("Moralis API key").interact()?;
            let save = Confirm::new()
                .with_prompt(format!("Save key to {}?", key_file.display()))
                .default(false)
                .interact()?;
            if save {
                config::persist_api_key(&key_file, key.trim()).context("Saving API key")?;
                info!(path = %key_file.display(), "API key saved");
            }
            partial.api_key = Some(key);
        }
    }

    Ok(partial.finish()?)
}
