// Entrypoint: resolve configuration, upload the folder once, print the
// provider's response. Any error ends the process with a non-zero status.

use ipfs_folder_upload::{init_logging, ui::resolve_config, upload_folder, UploadClient};

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = resolve_config(std::env::args().nth(1))?;
    let client = UploadClient::from_env(config.api_key())?;

    let response = upload_folder(&config.folder, &client)?;
    println!("{}", response);
    Ok(())
}
