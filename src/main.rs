mod api;
mod config;
mod creator;
mod download;
mod error;
mod fanbox;
mod post;
mod storage;

use std::error::Error as StdError;

use api::FanboxClient;
use config::Config;
use creator::{display_creators, resolve_creators};
use error::Error;
use log::{error, info, warn};
use post::Archiver;
use storage::LocalStorage;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
    let config = Config::parse();
    config.init_logger();
    info!("# Fanbox Archive #");
    info!("");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping");
                cancel.cancel();
            }
        });
    }

    let client = FanboxClient::new(&config);

    info!("Loading Creator List");
    let creators = resolve_creators(&config, &client).await?;
    display_creators(&creators);

    let storage = LocalStorage::new(&config);
    let options = config.download_options();
    let archiver = Archiver::new(client, storage, options, cancel);

    let mut failed = 0usize;
    for creator in &creators {
        info!("Archiving {}", creator.id());
        match archiver.archive_creator(creator.id()).await {
            Ok(()) => {}
            Err(e @ Error::Cancelled) => return Err(e.into()),
            Err(e) if options.skip_on_error => {
                error!("Failed to archive {}: {e}", creator.id());
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
        info!("");
    }

    if failed > 0 {
        return Err(format!("{failed} creators failed to archive").into());
    }

    info!("All done!");
    Ok(())
}
