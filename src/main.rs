use ccdl::cli::{Cli, Commands};
use ccdl::commands::{self, Context, download::DownloadArgs};
use ccdl::ui;
use clap::Parser;
use log::warn;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let ctx = Context::new(&cli, cancel)?;
    let result = match cli.command {
        Commands::Products => commands::products::products(&ctx).await,
        Commands::Versions { code } => commands::versions::versions(&ctx, &code).await,
        Commands::Resolve { code, version } => {
            commands::resolve::resolve(&ctx, &code, version.as_deref()).await
        }
        Commands::Download {
            code,
            version,
            language,
            dest,
            jobs,
        } => {
            commands::download::download(
                &ctx,
                DownloadArgs {
                    code,
                    version,
                    language,
                    dest,
                    jobs,
                },
            )
            .await
        }
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ui::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
