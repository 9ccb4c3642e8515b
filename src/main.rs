use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookbundle::logging::init().context("init logging")?;

    let cli = bookbundle::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        bookbundle::cli::Command::Check(args) => {
            bookbundle::extension::check(args).context("check")?;
        }
        bookbundle::cli::Command::Extract(args) => {
            bookbundle::extract::run(args).context("extract")?;
        }
        bookbundle::cli::Command::Send(args) => {
            bookbundle::extension::send(args).context("send")?;
        }
        bookbundle::cli::Command::Import(args) => {
            bookbundle::session::import(args).context("import")?;
        }
        bookbundle::cli::Command::Search(args) => {
            bookbundle::session::search(args).await.context("search")?;
        }
        bookbundle::cli::Command::Analyze(args) => {
            bookbundle::session::analyze(args).await.context("analyze")?;
        }
        bookbundle::cli::Command::Health(args) => {
            bookbundle::session::health(args).await.context("health")?;
        }
    }

    Ok(())
}
