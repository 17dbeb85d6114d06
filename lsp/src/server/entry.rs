use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::{cli::try_cli_analyze, state::XuleLanguageServer};

pub async fn run() {
    if let Some(output) = try_cli_analyze().await.unwrap_or_else(|e| {
        eprintln!("xule-lsp analyze error: {e:#}");
        std::process::exit(2);
    }) {
        println!("{}", output);
        return;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(XuleLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
