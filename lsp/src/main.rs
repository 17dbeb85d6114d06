#[tokio::main]
async fn main() {
    xule_lsp::run().await;
}
