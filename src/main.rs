use aace_log_router::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::main().await
}
