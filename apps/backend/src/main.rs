#[tokio::main]
async fn main() -> anyhow::Result<()> {
    echoread_backend::run().await
}
