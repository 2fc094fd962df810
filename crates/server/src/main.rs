#[tokio::main]
async fn main() -> anyhow::Result<()> {
    versetag_server::start().await
}
