#[tokio::main]
async fn main() -> anyhow::Result<()> {
    iiuc_bus::start_server().await
}
