// Single-threaded: tick sampling and inbound handling interleave on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    sync_client::run_with_config().await
}
