#[tokio::main]
async fn main() {
    if let Err(err) = hzn_api::run().await {
        tracing::error!(error = %err, "hzn-api failed");
        std::process::exit(1);
    }
}
