#[tokio::main]
async fn main() {
    if let Err(e) = selectrix_lib::run().await {
        eprintln!("selectrix: {e}");
        std::process::exit(1);
    }
}
