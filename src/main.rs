#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = exam_correction::run().await {
        eprintln!("exam-correction fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
