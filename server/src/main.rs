#[rocket::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be configured.
    let _ = dotenv::dotenv();

    newsagent::webserver::main().await?;

    Ok(())
}
