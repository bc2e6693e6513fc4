#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quest_journal_lib::run().await
}
