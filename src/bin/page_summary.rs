// Page summary - print the latest posts and weekly impressions for the
// configured page

use graph_insights::{GraphConfig, InsightsData, Page};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = GraphConfig::from_env()?;
    let page = Page::from_config(&config).await?;
    println!("{}", page);

    let latest = page.posts().latest(5);
    for post in latest.fetch().await? {
        println!("  {}", post);
        for quote in &post.quotes {
            println!("    \"{}\"", quote);
        }
    }

    // implicit window: the API serves the last three days
    let impressions = page.insights().weekly("page_impressions");
    println!("{}", impressions);
    match impressions.fetch().await? {
        InsightsData::Values(values) => println!("  weekly impressions: {:?}", values),
        InsightsData::Rows(rows) => println!("  {} rows", rows.rows().len()),
    }

    Ok(())
}
