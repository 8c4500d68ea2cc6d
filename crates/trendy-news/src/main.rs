use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    Config, GeminiClient, GoogleTrendsClient, HttpFeedReader, Pipeline, PipelineSettings,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trendy-news")]
#[command(about = "Collect trending headlines from news feeds into a dated spreadsheet")]
struct Args {
    /// Workbook to read seen headlines from and append sheets to
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    shared::logging::init_tracing();
    let config = Config::from_env()?;

    let output_path = args.output.unwrap_or_else(|| config.output_path.clone());

    let reader = HttpFeedReader::new()?;
    let trends =
        GoogleTrendsClient::new(config.trends.clone()).context("Failed to create Trends client")?;
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;

    let settings = PipelineSettings {
        sources: config.sources.clone(),
        output_path: output_path.clone(),
        per_feed_limit: config.per_feed_limit,
        trend_threshold: config.trends.threshold,
    };
    let pipeline = Pipeline::new(&reader, &trends, &gemini, settings);

    let report = pipeline.run().await?;
    // shared::scheduler::run_daily(&pipeline, config.schedule_at).await?;

    println!("\n📊 Run summary");
    for source in &report.sources {
        match &source.sheet {
            Some(sheet) => println!(
                "  ✓ {}: {} new, {} duplicates → {}",
                source.source, source.written, source.duplicates, sheet
            ),
            None => println!(
                "  - {}: no new articles ({} duplicates)",
                source.source, source.duplicates
            ),
        }
    }
    println!(
        "\n✅ {} articles saved to: {}",
        report.total_written(),
        output_path.display()
    );

    Ok(())
}
