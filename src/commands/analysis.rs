use anyhow::{Context, Result};

use trendradar::analysis::{LlmRadarAnalyzer, RadarAnalyzer};
use trendradar::config::Config;
use trendradar::storage::open_repository;

/// Run a full analysis and replace that date's stored trends
pub async fn refresh(config: Config) -> Result<()> {
    let repo = open_repository(&config.database)
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;
    let analyzer = LlmRadarAnalyzer::with_config(config.analysis)?;

    let analysis = analyzer.run_full_analysis().await?;

    if analysis.trends.is_empty() {
        println!(
            "Analysis for {} completed but no trends discovered. Check API key configuration.",
            analysis.radar_date
        );
        return Ok(());
    }

    let stored = repo
        .replace_radar(&analysis.radar_date, &analysis.trends)
        .context("Failed to store analysis results")?;

    let skipped = analysis.trends.len().saturating_sub(stored);
    if skipped > 0 {
        tracing::warn!(skipped, "Duplicate trends in analysis were not stored");
    }

    let rows = repo
        .trends_by_date(&analysis.radar_date)
        .context("Failed to read stored trends")?;

    println!("Stored {stored} trends for {}", analysis.radar_date);
    for trend in rows.iter().map(|row| &row.trend) {
        println!(
            "  {:<20} {:<6} {:>3}  {}",
            trend.focus_area,
            trend.classification.as_str(),
            trend.confidence_score,
            trend.tool_name
        );
    }
    Ok(())
}

/// Probe the analysis endpoint
pub async fn check(config: Config) -> Result<()> {
    let analyzer = LlmRadarAnalyzer::with_config(config.analysis)?;
    let status = analyzer.check_connection().await;

    println!("{}", serde_json::to_string_pretty(&status)?);

    if !status.is_ok() {
        anyhow::bail!("Analysis endpoint unavailable");
    }
    Ok(())
}
