//! Look up a GitHub profile and print progress toward every tiered badge
//!
//! # Usage
//!
//! ```bash
//! cargo run --example lookup_progress -- octocat
//! ```

use badge_hunter::prelude::*;
use badge_hunter::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    telemetry::init_logging(&settings.logging)?;

    let username = std::env::args().nth(1).unwrap_or_else(|| "octocat".to_string());
    let hunter = BadgeHunter::builder().settings(settings).build()?;

    let mut profile = ProfileSlot::new();
    if !hunter.refresh(&mut profile, &username).await {
        println!("{}", profile.error_message().unwrap_or("Lookup failed."));
        return Ok(());
    }

    if let Some(stats) = profile.current() {
        println!("👤 {} ({} ⭐, {} merged PRs)\n", stats.username, stats.total_stars, stats.merged_prs);
    }

    for (badge, progress) in hunter.badge_progress(profile.current()) {
        let Some(progress) = progress else { continue };

        let status = if progress.is_maxed {
            "maxed".to_string()
        } else {
            format!("{}/{} ({:.1}%)", progress.current_value, progress.next_threshold, progress.percent_to_next)
        };
        println!("{} {:<20} {:<8} {}", badge.icon, badge.name, progress.tier_label(), status);
    }

    println!("\nOther badges:");
    for badge in hunter.catalog().filter(CategoryFilter::All) {
        if !badge.is_tiered() || badge.is_retired() {
            println!("  {} {} [{}]: {}", badge.icon, badge.name, badge.category, badge.how_to_earn);
        }
    }

    Ok(())
}
