use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use badge_hunter_llm::{AdviceMode, AdviceOutcome, BadgeAdvisor, GeminiClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("badge_hunter_llm=debug").init();

    let api_key = std::env::var("GEMINI_API_KEY")?;
    let advisor = BadgeAdvisor::new(Arc::new(GeminiClient::new(api_key)?));

    let deep = std::env::args().any(|a| a == "--deep");
    let prompt = "I have 120 stars across my repos. What do I need for the next Starstruck tier?";

    println!("Q: {}\n", prompt);

    let outcome = advisor
        .stream_advice(prompt, AdviceMode::from_deep(deep), |chunk| {
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        })
        .await;

    println!();
    if outcome != AdviceOutcome::Completed {
        println!("(stream ended: {:?})", outcome);
    }

    Ok(())
}
