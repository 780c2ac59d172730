//! Interactive Badge Advisor chat on stdin
//!
//! Prefix a question with `/deep ` to use the deep reasoning model.
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! cargo run --example advice_chat
//! ```

use std::io::{BufRead, Write};

use badge_hunter::prelude::*;
use badge_hunter::types::ADVISOR_GREETING;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("badge_hunter=info").init();

    let hunter = BadgeHunter::builder().settings(Settings::load()?).build()?;
    let Some(advisor) = hunter.advisor() else {
        println!("Chat is disabled: set GEMINI_API_KEY or API_KEY.");
        return Ok(());
    };

    println!("🤖 {}\n", ADVISOR_GREETING);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let (prompt, mode) = match line.trim().strip_prefix("/deep ") {
            Some(rest) => (rest.to_string(), AdviceMode::Deep),
            None => (line.trim().to_string(), AdviceMode::Fast),
        };
        if prompt.is_empty() {
            continue;
        }

        print!("🤖 ");
        let outcome = advisor
            .stream_advice(&prompt, mode, |chunk| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            })
            .await;
        println!("\n");
        tracing::debug!(?outcome, ?mode, "Advice finished");
    }

    Ok(())
}
