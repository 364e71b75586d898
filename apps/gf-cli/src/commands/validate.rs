// validate.rs — English-only content validation.

use std::path::PathBuf;

use clap::Args;
use gf_language::{ValidationContext, ValidationOutcome};

use crate::context::AppContext;

#[derive(Args)]
pub struct ValidateArgs {
    /// File to validate.
    pub path: Option<PathBuf>,

    /// Validate a literal string instead of a file.
    #[arg(long, conflicts_with = "path")]
    pub text: Option<String>,

    /// Translate flagged content instead of just reporting it.
    #[arg(long)]
    pub auto_translate: bool,

    /// Treat unresolved non-English content as an error.
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: &ValidateArgs, app: &AppContext, json: bool) -> anyhow::Result<()> {
    let gate = app.language_gate();

    let outcome = match (&args.path, &args.text) {
        (Some(path), None) => {
            gate.validate_file_content(path, args.auto_translate, args.strict)
                .await
        }
        (None, Some(text)) => {
            gate.validate_before_save(&ValidationContext {
                content: text.clone(),
                auto_translate: args.auto_translate,
                strict_mode: args.strict,
            })
            .await
        }
        _ => anyhow::bail!("pass a file path or --text"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if !outcome.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn print_outcome(outcome: &ValidationOutcome) {
    println!(
        "Language: {} (confidence {:.2})",
        outcome.detected_language, outcome.confidence
    );
    for issue in &outcome.issues {
        println!("  issue:      {}", issue);
    }
    for warning in &outcome.warnings {
        println!("  warning:    {}", warning);
    }
    for suggestion in &outcome.suggestions {
        println!("  suggestion: {}", suggestion);
    }
    if let Some(translated) = &outcome.translated_content {
        println!("  translation:");
        println!("{}", translated);
    }
    println!("{}", if outcome.valid { "OK" } else { "INVALID" });
}
