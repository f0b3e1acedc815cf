use crate::app::AppContext;
use crate::domain::{AppError, MisconceptionMatcher};

pub(super) fn run_concepts(ctx: &AppContext) -> Result<(), AppError> {
    for concept in ctx.bank().all() {
        println!("{} ({} questions)", concept.name(), concept.question_count());
    }
    Ok(())
}

pub(super) fn run_match(ctx: &AppContext, text: &str) -> Result<(), AppError> {
    let matcher = MisconceptionMatcher::new(ctx.config().engine.min_confidence);

    for ranked in matcher.rank(text, ctx.bank()) {
        println!("{:.2}  {}", ranked.score, ranked.concept.name());
    }

    match matcher.match_concept(text, ctx.bank()) {
        Ok(found) => {
            println!("✅ Matched '{}' (score {:.2})", found.concept.name(), found.score);
            Ok(())
        }
        Err(AppError::NoConfidentMatch { best_score }) => {
            println!(
                "⚠️  No confident match (best score {:.2}, threshold {:.2}); the tutor would ask a clarifying question",
                best_score,
                matcher.min_confidence()
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

pub(super) fn run_explain(
    ctx: &AppContext,
    concept: &str,
    discipline: &str,
    text: &str,
) -> Result<(), AppError> {
    let concept = ctx.bank().lookup(concept)?;
    let profile = ctx.resolver().resolve(discipline);
    let explanation = ctx.composer().compose(&concept, &profile, text)?;

    println!("# {} (for {})", concept.name(), profile.display_name());
    println!();
    println!("{}", explanation.to_markdown());
    Ok(())
}

pub(super) fn run_check(ctx: &AppContext) -> Result<(), AppError> {
    let questions: usize = ctx.bank().all().iter().map(|c| c.question_count()).sum();
    println!("✅ Concept bank OK: {} concepts, {} questions", ctx.bank().len(), questions);
    println!("✅ Configuration OK: {} discipline rule(s)", ctx.resolver().rules().len());
    Ok(())
}
