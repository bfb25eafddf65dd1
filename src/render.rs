//! Plain-text rendering for the terminal
//!
//! Shows the delivered overall score next to the locally weighted one, and a
//! tier label for every score.

use crate::models::{Category, CompanyEvaluation, ScoreTier};

pub fn render_evaluation(evaluation: &CompanyEvaluation) -> String {
    let mut lines = vec![
        evaluation.company_name.clone(),
        format!("{} | {}", evaluation.industry, evaluation.funding_status),
    ];
    if !evaluation.logo_url.is_empty() {
        lines.push(format!("Logo: {}", evaluation.logo_url));
    }

    lines.push(String::new());
    lines.push(format!(
        "Overall score: {}/100 ({}), weighted {}/100",
        evaluation.overall_score,
        ScoreTier::from_score(evaluation.overall_score).label(),
        evaluation.weighted_score()
    ));

    for category in Category::ALL {
        let item = evaluation.analysis(category);
        lines.push(String::new());
        lines.push(format!(
            "{} ({}%): {}/100 ({})",
            category.title(),
            category.weight(),
            item.score,
            item.tier().label()
        ));
        lines.push(format!("  {}", item.summary));
        lines.extend(item.pros.iter().map(|p| format!("  + {}", p)));
        lines.extend(item.cons.iter().map(|c| format!("  - {}", c)));
        if !item.sources.is_empty() {
            lines.push("  Sources:".to_string());
            lines.extend(
                item.sources
                    .iter()
                    .map(|s| format!("    {} <{}>", s.name, s.url)),
            );
        }
    }

    lines.join("\n")
}

pub fn render_history(entries: &[String]) -> String {
    if entries.is_empty() {
        return "No recent searches.".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, entry))
        .collect::<Vec<_>>()
        .join("\n")
}
