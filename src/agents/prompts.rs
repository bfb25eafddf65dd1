//! Prompt construction
//!
//! Both prompts are pure functions of their inputs so the exact text sent
//! upstream can be asserted in tests.

use crate::models::Category;

pub const DIGEST_START: &str = "---EXTRACTED INFORMATION---";
pub const DIGEST_END: &str = "---END EXTRACTED INFORMATION---";
pub const NO_INFORMATION_MARKER: &str = "No information found in documents.";

fn evaluation_focus(category: Category) -> &'static str {
    match category {
        Category::Founder => {
            "Evaluate the founding team's experience, past successes, and domain expertise."
        }
        Category::Market => {
            "Assess the target market's size, growth potential (CAGR), and the company's positioning."
        }
        Category::Technical => {
            "Analyze the product's technology, innovation, defensibility, and scalability."
        }
        Category::Competitor => {
            "Evaluate the competitive landscape, identifying key players and the startup's differentiation."
        }
    }
}

fn extraction_focus(category: Category) -> &'static str {
    match category {
        Category::Founder => {
            "Extract information about the founding team's experience, past successes (e.g., previous companies, exits), education, and specific domain expertise."
        }
        Category::Market => {
            "Extract details on the target market size (TAM, SAM, SOM), growth potential (e.g., CAGR), customer segments, and the company's go-to-market strategy or traction."
        }
        Category::Technical => {
            "Extract descriptions of the product's underlying technology, architecture, key innovative features, and any mentions of intellectual property, patents, or defensibility."
        }
        Category::Competitor => {
            "Extract any information that identifies key competitors, competitive advantages, or the startup's unique selling propositions and differentiation."
        }
    }
}

fn numbered_categories(focus: fn(Category) -> &'static str) -> String {
    Category::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}.  **{}**: {}", i + 1, c.title(), focus(*c)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn weighting_hint() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("{}% {}", c.weight(), c.title().trim_end_matches(" Analysis")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt for the schema-constrained evaluation call.
///
/// A blank digest is treated the same as no digest.
pub fn build_evaluation_prompt(company_name: &str, digest: Option<&str>) -> String {
    let context = match digest.map(str::trim).filter(|d| !d.is_empty()) {
        Some(digest) => format!(
            "Use your own knowledge and other publicly available data. The user also supplied documents; \
the information extracted from them is below. Treat it as supplementary context, not as the sole source of truth, \
and cross-check it against public information where possible.\n\n{}\n{}\n{}",
            DIGEST_START, digest, DIGEST_END
        ),
        None => "Base your analysis on publicly available information.".to_string(),
    };

    format!(
        r#"You are an expert venture capitalist analyst called "UnicornFinder". Your task is to provide a detailed, data-driven evaluation of a startup.
For the company "{company}", produce a comprehensive analysis.
{context}

Your evaluation must be structured into four key areas:
{categories}

For each of these four areas, provide:
- A numerical score from 1 to 100.
- A single, concise summary sentence.
- A list of 2-3 specific strengths (pros), as short phrases.
- A list of 2-3 specific weaknesses (cons), as short phrases.
- A list of 1-2 data sources used for that area's analysis, each with a name and a URL. Only use real links to pages where the information about the startup was actually found. Do not add links to dubious or unsecured websites or to pages that return errors. Prefer HTTPS sites.

Additionally, provide:
- The company's primary **Industry** (e.g., 'Fintech', 'SaaS').
- The company's latest **Funding Status** (e.g., 'Series C - $150M', 'Seed Round').
- A publicly accessible **Logo URL** for the company.
- An **Overall Score** (1-100), calculated as a weighted average of the four area scores: {weights}.

If no information is available for a field, say so explicitly in that field instead of leaving it out.

Your response MUST be a single JSON object that strictly adheres to the provided schema. Do not include any text, explanations, or markdown formatting outside of the JSON object.
"#,
        company = company_name.trim(),
        context = context,
        categories = numbered_categories(evaluation_focus),
        weights = weighting_hint(),
    )
}

/// Prompt for the free-form extraction call over uploaded documents
pub fn build_extraction_prompt() -> String {
    format!(
        r#"You are a document analysis expert. From the provided document(s), extract all information relevant to the following categories for a startup evaluation.
Focus on concrete facts, figures, and statements.

{categories}

Collate all extracted information into a single, structured block of text with one heading per category. If no relevant information is found for a category, state "{marker}" under that category's heading. Do not summarize, analyze, or create new information; only extract relevant text verbatim or as close as possible.
"#,
        categories = numbered_categories(extraction_focus),
        marker = NO_INFORMATION_MARKER,
    )
}
