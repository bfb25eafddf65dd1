//! Response schema for schema-constrained evaluation
//!
//! The same bounds are used twice: serialized into the request so the model
//! is constrained to the shape, and checked against the parsed
//! [`CompanyEvaluation`] so a non-conforming response is rejected whole.

use serde_json::{json, Value};

use crate::models::{AnalysisItem, Category, CompanyEvaluation};

pub const SCHEMA_VERSION: &str = "evaluation-v1";

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 100;
pub const PROS_RANGE: (usize, usize) = (2, 3);
pub const CONS_RANGE: (usize, usize) = (2, 3);
pub const SOURCES_RANGE: (usize, usize) = (1, 2);

fn score_schema(description: &str) -> Value {
    json!({
        "type": "INTEGER",
        "description": description,
        "minimum": SCORE_MIN,
        "maximum": SCORE_MAX,
    })
}

fn phrase_list_schema(description: &str, (min, max): (usize, usize)) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "items": { "type": "STRING" },
        "minItems": min,
        "maxItems": max,
    })
}

fn analysis_item_schema(description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "description": description,
        "properties": {
            "score": score_schema("Score (1-100) for this analysis area."),
            "summary": {
                "type": "STRING",
                "description": "A single, concise sentence summarizing the analysis for this area."
            },
            "pros": phrase_list_schema(
                "An array of 2-3 key strengths (pros), each as a short, scannable phrase.",
                PROS_RANGE,
            ),
            "cons": phrase_list_schema(
                "An array of 2-3 key weaknesses (cons), each as a short, scannable phrase.",
                CONS_RANGE,
            ),
            "sources": {
                "type": "ARRAY",
                "description": "An array of 1-2 key data sources specifically used for this analysis area.",
                "minItems": SOURCES_RANGE.0,
                "maxItems": SOURCES_RANGE.1,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "Source name (e.g., 'Company Website', 'TechCrunch')."
                        },
                        "url": {
                            "type": "STRING",
                            "description": "An HTTPS URL where the information was found."
                        }
                    },
                    "required": ["name", "url"]
                }
            }
        },
        "required": ["score", "summary", "pros", "cons", "sources"]
    })
}

/// The evaluation response schema in the Gemini OpenAPI subset
pub fn evaluation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "companyName": {
                "type": "STRING",
                "description": "The name of the company being evaluated."
            },
            "logoUrl": {
                "type": "STRING",
                "description": "A publicly accessible URL for the company's logo. Should be a high-quality image (SVG preferred)."
            },
            "industry": {
                "type": "STRING",
                "description": "The primary industry or sector the company operates in (e.g., 'Fintech', 'SaaS', 'E-commerce')."
            },
            "fundingStatus": {
                "type": "STRING",
                "description": "The company's latest funding status, including the stage and amount if available (e.g., 'Series C - $150M', 'Seed Round', 'Bootstrapped')."
            },
            "overallScore": score_schema(
                "An overall score from 1 to 100, calculated as a weighted average of the other scores (40% Founder, 30% Market, 20% Technical, 10% Competitor)."
            ),
            "founderAnalysis": analysis_item_schema("Analysis of the founding team."),
            "marketAnalysis": analysis_item_schema("Analysis of the market."),
            "technicalAnalysis": analysis_item_schema("Analysis of the technology."),
            "competitorAnalysis": analysis_item_schema("Analysis of the competition."),
        },
        "required": [
            "companyName",
            "logoUrl",
            "industry",
            "fundingStatus",
            "overallScore",
            "founderAnalysis",
            "marketAnalysis",
            "technicalAnalysis",
            "competitorAnalysis"
        ]
    })
}

fn check_score(field: &str, score: u8) -> Result<(), String> {
    if (SCORE_MIN..=SCORE_MAX).contains(&score) {
        Ok(())
    } else {
        Err(format!("{} must be between {} and {}, got {}", field, SCORE_MIN, SCORE_MAX, score))
    }
}

fn check_len(field: &str, len: usize, (min, max): (usize, usize)) -> Result<(), String> {
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(format!("{} must have {}-{} entries, got {}", field, min, max, len))
    }
}

fn validate_item(field: &str, item: &AnalysisItem) -> Result<(), String> {
    check_score(&format!("{}.score", field), item.score)?;
    if item.summary.trim().is_empty() {
        return Err(format!("{}.summary is empty", field));
    }
    check_len(&format!("{}.pros", field), item.pros.len(), PROS_RANGE)?;
    check_len(&format!("{}.cons", field), item.cons.len(), CONS_RANGE)?;
    check_len(&format!("{}.sources", field), item.sources.len(), SOURCES_RANGE)?;
    Ok(())
}

/// Check a parsed evaluation against the bounds the schema declares
pub fn validate(evaluation: &CompanyEvaluation) -> Result<(), String> {
    if evaluation.company_name.trim().is_empty() {
        return Err("companyName is empty".to_string());
    }
    check_score("overallScore", evaluation.overall_score)?;

    for category in Category::ALL {
        let field = match category {
            Category::Founder => "founderAnalysis",
            Category::Market => "marketAnalysis",
            Category::Technical => "technicalAnalysis",
            Category::Competitor => "competitorAnalysis",
        };
        validate_item(field, evaluation.analysis(category))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_schema_mirrors_evaluation_fields() {
        let schema = evaluation_schema();
        let expected = serde_json::to_value(fixtures::evaluation("Acme")).unwrap();

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let fields: Vec<&str> = expected.as_object().unwrap().keys().map(|k| k.as_str()).collect();

        assert_eq!(required.len(), fields.len());
        for field in fields {
            assert!(required.contains(&field), "{} missing from schema", field);
        }
    }

    #[test]
    fn test_item_bounds_in_schema() {
        let schema = evaluation_schema();
        let item = &schema["properties"]["marketAnalysis"];
        assert_eq!(item["properties"]["score"]["minimum"], 1);
        assert_eq!(item["properties"]["score"]["maximum"], 100);
        assert_eq!(item["properties"]["pros"]["minItems"], 2);
        assert_eq!(item["properties"]["cons"]["maxItems"], 3);
        assert_eq!(item["properties"]["sources"]["maxItems"], 2);
        assert_eq!(item["description"], "Analysis of the market.");
    }

    #[test]
    fn test_validate_accepts_fixture() {
        assert!(validate(&fixtures::evaluation("Acme")).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        let mut eval = fixtures::evaluation("Acme");
        eval.technical_analysis.score = 0;
        assert_eq!(
            validate(&eval).unwrap_err(),
            "technicalAnalysis.score must be between 1 and 100, got 0"
        );

        let mut eval = fixtures::evaluation("Acme");
        eval.overall_score = 101;
        assert!(validate(&eval).unwrap_err().starts_with("overallScore"));

        let mut eval = fixtures::evaluation("Acme");
        eval.founder_analysis.pros.truncate(1);
        assert_eq!(
            validate(&eval).unwrap_err(),
            "founderAnalysis.pros must have 2-3 entries, got 1"
        );

        let mut eval = fixtures::evaluation("Acme");
        eval.competitor_analysis.sources.clear();
        assert!(validate(&eval).unwrap_err().contains("competitorAnalysis.sources"));
    }
}
