use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::orchestrator::RequestOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<RequestOrchestrator>,
}

// Evaluation result as delivered by the model. Field names follow the
// camelCase wire shape of the response schema.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisItem {
    pub score: u8,
    pub summary: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub sources: Vec<DataSource>,
}

impl AnalysisItem {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEvaluation {
    pub company_name: String,
    pub logo_url: String,
    pub industry: String,
    pub funding_status: String,
    pub overall_score: u8,
    pub founder_analysis: AnalysisItem,
    pub market_analysis: AnalysisItem,
    pub technical_analysis: AnalysisItem,
    pub competitor_analysis: AnalysisItem,
}

/// The four analysis areas, in weighting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Founder,
    Market,
    Technical,
    Competitor,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Founder,
        Category::Market,
        Category::Technical,
        Category::Competitor,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Founder => "Founder Analysis",
            Category::Market => "Market Analysis",
            Category::Technical => "Technical Analysis",
            Category::Competitor => "Competitor Analysis",
        }
    }

    /// Weight in percent used for the overall score
    pub fn weight(&self) -> u32 {
        match self {
            Category::Founder => 40,
            Category::Market => 30,
            Category::Technical => 20,
            Category::Competitor => 10,
        }
    }
}

impl CompanyEvaluation {
    pub fn analysis(&self, category: Category) -> &AnalysisItem {
        match category {
            Category::Founder => &self.founder_analysis,
            Category::Market => &self.market_analysis,
            Category::Technical => &self.technical_analysis,
            Category::Competitor => &self.competitor_analysis,
        }
    }

    /// Composite of the four sub-scores using the 40/30/20/10 weights, rounded
    pub fn weighted_score(&self) -> u8 {
        let total: u32 = Category::ALL
            .iter()
            .map(|c| c.weight() * u32::from(self.analysis(*c).score))
            .sum();
        ((total + 50) / 100) as u8
    }

    /// Absolute difference between the delivered and the locally computed overall score
    pub fn score_drift(&self) -> u8 {
        self.overall_score.abs_diff(self.weighted_score())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Strong,
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        if score >= 85 {
            ScoreTier::Strong
        } else if score >= 60 {
            ScoreTier::Moderate
        } else {
            ScoreTier::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Strong => "strong",
            ScoreTier::Moderate => "moderate",
            ScoreTier::Weak => "weak",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub model: String,
    pub upload_policy: String,
}
