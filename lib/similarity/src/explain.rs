//! Explainability for ranked templates
//!
//! Output structures that show how each total score was built: per-field
//! similarity, weighted contribution and category bonus. Also carries the
//! positional response shape older clients expect and a plain-text summary.

use clausematch_core::{FieldMap, FieldName, FieldTexts, TemplateEntry};
use serde::Serialize;
use std::fmt::Write;

use crate::schema::ScoringPolicy;
use crate::scorer::{CategoryBonus, ScoredCandidate};

/// A ranked template with its full score breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedCandidate {
    pub template_id: String,
    pub score: f32,
    pub category_primary: String,
    pub category_secondary: String,
    /// Cosine similarity x 100 per field
    pub similarity: FieldMap<f32>,
    /// Points each field added to `score`
    pub contribution: FieldMap<f32>,
    pub category_bonus: CategoryBonus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texts: Option<FieldTexts>,
}

impl ExplainedCandidate {
    /// Create an explained candidate from a scored one and its catalog entry
    pub fn from_scored(
        scored: ScoredCandidate,
        entry: &TemplateEntry,
        policy: &ScoringPolicy,
        include_text: bool,
    ) -> Self {
        let contribution = scored
            .per_field_similarity
            .map(|field, _| scored.contribution(field, policy));

        Self {
            template_id: scored.template_id,
            score: scored.total_score,
            category_primary: entry.category_primary.clone(),
            category_secondary: entry.category_secondary.clone(),
            similarity: scored.per_field_similarity,
            contribution,
            category_bonus: scored.category_bonus,
            texts: if include_text { entry.texts.clone() } else { None },
        }
    }

    /// Explain a ranked list; `entries` is the catalog the list was ranked from
    pub fn from_ranked_list(
        ranked: Vec<ScoredCandidate>,
        entries: &[TemplateEntry],
        policy: &ScoringPolicy,
        include_text: bool,
    ) -> Vec<Self> {
        ranked
            .into_iter()
            .filter_map(|scored| {
                let entry = entries.get(scored.position)?;
                Some(Self::from_scored(scored, entry, policy, include_text))
            })
            .collect()
    }

    /// Field with the largest weighted contribution
    pub fn top_field(&self) -> Option<FieldName> {
        self.contribution
            .iter()
            .filter(|(_, c)| **c > 0.0)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(field, _)| field)
    }
}

/// Summary statistics for a ranking pass
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankingStats {
    /// Number of catalog entries scored
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    pub avg_score: f32,
    pub best_score: f32,
    /// Field that contributed most to the best result
    pub top_contributing_field: Option<FieldName>,
}

impl RankingStats {
    /// Compute stats from explained results (sorted best first)
    pub fn compute(results: &[ExplainedCandidate], candidates_count: usize) -> Self {
        let Some(best) = results.first() else {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_field: None,
            };
        };

        let avg_score = results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score: best.score,
            top_contributing_field: best.top_field(),
        }
    }
}

/// Response of the match endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub result: Vec<ExplainedCandidate>,
    pub stats: RankingStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl MatchResponse {
    pub fn new(result: Vec<ExplainedCandidate>, candidates_count: usize) -> Self {
        let stats = RankingStats::compute(&result, candidates_count);
        Self {
            result,
            stats,
            summary: None,
        }
    }

    #[must_use]
    pub fn with_summary(mut self, policy: &ScoringPolicy) -> Self {
        self.summary = Some(render_summary(&self.result, policy));
        self
    }
}

/// Category bonus under the positional key names
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct LegacyCategoryScore {
    pub template1: f32,
    pub template2: f32,
}

/// Per-field similarity columns under the positional key names
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LegacySimilarities {
    pub text1: Vec<f32>,
    pub text2: Vec<f32>,
    pub text3: Vec<f32>,
    pub text4: Vec<f32>,
}

/// Column-oriented response: the i-th element of every list describes the
/// i-th ranked template
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TemplateResponse {
    pub templates: Vec<String>,
    pub scores: Vec<f32>,
    pub category_scores: Vec<LegacyCategoryScore>,
    pub similarities: LegacySimilarities,
}

impl TemplateResponse {
    pub fn from_ranked(ranked: &[ScoredCandidate]) -> Self {
        let mut out = Self::default();
        for r in ranked {
            out.templates.push(r.template_id.clone());
            out.scores.push(r.total_score);
            out.category_scores.push(LegacyCategoryScore {
                template1: r.category_bonus.primary,
                template2: r.category_bonus.secondary,
            });
            let sims = &r.per_field_similarity;
            out.similarities.text1.push(*sims.get(FieldName::SubjectMatter));
            out.similarities.text2.push(*sims.get(FieldName::Parties));
            out.similarities.text3.push(*sims.get(FieldName::PricePayment));
            out.similarities.text4.push(*sims.get(FieldName::PerformanceTerms));
        }
        out
    }
}

/// Render the human-readable recommendation list
pub fn render_summary(results: &[ExplainedCandidate], policy: &ScoringPolicy) -> String {
    let mut out = String::from("推荐的合同模板（按匹配度排序）：\n");

    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(out, "\n{}. 【{}】 总匹配度: {:.1}分", i + 1, r.template_id, r.score);

        for (level, awarded) in [
            ("一级分类", r.category_bonus.primary),
            ("二级分类", r.category_bonus.secondary),
        ] {
            if awarded > 0.0 {
                let _ = writeln!(out, "   ✓ {level}匹配 (+{awarded:.0}分)");
            } else {
                let _ = writeln!(out, "   ✗ {level}不匹配 (0分)");
            }
        }

        for (field, sim) in r.similarity.iter() {
            let _ = writeln!(
                out,
                "   • {}相似度: {:.1}% (权重: {})",
                field.label(),
                sim,
                policy.weight(field)
            );
        }
    }

    out.push_str("\n以上是根据您提供的信息，系统推荐的最匹配合同模板。");
    out
}
