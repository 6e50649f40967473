//! ワインのフレーバー補完
//!
//! 化合物プロファイルを持たないワインについて、生成サービスに品種と
//! フレーバー化合物を問い合わせて補完する。1本の失敗は元のレコードを
//! そのまま残して続行する。

use crate::config::Config;
use crate::error::{Result, SommelierError};
use crate::extractor::retry::{call_with_retry, RetryPolicy};
use crate::extractor::service::{GenerationRequest, GenerativeService};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use sommelier_ai_common::{strip_code_fences, wine_enrichment_prompt, IngredientFlavorMap, Wine};
use std::collections::BTreeSet;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnrichmentResponse {
    grapes: Vec<String>,
    flavor_compounds: Vec<String>,
}

/// 補完結果
#[derive(Debug)]
pub struct EnrichmentOutcome {
    pub wines: Vec<Wine>,
    pub enriched: usize,
    pub failed: usize,
}

/// 全ワインを1本ずつ順に補完する
pub fn enrich_wines(
    service: &dyn GenerativeService,
    wines: &[Wine],
    flavor_map: &IngredientFlavorMap,
    policy: &RetryPolicy,
    config: &Config,
) -> Result<EnrichmentOutcome> {
    let bar = ProgressBar::new(wines.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("  [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut outcome = EnrichmentOutcome {
        wines: Vec::with_capacity(wines.len()),
        enriched: 0,
        failed: 0,
    };

    for wine in wines {
        bar.set_message(wine.wine_name.clone());

        match enrich_single(service, wine, flavor_map, policy, config) {
            Ok(enriched) => {
                outcome.wines.push(enriched);
                outcome.enriched += 1;
            }
            Err(e @ SommelierError::RateLimit(_)) => {
                bar.abandon();
                return Err(e);
            }
            Err(e) => {
                // 補完に失敗したら元のレコードを維持する
                bar.println(format!("  ⚠ {} の補完に失敗: {}", wine.wine_name, e));
                outcome.wines.push(wine.clone());
                outcome.failed += 1;
            }
        }

        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(outcome)
}

fn enrich_single(
    service: &dyn GenerativeService,
    wine: &Wine,
    flavor_map: &IngredientFlavorMap,
    policy: &RetryPolicy,
    config: &Config,
) -> Result<Wine> {
    let mut request = GenerationRequest::text(wine_enrichment_prompt(wine));
    request.temperature = config.temperature;
    request.max_output_tokens = 500; // 小さいペイロードなので上限も小さく

    let response = call_with_retry(policy, || service.generate(&request))?;
    let cleaned = strip_code_fences(&response);
    let parsed: EnrichmentResponse = serde_json::from_str(&cleaned)
        .map_err(|e| SommelierError::ApiParse(format!("補完レスポンス: {}", e)))?;

    let mut enriched = wine.clone();
    if !parsed.grapes.is_empty() {
        enriched.grapes = parsed.grapes;
    }

    // 品種から引けた化合物とサービスの回答をマージ
    let mut compounds: BTreeSet<String> = BTreeSet::new();
    for grape in &enriched.grapes {
        compounds.extend(flavor_map.compounds_for_ingredient(grape));
    }
    compounds.extend(parsed.flavor_compounds);
    enriched.flavor_compounds = compounds.into_iter().collect();

    Ok(enriched)
}
