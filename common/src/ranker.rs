//! ワインランキングモジュール
//!
//! ペアリング頻度（何皿と合ったか）とマッチ品質（Jaccardの平均）を
//! 重み付きで合成し、ワインの総合順位を作る。

use crate::pairing::PairingEngine;
use crate::types::{Dish, Pairings, Wine};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// 頻度の重みのデフォルト
pub const DEFAULT_WEIGHT_FREQUENCY: f64 = 0.6;
/// 品質の重みのデフォルト
pub const DEFAULT_WEIGHT_QUALITY: f64 = 0.4;

/// ランキング1件
#[derive(Debug, Clone, Serialize)]
pub struct RankedWine {
    pub wine_id: i64,
    /// 合成スコア [0,1]
    pub score: f64,
    pub wine: Wine,
}

/// ワインランカー
#[derive(Debug, Clone, Default)]
pub struct WineRanker;

impl WineRanker {
    pub fn new() -> Self {
        Self
    }

    /// 各ワインが何皿とペアになったかを数える
    pub fn rank_by_pairing_frequency(&self, pairings: &Pairings) -> HashMap<i64, usize> {
        let mut frequency: HashMap<i64, usize> = HashMap::new();
        for wine_ids in pairings.values() {
            for wine_id in wine_ids {
                *frequency.entry(*wine_id).or_insert(0) += 1;
            }
        }
        frequency
    }

    /// 各ワインの平均マッチ品質（ペアになった料理とのJaccard平均）
    pub fn rank_by_match_quality(
        &self,
        pairings: &Pairings,
        wines: &[Wine],
        dishes: &[Dish],
    ) -> HashMap<i64, f64> {
        let engine = PairingEngine::default();
        let wine_by_id: HashMap<i64, &Wine> = wines.iter().map(|w| (w.wine_id, w)).collect();
        let dish_by_id: HashMap<&str, &Dish> =
            dishes.iter().map(|d| (d.dish_id.as_str(), d)).collect();

        let mut scores: HashMap<i64, Vec<f64>> = HashMap::new();
        for (dish_id, wine_ids) in pairings {
            let Some(dish) = dish_by_id.get(dish_id.as_str()) else {
                continue;
            };
            for wine_id in wine_ids {
                if let Some(wine) = wine_by_id.get(wine_id) {
                    let score = engine.calculate_pairing_score(dish, wine);
                    scores.entry(*wine_id).or_default().push(score);
                }
            }
        }

        scores
            .into_iter()
            .map(|(wine_id, s)| {
                let avg = if s.is_empty() {
                    0.0
                } else {
                    s.iter().sum::<f64>() / s.len() as f64
                };
                (wine_id, avg)
            })
            .collect()
    }

    /// 頻度と品質を重み付き合成したランキングを返す
    ///
    /// 1. 重みは合計1になるよう正規化する（設定ミスを吸収）
    /// 2. 頻度は観測された最大値で割って正規化（最頻ワインが1.0）。
    ///    頻度>0のワインが1つもなければ頻度軸は全て0
    /// 3. 品質は既に[0,1]なのでそのまま
    /// 4. どちらかのマップに現れたワインを全て対象にし、欠けた軸は0扱い
    /// 5. 合成スコア降順の安定ソート（同点はワインリストの元の順序）
    pub fn rank_wines(
        &self,
        wines: &[Wine],
        pairings: &Pairings,
        dishes: &[Dish],
        weight_frequency: f64,
        weight_quality: f64,
    ) -> Vec<RankedWine> {
        // 重みの正規化
        let total_weight = weight_frequency + weight_quality;
        let (weight_frequency, weight_quality) = if total_weight > 0.0 {
            (weight_frequency / total_weight, weight_quality / total_weight)
        } else {
            (DEFAULT_WEIGHT_FREQUENCY, DEFAULT_WEIGHT_QUALITY)
        };

        let frequency = self.rank_by_pairing_frequency(pairings);
        let max_freq = frequency.values().copied().max().unwrap_or(0);

        let quality = self.rank_by_match_quality(pairings, wines, dishes);

        // ワインリストの挿入順で走査することで同点時の順序を安定させる
        let mut ranked: Vec<RankedWine> = wines
            .iter()
            .filter(|w| frequency.contains_key(&w.wine_id) || quality.contains_key(&w.wine_id))
            .map(|w| {
                let freq_score = if max_freq > 0 {
                    frequency.get(&w.wine_id).copied().unwrap_or(0) as f64 / max_freq as f64
                } else {
                    0.0
                };
                let qual_score = quality.get(&w.wine_id).copied().unwrap_or(0.0);
                RankedWine {
                    wine_id: w.wine_id,
                    score: weight_frequency * freq_score + weight_quality * qual_score,
                    wine: w.clone(),
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }
}
