//! ペアリングエンジン
//!
//! 料理1皿ごとにフレーバー化合物の重なりでワイン候補を選定する。
//!
//! 注意: 候補の選定は生の共有化合物数で行い、Jaccard類似度は使わない。
//! 化合物数の多いワインはJaccardが低くても共有数で上位に来ることがある。
//! `calculate_pairing_score`（Jaccard）はレポート用の品質指標であり、
//! 選定順位とは一致しないことがある。これは元実装の仕様として維持する。

use crate::compound::CompoundSet;
use crate::types::{Dish, Pairings, Wine};

/// 1皿あたりのワイン候補数のデフォルト
pub const DEFAULT_MAX_WINES_PER_DISH: usize = 3;

/// ペアリングエンジン
#[derive(Debug, Clone)]
pub struct PairingEngine {
    max_wines_per_dish: usize,
}

impl Default for PairingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WINES_PER_DISH)
    }
}

impl PairingEngine {
    pub fn new(max_wines_per_dish: usize) -> Self {
        Self { max_wines_per_dish }
    }

    /// 1皿に対するワイン候補を最大max_wines件返す
    ///
    /// - 料理に化合物プロファイルがない場合は即座に空リストを返す
    ///   （「プロファイルなし」は「良い候補なし」と区別される正規の結果）
    /// - 共有化合物が0のワインは除外
    /// - 共有化合物数の降順、同数は候補リストの元の順序を維持
    pub fn pair_wines_to_dish(
        &self,
        dish: &Dish,
        wines: &[Wine],
        max_wines: Option<usize>,
    ) -> Vec<i64> {
        let max_wines = max_wines.unwrap_or(self.max_wines_per_dish);

        let dish_set = dish.compound_set();
        if dish_set.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(i64, usize)> = wines
            .iter()
            .filter_map(|wine| {
                let shared = dish_set.shared_count(&wine.compound_set());
                (shared > 0).then_some((wine.wine_id, shared))
            })
            .collect();

        // 安定ソート: 共有数が同じなら元の候補順を保つ
        matches.sort_by(|a, b| b.1.cmp(&a.1));

        matches.into_iter().take(max_wines).map(|(id, _)| id).collect()
    }

    /// 料理とワインのペアリング品質スコア（Jaccard類似度）
    ///
    /// レポート用。候補選定には使わない。
    pub fn calculate_pairing_score(&self, dish: &Dish, wine: &Wine) -> f64 {
        let dish_set = dish.compound_set();
        if dish_set.is_empty() {
            return 0.0;
        }
        dish_set.jaccard(&wine.compound_set())
    }

    /// 全料理に対して独立にペアリングを行う
    pub fn pair_wines_to_dishes(
        &self,
        dishes: &[Dish],
        wines: &[Wine],
        max_wines_per_dish: Option<usize>,
    ) -> Pairings {
        let mut pairings = Pairings::new();
        for dish in dishes {
            let wine_ids = self.pair_wines_to_dish(dish, wines, max_wines_per_dish);
            pairings.insert(dish.dish_id.clone(), wine_ids);
        }
        pairings
    }

    /// 共有化合物数でワインを降順に並べた全件リスト（デバッグ/レポート用）
    pub fn search_wines_by_compounds(
        &self,
        compounds: &[String],
        wines: &[Wine],
    ) -> Vec<(i64, Vec<String>)> {
        let target = CompoundSet::from_names(compounds);
        let mut matches: Vec<(i64, Vec<String>)> = wines
            .iter()
            .filter_map(|wine| {
                let shared = target.shared_compounds(&wine.compound_set());
                (!shared.is_empty()).then_some((wine.wine_id, shared))
            })
            .collect();

        matches.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        matches
    }
}
