//! ワイン類似度解析モジュール
//!
//! フレーバー化合物の重なりでワイン同士の類似度を判定し、
//! 閾値以上のペア検出と推移的なクラスタリングを行う。
//! 近重複ワインの除外候補の提示に使う。

use crate::compound::CompoundSet;
use crate::types::Wine;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// 類似判定のデフォルト閾値
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// 閾値以上の類似ペア（無向: id_a < 発見順のペア片方向のみ保持）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityPair {
    pub id_a: i64,
    pub id_b: i64,
    /// Jaccard類似度 [0,1]
    pub score: f64,
}

/// 類似度解析器
#[derive(Debug, Clone)]
pub struct SimilarityAnalyzer {
    similarity_threshold: f64,
}

impl Default for SimilarityAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl SimilarityAnalyzer {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// 2ワイン間のJaccard類似度
    pub fn calculate_similarity(&self, wine1: &Wine, wine2: &Wine) -> f64 {
        wine1.compound_set().jaccard(&wine2.compound_set())
    }

    /// 閾値以上の全ペアをスコア降順で返す
    ///
    /// 同点は発見順（外側インデックス→内側インデックス）を保持する。
    pub fn find_similar_pairs(&self, wines: &[Wine], threshold: Option<f64>) -> Vec<SimilarityPair> {
        let threshold = threshold.unwrap_or(self.similarity_threshold);
        let sets: Vec<(i64, CompoundSet)> = wines
            .iter()
            .map(|w| (w.wine_id, w.compound_set()))
            .collect();

        let mut pairs = Vec::new();
        for (i, (id_a, set_a)) in sets.iter().enumerate() {
            for (id_b, set_b) in sets.iter().skip(i + 1) {
                let score = set_a.jaccard(set_b);
                if score >= threshold {
                    pairs.push(SimilarityPair {
                        id_a: *id_a,
                        id_b: *id_b,
                        score,
                    });
                }
            }
        }

        // 安定ソート: 同点は発見順を維持
        pairs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        pairs
    }

    /// 類似ペアから推移的クラスタを構築する
    ///
    /// (a,b)と(b,c)が閾値以上なら、(a,c)が閾値未満でもa,cは同一クラスタになる。
    /// どのペアにも属さないワインはクラスタ化しない。
    pub fn group_similar_wines(&self, wines: &[Wine], threshold: Option<f64>) -> Vec<Vec<i64>> {
        let pairs = self.find_similar_pairs(wines, threshold);

        let mut cluster_of: HashMap<i64, usize> = HashMap::new();
        let mut clusters: Vec<Option<BTreeSet<i64>>> = Vec::new();

        for pair in &pairs {
            match (
                cluster_of.get(&pair.id_a).copied(),
                cluster_of.get(&pair.id_b).copied(),
            ) {
                (None, None) => {
                    // 新規クラスタ
                    let idx = clusters.len();
                    let mut set = BTreeSet::new();
                    set.insert(pair.id_a);
                    set.insert(pair.id_b);
                    clusters.push(Some(set));
                    cluster_of.insert(pair.id_a, idx);
                    cluster_of.insert(pair.id_b, idx);
                }
                (Some(idx), None) => {
                    if let Some(set) = clusters[idx].as_mut() {
                        set.insert(pair.id_b);
                    }
                    cluster_of.insert(pair.id_b, idx);
                }
                (None, Some(idx)) => {
                    if let Some(set) = clusters[idx].as_mut() {
                        set.insert(pair.id_a);
                    }
                    cluster_of.insert(pair.id_a, idx);
                }
                (Some(idx_a), Some(idx_b)) if idx_a != idx_b => {
                    // クラスタ併合: bの中身をaへ移す
                    if let Some(moved) = clusters[idx_b].take() {
                        for id in &moved {
                            cluster_of.insert(*id, idx_a);
                        }
                        if let Some(set) = clusters[idx_a].as_mut() {
                            set.extend(moved);
                        }
                    }
                }
                _ => {} // 既に同一クラスタ
            }
        }

        clusters
            .into_iter()
            .flatten()
            .map(|set| set.into_iter().collect())
            .collect()
    }

    /// 全ペアの類似度行列（対称: 両方向で引ける）
    pub fn get_similarity_matrix(&self, wines: &[Wine]) -> HashMap<(i64, i64), f64> {
        let sets: Vec<(i64, CompoundSet)> = wines
            .iter()
            .map(|w| (w.wine_id, w.compound_set()))
            .collect();

        let mut matrix = HashMap::new();
        for (i, (id_a, set_a)) in sets.iter().enumerate() {
            for (id_b, set_b) in sets.iter().skip(i + 1) {
                let score = set_a.jaccard(set_b);
                matrix.insert((*id_a, *id_b), score);
                matrix.insert((*id_b, *id_a), score);
            }
        }
        matrix
    }
}
