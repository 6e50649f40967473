//! フレーバー化合物セット
//!
//! 化合物名は意味を持たない不透明トークンとして扱う（大文字小文字は区別）。
//! 重複と空文字列を除去した集合として保持し、Jaccard類似度と
//! 共有化合物数（生の積集合サイズ）の計算を提供する。

use std::collections::BTreeSet;

/// 化合物名の集合
///
/// 不変条件: 空文字列を含まない。挿入順序は保持しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSet {
    compounds: BTreeSet<String>,
}

impl CompoundSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列スライスから構築（空文字列は無視）
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compounds = names
            .into_iter()
            .filter(|n| !n.as_ref().is_empty())
            .map(|n| n.as_ref().to_string())
            .collect();
        Self { compounds }
    }

    pub fn len(&self) -> usize {
        self.compounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.compounds.contains(name)
    }

    /// 共有化合物数（積集合のサイズ）
    ///
    /// ペアリング候補の選定はJaccardではなくこの生カウントで行う。
    pub fn shared_count(&self, other: &CompoundSet) -> usize {
        self.compounds.intersection(&other.compounds).count()
    }

    /// 和集合のサイズ
    pub fn union_count(&self, other: &CompoundSet) -> usize {
        self.compounds.union(&other.compounds).count()
    }

    /// 共有化合物の一覧（ソート済み）
    pub fn shared_compounds(&self, other: &CompoundSet) -> Vec<String> {
        self.compounds
            .intersection(&other.compounds)
            .cloned()
            .collect()
    }

    /// Jaccard類似度: |A ∩ B| / |A ∪ B|
    ///
    /// 両方が空集合の場合は0.0を返す（データ欠落を完全一致と誤認させない）。
    pub fn jaccard(&self, other: &CompoundSet) -> f64 {
        if self.is_empty() && other.is_empty() {
            return 0.0;
        }

        let union = self.union_count(other);
        if union == 0 {
            return 0.0;
        }

        self.shared_count(other) as f64 / union as f64
    }

    /// ソート済みの化合物名一覧
    pub fn to_vec(&self) -> Vec<String> {
        self.compounds.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> CompoundSet {
        CompoundSet::from_names(names.iter().copied())
    }

    #[test]
    fn test_from_names_dedup() {
        let s = set(&["Citral", "Citral", "Geraniol"]);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_from_names_skips_empty_strings() {
        let s = set(&["Citral", "", "Geraniol"]);
        assert_eq!(s.len(), 2);
        assert!(!s.contains(""));
    }

    #[test]
    fn test_case_sensitive() {
        let s = set(&["Citral", "citral"]);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_jaccard_both_empty_is_zero() {
        // 空集合同士は1.0ではなく0.0
        assert_eq!(CompoundSet::new().jaccard(&CompoundSet::new()), 0.0);
    }

    #[test]
    fn test_jaccard_one_empty() {
        let a = set(&["Citral"]);
        assert_eq!(a.jaccard(&CompoundSet::new()), 0.0);
        assert_eq!(CompoundSet::new().jaccard(&a), 0.0);
    }

    #[test]
    fn test_jaccard_known_value() {
        // {Citral, Geraniol} vs {Geraniol, Linalool}: 共有1 / 和集合3
        let a = set(&["Citral", "Geraniol"]);
        let b = set(&["Geraniol", "Linalool"]);
        assert!((a.jaccard(&b) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = set(&["Citral", "Geraniol", "Limonene"]);
        let b = set(&["Geraniol", "Linalool"]);
        assert_eq!(a.jaccard(&b), b.jaccard(&a));
    }

    #[test]
    fn test_jaccard_range() {
        let a = set(&["Citral", "Geraniol"]);
        let b = set(&["Citral", "Geraniol"]);
        assert_eq!(a.jaccard(&b), 1.0);

        let c = set(&["Linalool"]);
        assert_eq!(a.jaccard(&c), 0.0);
    }

    #[test]
    fn test_shared_count() {
        let a = set(&["Citral", "Geraniol", "Limonene"]);
        let b = set(&["Geraniol", "Limonene", "Linalool"]);
        assert_eq!(a.shared_count(&b), 2);
        assert_eq!(a.shared_compounds(&b), vec!["Geraniol", "Limonene"]);
    }
}
