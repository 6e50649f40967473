//! 食材→フレーバー化合物マップ
//!
//! 永続化された知識ベース（食材名 → {cleaned_name, compounds}）を引いて、
//! 料理の食材リストを化合物プロファイルに解決する。
//! 引き当ては 完全一致 → 整形名一致 → 部分一致 の順で試す。

use crate::normalize::clean_ingredient_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// マップの1エントリ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorEntry {
    pub cleaned_name: String,
    pub compounds: Vec<String>,
}

/// 食材フレーバーマップ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientFlavorMap {
    #[serde(flatten)]
    entries: BTreeMap<String, FlavorEntry>,
}

impl IngredientFlavorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, FlavorEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1食材の化合物を引く
    ///
    /// 完全一致 → 整形名一致 → 部分一致（どちらかがどちらかを含む）の順。
    /// どれにも当たらなければ空リスト。
    pub fn compounds_for_ingredient(&self, ingredient: &str) -> Vec<String> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        if let Some(entry) = self.entries.get(ingredient) {
            return entry.compounds.clone();
        }

        let cleaned = clean_ingredient_name(ingredient);
        if cleaned.is_empty() {
            return Vec::new();
        }

        for entry in self.entries.values() {
            if entry.cleaned_name == cleaned {
                return entry.compounds.clone();
            }
        }

        for entry in self.entries.values() {
            let map_cleaned = entry.cleaned_name.as_str();
            if !map_cleaned.is_empty()
                && (map_cleaned.contains(&cleaned) || cleaned.contains(map_cleaned))
            {
                return entry.compounds.clone();
            }
        }

        Vec::new()
    }

    /// 食材リスト全体の化合物プロファイル（重複排除してソート済み）
    pub fn compounds_for_ingredients(&self, ingredients: &[String]) -> Vec<String> {
        let mut all: BTreeSet<String> = BTreeSet::new();
        for ingredient in ingredients {
            all.extend(self.compounds_for_ingredient(ingredient));
        }
        all.into_iter().collect()
    }
}

/// フレーバータグと化合物からワインタイプを推定するヒューリスティック
pub fn suggest_wine_type(dominant_flavors: &[String], compounds: &[String]) -> String {
    let flavors: Vec<String> = dominant_flavors.iter().map(|f| f.to_lowercase()).collect();
    let has_flavor = |candidates: &[&str]| candidates.iter().any(|c| flavors.iter().any(|f| f == c));

    if has_flavor(&["spicy", "rich", "heavy", "umami", "meaty"]) {
        return "Red".to_string();
    }
    if has_flavor(&["light", "acidic", "citrus", "fresh", "crisp"]) {
        return "White".to_string();
    }
    if has_flavor(&["sweet", "dessert", "creamy"]) {
        return "Dessert".to_string();
    }
    if has_flavor(&["celebratory", "bubbly"]) {
        return "Sparkling".to_string();
    }

    // タグで決まらなければ化合物で判定（テルペン系は白に多い）
    let has_terpenes = compounds.iter().any(|c| {
        let c = c.to_lowercase();
        c.contains("citral") || c.contains("geraniol") || c.contains("linalool")
    });
    if has_terpenes {
        "White".to_string()
    } else {
        "Red".to_string()
    }
}
