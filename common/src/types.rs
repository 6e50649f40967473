//! レコード型定義
//!
//! 境界正規化後の標準形:
//! - Dish: 料理レコード（化合物プロファイル付き）
//! - Wine: ワインレコード
//!
//! 抽出直後の生の形:
//! - RawDish / RawWine: 生成サービスのJSON出力と同じキー構成

use crate::compound::CompoundSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 料理ID → 料理レコードのマッピング（メニュープロファイル）
pub type MenuProfile = BTreeMap<String, Dish>;

/// 料理ID → ワインIDリストのマッピング（ペアリング結果）
pub type Pairings = BTreeMap<String, Vec<i64>>;

/// 正規化済みの料理レコード
///
/// 抽出・正規化パスで一度だけ生成され、以降は不変。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dish {
    pub dish_id: String,
    pub name: String,
    /// "salad" / "appetizer" / "main" / "dessert"
    pub category: String,
    pub ingredients: Vec<String>,
    /// 食材から解決したフレーバー化合物
    pub compounds: Vec<String>,
    /// 支配的なフレーバータグ
    pub tags: Vec<String>,
    pub suggested_wine_type: String,
    pub source_file: String,
    /// 食材から化合物を1つも解決できなかった場合にtrue
    ///
    /// エラーではなく正規の状態。ペアリングでは空リストが返る。
    pub no_profile: bool,
}

impl Dish {
    pub fn compound_set(&self) -> CompoundSet {
        CompoundSet::from_names(&self.compounds)
    }
}

/// 正規化済みのワインレコード
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wine {
    pub wine_id: i64,
    pub wine_name: String,
    /// "Red" / "White" / "Rosé" / "Sparkling" / "Dessert"
    pub type_name: String,
    pub body_name: String,
    pub acidity_name: String,
    pub grapes: Vec<String>,
    pub country: String,
    pub region: String,
    pub winery: String,
    pub flavor_compounds: Vec<String>,
    pub harmonize: Vec<String>,
}

impl Wine {
    pub fn compound_set(&self) -> CompoundSet {
        CompoundSet::from_names(&self.flavor_compounds)
    }
}

/// 抽出レスポンス中の料理オブジェクト（正規化前）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDish {
    #[serde(alias = "name")]
    pub dish_name: String,
    pub category: String,
    #[serde(alias = "ingredients")]
    pub key_ingredients: Vec<String>,
    #[serde(alias = "tags")]
    pub dominant_flavors: Vec<String>,
}

/// 抽出レスポンス中のワインオブジェクト（正規化前）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWine {
    #[serde(alias = "name")]
    pub wine_name: String,
    #[serde(alias = "type")]
    pub type_name: String,
    pub region: String,
    pub winery: String,
    pub country: String,
    pub grapes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dish_default() {
        let dish = Dish::default();
        assert_eq!(dish.dish_id, "");
        assert!(dish.compounds.is_empty());
        assert!(!dish.no_profile);
    }

    #[test]
    fn test_dish_compound_set_dedup() {
        let dish = Dish {
            compounds: vec!["Citral".into(), "Citral".into(), "Geraniol".into()],
            ..Default::default()
        };
        assert_eq!(dish.compound_set().len(), 2);
    }

    #[test]
    fn test_wine_serialize() {
        let wine = Wine {
            wine_id: 42,
            wine_name: "Sancerre".to_string(),
            type_name: "White".to_string(),
            flavor_compounds: vec!["Citral".into(), "Linalool".into()],
            ..Default::default()
        };

        let json = serde_json::to_string(&wine).expect("シリアライズ失敗");
        assert!(json.contains("\"wine_id\":42"));
        assert!(json.contains("\"wine_name\":\"Sancerre\""));
        assert!(json.contains("\"flavor_compounds\":[\"Citral\",\"Linalool\"]"));
    }

    #[test]
    fn test_wine_deserialize_missing_fields() {
        // 必須フィールドのみでデシリアライズできることを確認
        let json = r#"{"wine_id": 1, "wine_name": "Chianti"}"#;

        let wine: Wine = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(wine.wine_name, "Chianti");
        assert_eq!(wine.type_name, ""); // デフォルト値
        assert!(wine.grapes.is_empty());
    }

    #[test]
    fn test_raw_dish_deserialize() {
        let json = r#"{
            "dish_name": "Grilled Sea Bass",
            "category": "main",
            "key_ingredients": ["sea bass", "lemon", "butter"],
            "dominant_flavors": ["Light", "Acidic"]
        }"#;

        let dish: RawDish = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(dish.dish_name, "Grilled Sea Bass");
        assert_eq!(dish.key_ingredients.len(), 3);
        assert_eq!(dish.dominant_flavors, vec!["Light", "Acidic"]);
    }

    #[test]
    fn test_raw_dish_deserialize_alias_keys() {
        // name/ingredients/tags の別名キーも受け入れる
        let json = r#"{"name": "Caesar Salad", "ingredients": ["romaine"], "tags": ["Fresh"]}"#;

        let dish: RawDish = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(dish.dish_name, "Caesar Salad");
        assert_eq!(dish.key_ingredients, vec!["romaine"]);
    }

    #[test]
    fn test_raw_wine_deserialize() {
        let json = r#"{
            "wine_name": "Barolo Riserva",
            "type_name": "Red",
            "region": "Piedmont",
            "grapes": ["Nebbiolo"]
        }"#;

        let wine: RawWine = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(wine.wine_name, "Barolo Riserva");
        assert_eq!(wine.type_name, "Red");
        assert_eq!(wine.grapes, vec!["Nebbiolo"]);
        assert_eq!(wine.winery, ""); // デフォルト値
    }

    #[test]
    fn test_raw_wine_deserialize_alias_keys() {
        let json = r#"{"name": "Rioja", "type": "Red"}"#;

        let wine: RawWine = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(wine.wine_name, "Rioja");
        assert_eq!(wine.type_name, "Red");
    }
}
