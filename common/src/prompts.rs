//! 生成サービス向けプロンプト
//!
//! 応答は常に「JSONのみ・マークダウンなし」を要求するが、
//! 実際には守られないことがある前提で recovery モジュールが受ける。

use crate::types::Wine;

/// メニュー/レシピ/ワインリスト文書からの一括抽出プロンプト
pub fn menu_extraction_prompt() -> &'static str {
    r#"You are a culinary expert analyzing a menu, recipe book, or wine list document.

Extract ALL dishes and wines from this document.

For each DISH, extract:
- dish_name: Name of the dish
- category: "salad", "appetizer", "main", or "dessert" (choose the most appropriate)
- key_ingredients: List of main ingredients (proteins, vegetables, herbs, spices, sauces)
- dominant_flavors: List of dominant flavor profiles (e.g., "Spicy", "Acidic", "Umami", "Sweet", "Bitter", "Salty", "Rich", "Light", "Heavy", "Creamy", "Smoky")

For each WINE (if any), extract:
- wine_name: Name of the wine
- type_name: "Red", "White", "Rosé", "Sparkling", or "Dessert"
- region: Wine region (if mentioned)
- winery: Winery name (if mentioned)
- country: Country of origin (if mentioned)
- grapes: List of grape varieties (if mentioned)

IMPORTANT:
- IGNORE: Beers, soft drinks, cocktails, spirits, and other non-wine beverages
- Extract ALL items, not just a few
- If document contains only wines, return empty dishes array
- If document contains only dishes, return empty wines array
- If document contains both, extract both

Return ONLY valid JSON in this format (no markdown, no code blocks):
{
  "dishes": [
    {
      "dish_name": "Dish Name",
      "category": "main",
      "key_ingredients": ["ingredient1", "ingredient2", ...],
      "dominant_flavors": ["flavor1", "flavor2", ...]
    }
  ],
  "wines": [
    {
      "wine_name": "Wine Name",
      "type_name": "Red",
      "region": "Region Name",
      "winery": "Winery Name",
      "country": "Country Name",
      "grapes": ["grape1", "grape2"]
    }
  ]
}

Document: "#
}

/// 1本のワインの品種とフレーバー化合物を問い合わせるプロンプト
pub fn wine_enrichment_prompt(wine: &Wine) -> String {
    let mut desc = wine.wine_name.clone();
    if !wine.winery.is_empty() && wine.winery != "Unknown" {
        desc.push_str(&format!(" from {}", wine.winery));
    }
    if !wine.region.is_empty() && wine.region != "Unknown" {
        desc.push_str(&format!(", {}", wine.region));
    }
    if !wine.grapes.is_empty() {
        desc.push_str(&format!(". Grapes: {}", wine.grapes.join(", ")));
    }
    desc.push_str(&format!(". Type: {}", wine.type_name));

    format!(
        r#"You are a wine expert. For this wine, provide:
1. Grape varieties (if not already provided)
2. Key flavor compounds found in this wine based on its grapes, region, and style

Wine: {desc}

Return ONLY valid JSON (no markdown, no code blocks):
{{
  "grapes": ["grape1", "grape2"],
  "flavor_compounds": ["compound1", "compound2", "compound3"]
}}

If grapes are already provided, use those. Otherwise, identify the most likely grape varieties.
For flavor compounds, use standard chemical names (e.g., "Citral", "Geraniol", "Linalool")."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_demands_json() {
        let prompt = menu_extraction_prompt();
        assert!(prompt.contains("Return ONLY valid JSON"));
        assert!(prompt.contains("dish_name"));
        assert!(prompt.contains("wine_name"));
    }

    #[test]
    fn test_enrichment_prompt_includes_description() {
        let wine = Wine {
            wine_name: "Barolo".to_string(),
            type_name: "Red".to_string(),
            winery: "Vietti".to_string(),
            region: "Piedmont".to_string(),
            grapes: vec!["Nebbiolo".to_string()],
            ..Default::default()
        };

        let prompt = wine_enrichment_prompt(&wine);
        assert!(prompt.contains("Wine: Barolo from Vietti, Piedmont. Grapes: Nebbiolo. Type: Red"));
        assert!(prompt.contains("flavor_compounds"));
    }

    #[test]
    fn test_enrichment_prompt_skips_unknown_fields() {
        let wine = Wine {
            wine_name: "House Red".to_string(),
            type_name: "Red".to_string(),
            winery: "Unknown".to_string(),
            region: "Unknown".to_string(),
            ..Default::default()
        };

        let prompt = wine_enrichment_prompt(&wine);
        assert!(prompt.contains("Wine: House Red. Type: Red"));
        assert!(!prompt.contains("from Unknown"));
    }
}
