//! 境界正規化
//!
//! 抽出結果やファイル由来の生レコードを標準形（Dish / Wine）へ変換する。
//! 取り込みソースごとにキー名が揺れるため、閉じた別名テーブルで吸収する。
//! 正規化はパイプラインの入口で一度だけ行い、以降のモジュールは
//! 標準形だけを扱う。

use crate::error::{Error, Result};
use crate::types::{Dish, RawDish, RawWine, Wine};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// 有効な料理カテゴリ。これ以外は main に落とす
const VALID_CATEGORIES: &[&str] = &["salad", "appetizer", "main", "dessert"];

const WINE_ID_ALIASES: &[&str] = &["wine_id", "id", "wineid"];
const WINE_NAME_ALIASES: &[&str] = &["wine_name", "name", "winename", "title"];
const TYPE_ALIASES: &[&str] = &["type_name", "type", "winetype", "wine_type", "color"];
const BODY_ALIASES: &[&str] = &["body_name", "body", "winebody", "wine_body"];
const ACIDITY_ALIASES: &[&str] = &["acidity_name", "acidity", "wineacidity", "wine_acidity"];
const GRAPES_ALIASES: &[&str] = &["grapes", "grape", "varietal", "varietals"];
const COUNTRY_ALIASES: &[&str] = &["country", "country_name", "origin"];
const REGION_ALIASES: &[&str] = &["region", "region_name", "appellation"];
const WINERY_ALIASES: &[&str] = &["winery", "winery_name", "producer", "maker"];
const COMPOUNDS_ALIASES: &[&str] = &["flavor_compounds", "compounds"];
const HARMONIZE_ALIASES: &[&str] = &["harmonize", "harmonizes", "pairings", "food_pairings"];

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
    static ref SPACE_RUNS: Regex = Regex::new(r"[_\s]+").unwrap();
}

/// 料理名から決定的な12桁hexのIDを導出する
pub fn dish_id_for_name(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    hex::encode(digest)[..12].to_string()
}

/// ワイン名から決定的な数値IDを導出する（9桁に収める）
pub fn wine_id_for_name(name: &str) -> i64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % 1_000_000_000) as i64
}

/// マッチング用に食材名を整える
///
/// 小文字化して英数字と空白以外を落とし、空白の連なりを1つにする。
pub fn clean_ingredient_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NON_ALNUM.replace_all(lowered.trim(), "");
    SPACE_RUNS.replace_all(&stripped, " ").trim().to_string()
}

/// 抽出直後の料理レコードを標準形にする
///
/// compounds と suggested_wine_type はこの段階では未解決のまま。
/// 料理名が空の場合は ValidationError。
pub fn normalize_dish(raw: &RawDish, source_file: &str) -> Result<Dish> {
    let name = raw.dish_name.trim();
    if name.is_empty() {
        return Err(Error::Validation("料理名がありません".to_string()));
    }

    let category = raw.category.trim().to_lowercase();
    let category = if VALID_CATEGORIES.contains(&category.as_str()) {
        category
    } else {
        "main".to_string()
    };

    Ok(Dish {
        dish_id: dish_id_for_name(name),
        name: name.to_string(),
        category,
        ingredients: raw.key_ingredients.clone(),
        compounds: Vec::new(),
        tags: raw.dominant_flavors.clone(),
        suggested_wine_type: "Unknown".to_string(),
        source_file: source_file.to_string(),
        no_profile: false,
    })
}

/// 抽出直後のワインレコードを標準形にする
pub fn normalize_raw_wine(raw: &RawWine) -> Result<Wine> {
    let name = raw.wine_name.trim();
    if name.is_empty() {
        return Err(Error::Validation("ワイン名がありません".to_string()));
    }

    Ok(Wine {
        wine_id: wine_id_for_name(name),
        wine_name: name.to_string(),
        type_name: or_unknown(&raw.type_name),
        body_name: "Unknown".to_string(),
        acidity_name: "Unknown".to_string(),
        grapes: raw.grapes.clone(),
        country: or_unknown(&raw.country),
        region: or_unknown(&raw.region),
        winery: or_unknown(&raw.winery),
        flavor_compounds: Vec::new(),
        harmonize: Vec::new(),
    })
}

/// キー名の揺れたJSONオブジェクトを標準形のワインにする
///
/// CSV/XLSX/JSON由来のレコードが通る入口。wine_name系のキーが
/// 見つからなければ ValidationError。IDが無ければ名前から導出する。
pub fn normalize_wine(value: &Value) -> Result<Wine> {
    let obj = value.as_object().ok_or_else(|| {
        Error::Validation("ワインレコードがオブジェクトではありません".to_string())
    })?;

    let wine_name = string_field(obj, WINE_NAME_ALIASES)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("wine_name がありません".to_string()))?;

    let wine_id = lookup(obj, WINE_ID_ALIASES)
        .and_then(Value::as_i64)
        .unwrap_or_else(|| wine_id_for_name(&wine_name));

    Ok(Wine {
        wine_id,
        wine_name,
        type_name: string_field(obj, TYPE_ALIASES).unwrap_or_else(unknown),
        body_name: string_field(obj, BODY_ALIASES).unwrap_or_else(unknown),
        acidity_name: string_field(obj, ACIDITY_ALIASES).unwrap_or_else(unknown),
        grapes: list_field(obj, GRAPES_ALIASES),
        country: string_field(obj, COUNTRY_ALIASES).unwrap_or_else(unknown),
        region: string_field(obj, REGION_ALIASES).unwrap_or_else(unknown),
        winery: string_field(obj, WINERY_ALIASES).unwrap_or_else(unknown),
        flavor_compounds: list_field(obj, COMPOUNDS_ALIASES),
        harmonize: list_field(obj, HARMONIZE_ALIASES),
    })
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn or_unknown(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        unknown()
    } else {
        trimmed.to_string()
    }
}

/// 別名リストの優先順で、大文字小文字を無視してキーを引く
fn lookup<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    for alias in aliases {
        for (key, value) in obj {
            if key.eq_ignore_ascii_case(alias) && !value.is_null() {
                return Some(value);
            }
        }
    }
    None
}

fn string_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    lookup(obj, aliases)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// リスト値の取り出し。カンマ区切りの文字列もリストに起こす
fn list_field(obj: &Map<String, Value>, aliases: &[&str]) -> Vec<String> {
    match lookup(obj, aliases) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_string())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        _ => Vec::new(),
    }
}
