//! 知識ベースの読み書き
//!
//! ワインデータベース・食材フレーバーマップ・メニュープロファイルの
//! JSONファイルを読み込む。ファイル欠落は即座にエラーにする。

use crate::error::{Result, SommelierError};
use serde::Serialize;
use sommelier_ai_common::{normalize_wine, IngredientFlavorMap, MenuProfile, Pairings, Wine};
use serde_json::Value;
use std::path::Path;

/// ワインデータベース（JSON配列）を読み込んで正規化する
///
/// キー名の揺れは正規化で吸収する。名前のないレコードは検証エラー。
pub fn load_wines(path: &Path) -> Result<Vec<Wine>> {
    let content = read_file(path)?;
    let values: Vec<Value> = serde_json::from_str(&content)?;

    let mut wines = Vec::with_capacity(values.len());
    for value in &values {
        wines.push(normalize_wine(value)?);
    }
    Ok(wines)
}

/// 食材→化合物マップを読み込む
pub fn load_flavor_map(path: &Path) -> Result<IngredientFlavorMap> {
    let content = read_file(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// メニュープロファイル（料理ID→料理レコード）を読み込む
pub fn load_menu_profile(path: &Path) -> Result<MenuProfile> {
    let content = read_file(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// ペアリング結果（料理ID→ワインIDリスト）を読み込む
pub fn load_pairings(path: &Path) -> Result<Pairings> {
    let content = read_file(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// 任意のデータをJSONで保存する
pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(data)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SommelierError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}
