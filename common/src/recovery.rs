//! 抽出レスポンスの復旧パイプライン
//!
//! 生成サービスの応答はJSONのはずだが、コードフェンスで包まれていたり、
//! トークン上限で途中切断されていたり、末尾カンマ等の崩れを含むことがある。
//! このモジュールは1つの生テキストを必ず `ExtractionResult` に変換する。
//! 不正な入力でもエラーを境界の外に出さない（最悪でも status=empty）。
//!
//! 処理順: フェンス除去 → 直接パース → 修復（末尾カンマ除去 → 構造修正 →
//! 未終端文字列の修正）→ 再パース → 部分復旧（完結したオブジェクトだけを
//! 個別に拾う）。

use crate::types::{RawDish, RawWine};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

lazy_static! {
    /// 配列の外に漏れた数値トークン（直前の配列に戻す）
    static ref LEAKED_NUMBER: Regex =
        Regex::new(r"\]\s*\n\s*(-?\d+(?:\.\d+)?)\s*(,?)").unwrap();
    /// 連続した重複カンマ
    static ref DUPLICATE_COMMAS: Regex = Regex::new(r",(\s*,)+").unwrap();
    /// 閉じ括弧直前の残存カンマ
    static ref COMMA_BEFORE_CLOSER: Regex = Regex::new(r",(\s*[\]\}])").unwrap();
    /// 値の引用符が閉じないまま行が終わり、次の行がキーで始まるパターン
    static ref UNTERMINATED_VALUE_MID: Regex =
        Regex::new(r#"(?m)^(\s*"\w+"\s*:\s*"[^"\n]*)\n(\s*")"#).unwrap();
    /// 値の引用符が閉じないまま行が終わるパターン（末尾）
    static ref UNTERMINATED_VALUE_END: Regex =
        Regex::new(r#"(?m)^(\s*"\w+"\s*:\s*"[^"\n]*)$"#).unwrap();
    /// 必須フィールドが全て揃い、閉じられた料理オブジェクト
    static ref DISH_OBJECT: Regex = Regex::new(
        r#"\{\s*"dish_name"\s*:\s*"[^"]*"\s*,\s*"category"\s*:\s*"[^"]*"\s*,\s*"key_ingredients"\s*:\s*\[[^\]]*\]\s*,\s*"dominant_flavors"\s*:\s*\[[^\]]*\]\s*\}"#
    )
    .unwrap();
    /// 閉じられたワインオブジェクト
    static ref WINE_OBJECT: Regex =
        Regex::new(r#"\{\s*"wine_name"\s*:\s*"[^"]*"[^}]*\}"#).unwrap();
}

/// 復旧の結果ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// ペイロード全体をパースできた（修復後の成功を含む）
    Full,
    /// 完結したオブジェクトだけを部分的に拾えた
    Partial,
    /// 何も復旧できなかった
    Empty,
}

/// 1回の復旧試行の結果
///
/// expected_* は元テキスト中のキー出現数から推定した件数。
/// 復旧件数と比べて極端に少ない場合の警告判定に使う。
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub dishes: Vec<RawDish>,
    pub wines: Vec<RawWine>,
    pub status: RecoveryStatus,
    pub expected_dishes: usize,
    pub expected_wines: usize,
}

impl ExtractionResult {
    fn empty(expected_dishes: usize, expected_wines: usize) -> Self {
        Self {
            dishes: Vec::new(),
            wines: Vec::new(),
            status: RecoveryStatus::Empty,
            expected_dishes,
            expected_wines,
        }
    }

    pub fn recovered_dishes(&self) -> usize {
        self.dishes.len()
    }

    pub fn recovered_wines(&self) -> usize {
        self.wines.len()
    }
}

/// 抽出レスポンスの復旧器
#[derive(Debug, Clone, Default)]
pub struct ExtractionRecovery;

impl ExtractionRecovery {
    pub fn new() -> Self {
        Self
    }

    /// 生テキストを復旧して構造化する。決してエラーにならない。
    pub fn recover(&self, raw: &str) -> ExtractionResult {
        let cleaned = strip_code_fences(raw);
        let expected_dishes = cleaned.matches("\"dish_name\"").count();
        let expected_wines = cleaned.matches("\"wine_name\"").count();

        if let Some((dishes, wines)) = try_parse(&cleaned) {
            return ExtractionResult {
                dishes,
                wines,
                status: RecoveryStatus::Full,
                expected_dishes,
                expected_wines,
            };
        }

        let repaired = repair(&cleaned);
        if let Some((dishes, wines)) = try_parse(&repaired) {
            return ExtractionResult {
                dishes,
                wines,
                status: RecoveryStatus::Full,
                expected_dishes,
                expected_wines,
            };
        }

        // 部分復旧は修復後ではなく元のテキストに対して行う
        let (dishes, wines) = partial_recover(&cleaned);
        if dishes.is_empty() && wines.is_empty() {
            return ExtractionResult::empty(expected_dishes, expected_wines);
        }
        ExtractionResult {
            dishes,
            wines,
            status: RecoveryStatus::Partial,
            expected_dishes,
            expected_wines,
        }
    }
}

/// 前後のコードフェンスマーカーを除去する
pub fn strip_code_fences(text: &str) -> String {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    t.trim().to_string()
}

/// 途中切断の兆候を検出する
///
/// 以下のいずれかで切断とみなす:
/// - 閉じ括弧を伴わない引用符で終わっている
/// - フィールド名の途中で終わっている
/// - 開き括弧/開き波括弧が閉じより多い
pub fn looks_truncated(text: &str) -> bool {
    let t = text.trim_end();
    let ends_open_quote = t.ends_with('"') && !t.ends_with("\"}") && !t.ends_with("\"]");
    let ends_mid_keyword = t.ends_with("\"dish_") || t.ends_with("\"wine_");
    let unbalanced_braces = t.matches('{').count() > t.matches('}').count();
    let unbalanced_brackets = t.matches('[').count() > t.matches(']').count();
    ends_open_quote || ends_mid_keyword || unbalanced_braces || unbalanced_brackets
}

/// パース失敗時の修復。固定順で適用する。
fn repair(text: &str) -> String {
    let repaired = remove_trailing_commas(text);
    let repaired = fix_structural_patterns(&repaired);
    fix_unterminated_strings(&repaired)
}

fn try_parse(text: &str) -> Option<(Vec<RawDish>, Vec<RawWine>)> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;
    // トップレベルキーの欠落は空コレクションに正規化する
    let dishes = collect_items(obj.get("dishes"));
    let wines = collect_items(obj.get("wines"));
    Some((dishes, wines))
}

fn collect_items<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// 末尾カンマの除去
///
/// 文字列内のカンマを壊さないよう、引用符とエスケープの状態を追跡しながら
/// 1パスで走査する。閉じ括弧に到達したとき、直前の空白を遡って
/// カンマがあれば削除する。
fn remove_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                stack.push(c);
                out.push(c);
            }
            '}' | ']' => {
                if let Some(&open) = stack.last() {
                    if (c == '}' && open == '{') || (c == ']' && open == '[') {
                        stack.pop();
                    }
                }
                strip_comma_before_tail(&mut out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// 出力バッファ末尾の空白を遡り、直前のカンマを1つ削除する
fn strip_comma_before_tail(out: &mut String) {
    let content_len = out.trim_end().len();
    if out[..content_len].ends_with(',') {
        let tail = out[content_len..].to_string();
        out.truncate(content_len - 1);
        out.push_str(&tail);
    }
}

/// 既知の崩れパターンの修正
fn fix_structural_patterns(text: &str) -> String {
    let fixed = LEAKED_NUMBER.replace_all(text, ", ${1}]${2}");
    let fixed = DUPLICATE_COMMAS.replace_all(&fixed, ",");
    COMMA_BEFORE_CLOSER.replace_all(&fixed, "${1}").into_owned()
}

/// 値の引用符が閉じないまま行が終わるケースの修正
///
/// 次の行がキーで始まる場合は、閉じ引用符と一緒に失われたカンマも戻す。
fn fix_unterminated_strings(text: &str) -> String {
    let fixed = UNTERMINATED_VALUE_MID.replace_all(text, "${1}\",\n${2}");
    UNTERMINATED_VALUE_END.replace_all(&fixed, "${1}\"").into_owned()
}

/// 完結したオブジェクトだけを個別に拾う部分復旧
///
/// 必須フィールドが揃い、構文的に閉じたオブジェクトのみを対象にし、
/// 単体でパースできなかったものは黙って捨てる。
fn partial_recover(text: &str) -> (Vec<RawDish>, Vec<RawWine>) {
    let dishes = DISH_OBJECT
        .find_iter(text)
        .filter_map(|m| serde_json::from_str::<RawDish>(m.as_str()).ok())
        .collect();
    let wines = WINE_OBJECT
        .find_iter(text)
        .filter_map(|m| serde_json::from_str::<RawWine>(m.as_str()).ok())
        .collect();
    (dishes, wines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "dishes": [
            {"dish_name": "Caesar Salad", "category": "salad", "key_ingredients": ["romaine", "parmesan"], "dominant_flavors": ["Fresh", "Salty"]}
        ],
        "wines": [
            {"wine_name": "Chablis", "type_name": "White", "region": "Burgundy", "winery": "", "country": "France", "grapes": ["Chardonnay"]}
        ]
    }"#;

    // =============================================
    // strip_code_fences テスト
    // =============================================

    #[test]
    fn test_strip_json_fence() {
        let text = "```json\n{\"dishes\": []}\n```";
        assert_eq!(strip_code_fences(text), "{\"dishes\": []}");
    }

    #[test]
    fn test_strip_plain_fence() {
        let text = "```\n{\"dishes\": []}\n```";
        assert_eq!(strip_code_fences(text), "{\"dishes\": []}");
    }

    #[test]
    fn test_strip_no_fence_unchanged() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    // =============================================
    // looks_truncated テスト
    // =============================================

    #[test]
    fn test_truncated_open_quote() {
        assert!(looks_truncated(r#"{"dishes": [{"dish_name": "Grilled"#));
    }

    #[test]
    fn test_truncated_mid_keyword() {
        assert!(looks_truncated(r#"{"dishes": [{"dish_"#));
    }

    #[test]
    fn test_truncated_unbalanced_braces() {
        assert!(looks_truncated(r#"{"dishes": [{"dish_name": "A"}"#));
    }

    #[test]
    fn test_not_truncated_when_balanced() {
        assert!(!looks_truncated(r#"{"dishes": [], "wines": []}"#));
    }

    // =============================================
    // remove_trailing_commas テスト
    // =============================================

    #[test]
    fn test_trailing_comma_in_array() {
        let fixed = remove_trailing_commas(r#"{"a": [1, 2, 3,]}"#);
        assert_eq!(fixed, r#"{"a": [1, 2, 3]}"#);
    }

    #[test]
    fn test_trailing_comma_in_object() {
        let fixed = remove_trailing_commas(r#"{"a": 1,}"#);
        assert_eq!(fixed, r#"{"a": 1}"#);
    }

    #[test]
    fn test_trailing_comma_with_whitespace() {
        let fixed = remove_trailing_commas("{\"a\": [1,\n  ]}");
        assert_eq!(fixed, "{\"a\": [1\n  ]}");
    }

    #[test]
    fn test_comma_inside_string_untouched() {
        let text = r#"{"a": "one, two,"}"#;
        assert_eq!(remove_trailing_commas(text), text);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"{"a": "say \"hi,\","}"#;
        assert_eq!(remove_trailing_commas(text), text);
    }

    // =============================================
    // 構造修正テスト
    // =============================================

    #[test]
    fn test_leaked_number_reinserted() {
        let broken = "{\"a\": [1, 2]\n3,\n\"b\": 4}";
        let fixed = fix_structural_patterns(broken);
        assert!(fixed.contains("[1, 2, 3],"));
    }

    #[test]
    fn test_duplicate_commas_collapsed() {
        let fixed = fix_structural_patterns(r#"{"a": [1,, 2, , 3]}"#);
        assert_eq!(fixed, r#"{"a": [1, 2, 3]}"#);
    }

    #[test]
    fn test_comma_before_closer_removed() {
        let fixed = fix_structural_patterns(r#"{"a": [1, 2,], "b": 3,}"#);
        assert_eq!(fixed, r#"{"a": [1, 2], "b": 3}"#);
    }

    #[test]
    fn test_unterminated_string_end_of_text() {
        let broken = "{\n\"dish_name\": \"Grilled Fi";
        let fixed = fix_unterminated_strings(broken);
        assert!(fixed.ends_with("\"Grilled Fi\""));
    }

    #[test]
    fn test_unterminated_string_mid_text_restores_comma() {
        let broken = "{\n\"category\": \"main\n\"dish_name\": \"Soup\"\n}";
        let fixed = fix_unterminated_strings(broken);
        assert!(fixed.contains("\"category\": \"main\",\n"));
    }

    // =============================================
    // recover テスト
    // =============================================

    #[test]
    fn test_recover_well_formed_is_full() {
        let result = ExtractionRecovery::new().recover(WELL_FORMED);

        assert_eq!(result.status, RecoveryStatus::Full);
        assert_eq!(result.dishes.len(), 1);
        assert_eq!(result.dishes[0].dish_name, "Caesar Salad");
        assert_eq!(result.wines.len(), 1);
        assert_eq!(result.wines[0].wine_name, "Chablis");
    }

    #[test]
    fn test_recover_fenced_well_formed_is_full() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        let result = ExtractionRecovery::new().recover(&fenced);

        assert_eq!(result.status, RecoveryStatus::Full);
        assert_eq!(result.dishes.len(), 1);
    }

    #[test]
    fn test_recover_trailing_comma_matches_hand_corrected() {
        let broken = r#"{"dishes": [{"dish_name": "Soup", "category": "appetizer", "key_ingredients": ["onion"], "dominant_flavors": ["Rich"]},], "wines": []}"#;
        let corrected = r#"{"dishes": [{"dish_name": "Soup", "category": "appetizer", "key_ingredients": ["onion"], "dominant_flavors": ["Rich"]}], "wines": []}"#;

        let recovery = ExtractionRecovery::new();
        let a = recovery.recover(broken);
        let b = recovery.recover(corrected);

        assert_eq!(a.status, RecoveryStatus::Full);
        assert_eq!(a.dishes.len(), b.dishes.len());
        assert_eq!(a.dishes[0].dish_name, b.dishes[0].dish_name);
    }

    #[test]
    fn test_recover_truncated_yields_partial() {
        // 1件目は完結、2件目は文字列の途中で切断
        let truncated = r#"{"dishes": [
            {"dish_name": "Caesar Salad", "category": "salad", "key_ingredients": ["romaine"], "dominant_flavors": ["Fresh"]},
            {"dish_name": "Grilled Sea Ba"#;

        let result = ExtractionRecovery::new().recover(truncated);

        assert_eq!(result.status, RecoveryStatus::Partial);
        assert_eq!(result.dishes.len(), 1);
        assert_eq!(result.dishes[0].dish_name, "Caesar Salad");
        assert!(result.wines.is_empty());
    }

    #[test]
    fn test_recover_partial_counts_expected() {
        let truncated = r#"{"dishes": [
            {"dish_name": "A", "category": "main", "key_ingredients": [], "dominant_flavors": []},
            {"dish_name": "B", "category": "de"#;

        let result = ExtractionRecovery::new().recover(truncated);

        assert_eq!(result.expected_dishes, 2);
        assert_eq!(result.recovered_dishes(), 1);
    }

    #[test]
    fn test_recover_garbage_is_empty() {
        let result = ExtractionRecovery::new().recover("これはJSONではありません");

        assert_eq!(result.status, RecoveryStatus::Empty);
        assert!(result.dishes.is_empty());
        assert!(result.wines.is_empty());
    }

    #[test]
    fn test_recover_empty_input_is_empty() {
        let result = ExtractionRecovery::new().recover("");
        assert_eq!(result.status, RecoveryStatus::Empty);
    }

    #[test]
    fn test_recover_missing_top_level_keys_normalized() {
        // dishesキーしかなくてもwinesは空として扱う
        let result = ExtractionRecovery::new().recover(r#"{"dishes": []}"#);

        assert_eq!(result.status, RecoveryStatus::Full);
        assert!(result.wines.is_empty());
    }

    #[test]
    fn test_partial_recover_wines_only() {
        let truncated = r#"{"wines": [
            {"wine_name": "Barolo", "type_name": "Red", "region": "Piedmont"},
            {"wine_name": "Chia"#;

        let result = ExtractionRecovery::new().recover(truncated);

        assert_eq!(result.status, RecoveryStatus::Partial);
        assert!(result.dishes.is_empty());
        assert_eq!(result.wines.len(), 1);
        assert_eq!(result.wines[0].wine_name, "Barolo");
    }
}
