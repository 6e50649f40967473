//! メニュー抽出
//!
//! メニュー/レシピファイルを1件ずつ生成サービスに送り、応答を復旧して
//! 標準形の料理/ワインレコードに正規化する。1ファイルの失敗で
//! バッチ全体は止めない（レート制限の上限到達だけは即座に伝播する）。

pub mod retry;
pub mod service;

use crate::config::Config;
use crate::error::{Result, SommelierError};
use crate::scanner::MenuFile;
use retry::{call_with_retry, RetryPolicy};
use service::{GenerationRequest, GenerativeService, ImageAttachment};
use sommelier_ai_common::recovery::{looks_truncated, ExtractionRecovery, RecoveryStatus};
use sommelier_ai_common::{
    menu_extraction_prompt, normalize_dish, normalize_raw_wine, strip_code_fences,
    suggest_wine_type, Dish, IngredientFlavorMap, Wine,
};

/// ワインリストとして大きいとみなす推定件数。
/// これ以上を期待して3本未満しか復旧できなければ警告する。
const LOW_YIELD_EXPECTED_WINES: usize = 10;
const LOW_YIELD_RECOVERED_WINES: usize = 3;

/// バッチ抽出の結果
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub dishes: Vec<Dish>,
    pub wines: Vec<Wine>,
    pub files_processed: usize,
    pub files_failed: usize,
}

/// フォルダ内のメニューファイルを順に抽出する
pub fn extract_from_files(
    service: &dyn GenerativeService,
    files: &[MenuFile],
    flavor_map: &IngredientFlavorMap,
    policy: &RetryPolicy,
    config: &Config,
) -> Result<ExtractionOutcome> {
    let mut outcome = ExtractionOutcome::default();

    for file in files {
        match extract_single(service, file, flavor_map, policy, config) {
            Ok((dishes, wines, status)) => {
                if status == RecoveryStatus::Empty {
                    println!("  ⚠ {}: 応答から何も復旧できませんでした", file.file_name);
                    outcome.files_failed += 1;
                } else {
                    outcome.files_processed += 1;
                }
                outcome.dishes.extend(dishes);
                outcome.wines.extend(wines);
            }
            // リトライ上限到達は以降のファイルでも失敗するので打ち切る
            Err(e @ SommelierError::RateLimit(_)) => return Err(e),
            Err(e) => {
                println!("  ⚠ {}: {}", file.file_name, e);
                outcome.files_failed += 1;
            }
        }
    }

    Ok(outcome)
}

fn extract_single(
    service: &dyn GenerativeService,
    file: &MenuFile,
    flavor_map: &IngredientFlavorMap,
    policy: &RetryPolicy,
    config: &Config,
) -> Result<(Vec<Dish>, Vec<Wine>, RecoveryStatus)> {
    let request = build_request(file, config)?;
    let response = call_with_retry(policy, || service.generate(&request))?;

    let result = ExtractionRecovery::new().recover(&response);

    if result.status == RecoveryStatus::Partial {
        // 切断と構文崩れは警告文で区別する
        let cause = if looks_truncated(&strip_code_fences(&response)) {
            "応答が途中で切れていたため"
        } else {
            "応答が崩れていたため"
        };
        println!(
            "  ⚠ {}: {}部分復旧 (料理 {}/{}, ワイン {}/{})",
            file.file_name,
            cause,
            result.recovered_dishes(),
            result.expected_dishes,
            result.recovered_wines(),
            result.expected_wines
        );
    }
    if result.expected_wines >= LOW_YIELD_EXPECTED_WINES
        && result.recovered_wines() < LOW_YIELD_RECOVERED_WINES
    {
        println!(
            "  ⚠ {}: ワインの復旧件数が異常に少ない ({} / 推定{})",
            file.file_name,
            result.recovered_wines(),
            result.expected_wines
        );
    }

    let mut dishes = Vec::new();
    for raw in &result.dishes {
        match normalize_dish(raw, &file.file_name) {
            Ok(mut dish) => {
                let compounds = flavor_map.compounds_for_ingredients(&dish.ingredients);
                dish.no_profile = compounds.is_empty();
                dish.suggested_wine_type = suggest_wine_type(&dish.tags, &compounds);
                dish.compounds = compounds;
                dishes.push(dish);
            }
            Err(e) => println!("  ⚠ 料理レコードをスキップ: {}", e),
        }
    }

    let mut wines = Vec::new();
    for raw in &result.wines {
        match normalize_raw_wine(raw) {
            Ok(wine) => wines.push(wine),
            Err(e) => println!("  ⚠ ワインレコードをスキップ: {}", e),
        }
    }

    Ok((dishes, wines, result.status))
}

fn build_request(file: &MenuFile, config: &Config) -> Result<GenerationRequest> {
    let mut request = if file.is_image {
        let bytes = std::fs::read(&file.path)?;
        let extension = file
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        GenerationRequest::with_image(
            menu_extraction_prompt().to_string(),
            ImageAttachment { bytes, extension },
        )
    } else {
        let content = std::fs::read_to_string(&file.path)?;
        GenerationRequest::text(format!("{}{}", menu_extraction_prompt(), content))
    };

    request.temperature = config.temperature;
    request.max_output_tokens = config.max_output_tokens;
    Ok(request)
}
