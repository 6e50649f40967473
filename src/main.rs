use clap::Parser;
use sommelier_ai_rust::{cli, config, enricher, error, extractor, knowledge, scanner};

use cli::{Cli, Commands};
use config::Config;
use error::Result;
use extractor::retry::RetryPolicy;
use extractor::service::CliService;
use sommelier_ai_common::{MenuProfile, PairingEngine, SimilarityAnalyzer, WineRanker};
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let policy = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        default_wait: Duration::from_secs(config.retry_default_wait_secs),
        min_wait: Duration::from_secs(config.retry_min_wait_secs),
    };

    match cli.command {
        Commands::Extract { folder, output, wines_output, flavor_map } => {
            println!("🍷 sommelier-ai-rust - メニュー抽出\n");

            // 1. ファイルスキャン
            println!("[1/3] メニューファイルをスキャン中...");
            let files = scanner::scan_folder(&folder)?;
            println!("✔ {}件のファイルを検出\n", files.len());

            if files.is_empty() {
                return Err(error::SommelierError::NoMenuFiles(
                    folder.display().to_string(),
                ));
            }

            // 2. AI抽出
            println!("[2/3] AI抽出中...");
            let map = knowledge::load_flavor_map(&flavor_map).unwrap_or_else(|_| {
                println!("  ⚠ 食材マップが見つからないため化合物解決をスキップします");
                sommelier_ai_common::IngredientFlavorMap::new()
            });
            let service = CliService::new(cli.ai_provider, cli.verbose);
            let outcome = extractor::extract_from_files(&service, &files, &map, &policy, &config)?;
            println!(
                "✔ 抽出完了: 成功 {} / 失敗 {} (料理 {}件, ワイン {}件)\n",
                outcome.files_processed,
                outcome.files_failed,
                outcome.dishes.len(),
                outcome.wines.len()
            );

            // 3. 保存
            println!("[3/3] 結果を保存中...");
            let mut profile = MenuProfile::new();
            for dish in outcome.dishes {
                profile.insert(dish.dish_id.clone(), dish);
            }
            knowledge::save_json(&output, &profile)?;
            println!("✔ メニュープロファイル: {}", output.display());
            knowledge::save_json(&wines_output, &outcome.wines)?;
            println!("✔ 抽出ワイン: {}", wines_output.display());

            println!("\n✅ 抽出完了");
        }

        Commands::Enrich { wines, output, flavor_map } => {
            println!("🍇 sommelier-ai-rust - フレーバー補完\n");

            let wine_list = knowledge::load_wines(&wines)?;
            println!("[1/2] {}本のワインを補完中...", wine_list.len());

            let map = knowledge::load_flavor_map(&flavor_map)
                .unwrap_or_else(|_| sommelier_ai_common::IngredientFlavorMap::new());
            let service = CliService::new(cli.ai_provider, cli.verbose);
            let outcome =
                enricher::enrich_wines(&service, &wine_list, &map, &policy, &config)?;
            println!("✔ 補完完了: 成功 {} / 失敗 {}\n", outcome.enriched, outcome.failed);

            println!("[2/2] 結果を保存中...");
            let target = output.unwrap_or(wines);
            knowledge::save_json(&target, &outcome.wines)?;
            println!("✔ 保存: {}", target.display());

            println!("\n✅ 補完完了");
        }

        Commands::Pair { profile, wines, output, max_wines } => {
            println!("🍽 sommelier-ai-rust - ペアリング\n");

            let menu = knowledge::load_menu_profile(&profile)?;
            let wine_list = knowledge::load_wines(&wines)?;
            println!("料理 {}皿 × ワイン {}本", menu.len(), wine_list.len());

            let dishes: Vec<_> = menu.values().cloned().collect();
            let engine = PairingEngine::new(max_wines.unwrap_or(config.max_wines_per_dish));
            let pairings = engine.pair_wines_to_dishes(&dishes, &wine_list, None);

            let paired = pairings.values().filter(|ids| !ids.is_empty()).count();
            let unpaired = pairings.len() - paired;
            println!("✔ ペアリング完了: 候補あり {} / 候補なし {}", paired, unpaired);
            if unpaired > 0 && cli.verbose {
                for (dish_id, ids) in &pairings {
                    if ids.is_empty() {
                        let name = menu.get(dish_id).map(|d| d.name.as_str()).unwrap_or(dish_id);
                        println!("  - 候補なし: {}", name);
                    }
                }
            }

            knowledge::save_json(&output, &pairings)?;
            println!("✔ 保存: {}", output.display());

            println!("\n✅ ペアリング完了");
        }

        Commands::Rank { pairings, wines, profile, top } => {
            println!("🏆 sommelier-ai-rust - ランキング\n");

            let pairing_map = knowledge::load_pairings(&pairings)?;
            let wine_list = knowledge::load_wines(&wines)?;
            let menu = knowledge::load_menu_profile(&profile)?;
            let dishes: Vec<_> = menu.values().cloned().collect();

            let ranker = WineRanker::new();
            let ranked = ranker.rank_wines(
                &wine_list,
                &pairing_map,
                &dishes,
                config.weight_frequency,
                config.weight_quality,
            );

            if ranked.is_empty() {
                println!("ランキング対象のワインがありません");
            } else {
                println!("上位{}本:", top.min(ranked.len()));
                for (i, entry) in ranked.iter().take(top).enumerate() {
                    println!(
                        "  {:>2}. {:.3}  {} ({})",
                        i + 1,
                        entry.score,
                        entry.wine.wine_name,
                        entry.wine.type_name
                    );
                }
            }

            println!("\n✅ ランキング完了");
        }

        Commands::Search { compounds, wines } => {
            println!("🔎 sommelier-ai-rust - 化合物検索\n");

            let wine_list = knowledge::load_wines(&wines)?;
            let engine = PairingEngine::default();
            let results = engine.search_wines_by_compounds(&compounds, &wine_list);

            if results.is_empty() {
                println!("指定の化合物を共有するワインはありません");
            } else {
                println!("該当 {}本:", results.len());
                let name_of = |id: i64| {
                    wine_list
                        .iter()
                        .find(|w| w.wine_id == id)
                        .map(|w| w.wine_name.clone())
                        .unwrap_or_else(|| id.to_string())
                };
                for (id, shared) in &results {
                    println!("  {} (共有: {})", name_of(*id), shared.join(", "));
                }
            }

            println!("\n✅ 検索完了");
        }

        Commands::Dedup { wines, threshold } => {
            println!("🔍 sommelier-ai-rust - 類似ワイン検出\n");

            let wine_list = knowledge::load_wines(&wines)?;
            let analyzer =
                SimilarityAnalyzer::new(threshold.unwrap_or(config.similarity_threshold));
            println!("閾値: {:.2}", analyzer.threshold());

            let pairs = analyzer.find_similar_pairs(&wine_list, None);
            if pairs.is_empty() {
                println!("類似ペアは見つかりませんでした");
            } else {
                println!("類似ペア {}組:", pairs.len());
                let name_of = |id: i64| {
                    wine_list
                        .iter()
                        .find(|w| w.wine_id == id)
                        .map(|w| w.wine_name.clone())
                        .unwrap_or_else(|| id.to_string())
                };
                for pair in &pairs {
                    println!(
                        "  {:.3}  {} ↔ {}",
                        pair.score,
                        name_of(pair.id_a),
                        name_of(pair.id_b)
                    );
                }

                let clusters = analyzer.group_similar_wines(&wine_list, None);
                println!("\nクラスタ {}件:", clusters.len());
                for (i, cluster) in clusters.iter().enumerate() {
                    let names: Vec<String> = cluster.iter().map(|id| name_of(*id)).collect();
                    println!("  [{}] {}", i + 1, names.join(", "));
                }
            }

            println!("\n✅ 検出完了");
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  類似度閾値: {}", config.similarity_threshold);
                println!("  1皿あたりの候補数: {}", config.max_wines_per_dish);
                println!(
                    "  ランキング重み: 頻度 {} / 品質 {}",
                    config.weight_frequency, config.weight_quality
                );
                println!(
                    "  リトライ: 最大{}回 (既定待機 {}秒, 下限 {}秒)",
                    config.retry_max_attempts,
                    config.retry_default_wait_secs,
                    config.retry_min_wait_secs
                );
                println!(
                    "  APIキー: {}",
                    if config.api_key.is_some() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}
