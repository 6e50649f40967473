use crate::ai_provider::AiProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sommelier-ai")]
#[command(about = "分子フレーバー解析によるワインペアリング推薦ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (gemini/claude/codex)
    #[arg(long, default_value = "gemini", global = true)]
    pub ai_provider: AiProvider,
}

#[derive(Subcommand)]
pub enum Commands {
    /// メニュー/レシピフォルダから料理とワインを抽出
    Extract {
        /// メニューファイル(.txt/.jpg/.png)のフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// メニュープロファイルの出力先
        #[arg(short, long, default_value = "processed_data/menu_flavor_profile.json")]
        output: PathBuf,

        /// 抽出したワインの出力先
        #[arg(long, default_value = "processed_data/extracted_wines.json")]
        wines_output: PathBuf,

        /// 食材→化合物マップのパス
        #[arg(long, default_value = "processed_data/ingredient_flavor_map.json")]
        flavor_map: PathBuf,
    },

    /// ワインの品種とフレーバー化合物を補完
    Enrich {
        /// ワインデータベースJSON
        #[arg(required = true)]
        wines: PathBuf,

        /// 出力先（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 食材→化合物マップのパス
        #[arg(long, default_value = "processed_data/ingredient_flavor_map.json")]
        flavor_map: PathBuf,
    },

    /// 料理ごとにワイン候補を選定
    Pair {
        /// メニュープロファイルJSON
        #[arg(required = true)]
        profile: PathBuf,

        /// ワインデータベースJSON
        #[arg(required = true)]
        wines: PathBuf,

        /// ペアリング結果の出力先
        #[arg(short, long, default_value = "processed_data/pairings.json")]
        output: PathBuf,

        /// 1皿あたりの候補数
        #[arg(long)]
        max_wines: Option<usize>,
    },

    /// ペアリング結果からワインの総合ランキングを作成
    Rank {
        /// ペアリング結果JSON
        #[arg(required = true)]
        pairings: PathBuf,

        /// ワインデータベースJSON
        #[arg(required = true)]
        wines: PathBuf,

        /// メニュープロファイルJSON
        #[arg(required = true)]
        profile: PathBuf,

        /// 表示する上位件数
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// 化合物名でワインを検索
    Search {
        /// 検索する化合物名（複数指定可）
        #[arg(required = true)]
        compounds: Vec<String>,

        /// ワインデータベースJSON
        #[arg(long, default_value = "processed_data/extracted_wines.json")]
        wines: PathBuf,
    },

    /// 類似ワインの検出（重複候補の提示）
    Dedup {
        /// ワインデータベースJSON
        #[arg(required = true)]
        wines: PathBuf,

        /// 類似判定の閾値 (0.0-1.0)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
