//! Sommelier AI Rust
//!
//! メニュー抽出からペアリング・ランキングまでのCLIツール本体。
//! 中核アルゴリズムは sommelier_ai_common にある。

pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod enricher;
pub mod error;
pub mod extractor;
pub mod knowledge;
pub mod scanner;
