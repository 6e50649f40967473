//! Sommelier AI Common Library
//!
//! ペアリング推薦の中核ロジック（類似度・ペアリング・ランキング・復旧）

pub mod compound;
pub mod error;
pub mod flavor_map;
pub mod normalize;
pub mod pairing;
pub mod prompts;
pub mod ranker;
pub mod recovery;
pub mod similarity;
pub mod types;

pub use compound::CompoundSet;
pub use error::{Error, Result};
pub use flavor_map::{suggest_wine_type, FlavorEntry, IngredientFlavorMap};
pub use normalize::{
    clean_ingredient_name, dish_id_for_name, normalize_dish, normalize_raw_wine, normalize_wine,
    wine_id_for_name,
};
pub use pairing::{PairingEngine, DEFAULT_MAX_WINES_PER_DISH};
pub use prompts::{menu_extraction_prompt, wine_enrichment_prompt};
pub use ranker::{RankedWine, WineRanker, DEFAULT_WEIGHT_FREQUENCY, DEFAULT_WEIGHT_QUALITY};
pub use recovery::{
    looks_truncated, strip_code_fences, ExtractionRecovery, ExtractionResult, RecoveryStatus,
};
pub use similarity::{SimilarityAnalyzer, SimilarityPair, DEFAULT_SIMILARITY_THRESHOLD};
pub use types::{Dish, MenuProfile, Pairings, RawDish, RawWine, Wine};
