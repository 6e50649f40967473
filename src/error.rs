use thiserror::Error;

#[derive(Error, Debug)]
pub enum SommelierError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`sommelier-ai config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("メニューファイルが見つかりません: {0}")]
    NoMenuFiles(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("レート制限によりリトライ上限に達しました: {0}")]
    RateLimit(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("検証エラー: {0}")]
    Validation(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] sommelier_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, SommelierError>;
