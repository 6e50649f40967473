//! 生成サービス呼び出し
//!
//! 外部のAI CLIをサブプロセスとして同期実行する。応答は名目上JSONだが、
//! 切断や崩れを含みうるため、解釈は呼び出し側の復旧パイプラインに任せる。

use crate::ai_provider::AiProvider;
use crate::error::{Result, SommelierError};
use std::path::PathBuf;
use std::process::Command;

/// 添付画像（一時ファイル経由でCLIに渡す）
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    /// "jpg" / "jpeg" / "png"
    pub extension: String,
}

/// 1回の生成リクエスト
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub expect_json: bool,
}

impl GenerationRequest {
    pub fn text(prompt: String) -> Self {
        Self {
            prompt,
            image: None,
            temperature: 0.3,
            max_output_tokens: 8192,
            expect_json: true,
        }
    }

    pub fn with_image(prompt: String, image: ImageAttachment) -> Self {
        Self {
            image: Some(image),
            ..Self::text(prompt)
        }
    }
}

/// 生成サービスの抽象。テストではスタブ実装に差し替える
pub trait GenerativeService {
    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// AI CLIをサブプロセス実行するサービス
pub struct CliService {
    provider: AiProvider,
    verbose: bool,
}

impl CliService {
    pub fn new(provider: AiProvider, verbose: bool) -> Self {
        Self { provider, verbose }
    }
}

impl GenerativeService for CliService {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        // 画像は一時ファイルに書き出してパスで渡す。
        // ガードのDropで全ての経路（エラー時含む）で削除される。
        let temp_image = match &request.image {
            Some(image) => Some(TempImage::write(image)?),
            None => None,
        };

        let raw_prompt = match &temp_image {
            Some(temp) => format!(
                "Read the following image file and analyze it: {}\n\n{}",
                temp.path.display().to_string().replace('\\', "/"),
                request.prompt
            ),
            None => request.prompt.clone(),
        };

        // 改行をスペースに置換してcmd経由で渡す
        let full_prompt = raw_prompt.replace('\n', " ").replace('"', "\\\"");

        if self.verbose {
            println!("  プロンプト長: {} chars", full_prompt.len());
        }

        let response = run_provider_cli(self.provider, &full_prompt)?;

        if self.verbose {
            let preview: String = response.chars().take(500).collect();
            println!("  レスポンス: {}", preview);
        }

        Ok(response)
    }
}

fn run_provider_cli(provider: AiProvider, prompt: &str) -> Result<String> {
    let command = provider.command_name();

    #[cfg(windows)]
    let output = Command::new("cmd")
        .args(["/c", command, "-p", prompt, "--output-format", "text"])
        .output()
        .map_err(|e| SommelierError::ApiCall(format!("{} CLI実行エラー: {}", command, e)))?;

    #[cfg(not(windows))]
    let output = Command::new(command)
        .args(["-p", prompt, "--output-format", "text"])
        .output()
        .map_err(|e| SommelierError::ApiCall(format!("{} CLI実行エラー: {}", command, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SommelierError::ApiCall(format!(
            "{} CLI failed (code {:?}): {}",
            command,
            output.status.code(),
            stderr
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// スコープを抜けたら必ず消える一時画像ファイル
struct TempImage {
    path: PathBuf,
}

impl TempImage {
    fn write(image: &ImageAttachment) -> Result<Self> {
        let file_name = format!(
            "sommelier-ai-{}-{}.{}",
            std::process::id(),
            chrono::Utc::now().timestamp_millis(),
            image.extension
        );
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, &image.bytes)?;
        Ok(Self { path })
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
