use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translation: Translation,
    #[serde(default)]
    pub google: Google,
    #[serde(default)]
    pub openai: OpenAi,
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.translation;
        if t.batch_size == 0 {
            bail!("translation.batch_size must be >= 1");
        }
        if t.concurrency == 0 {
            bail!("translation.concurrency must be >= 1");
        }
        if t.max_attempts == 0 {
            bail!("translation.max_attempts must be >= 1");
        }
        if t.batch_parallelism == 0 {
            bail!("translation.batch_parallelism must be >= 1");
        }
        Ok(())
    }

    pub fn to_toml(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    /// Paragraphs per prompt sent to the batch backend.
    pub batch_size: usize,
    /// Worker count for per-paragraph translation.
    pub concurrency: usize,
    pub max_attempts: u32,
    /// Backoff base; attempt n waits `base_delay_ms * 2^n`.
    pub base_delay_ms: u64,
    /// Batches in flight at once. 1 keeps the backend under its rate limit.
    pub batch_parallelism: usize,
    pub source_lang: String,
    pub target_lang: String,
}
impl Default for Translation {
    fn default() -> Self {
        Self {
            batch_size: 5,
            concurrency: 5,
            max_attempts: 3,
            base_delay_ms: 1000,
            batch_parallelism: 1,
            source_lang: "en".into(),
            target_lang: "uk".into(),
        }
    }
}
impl Translation {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Google {
    pub endpoint: String,
    pub timeout_seconds: u64,
}
impl Default for Google {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".into(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAi {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}
impl Default for OpenAi {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-3.5-turbo".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.0,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Extract {
    pub normalize_unicode: bool,
    /// 0 means no limit.
    pub max_paragraphs: usize,
    pub user_agent: String,
    pub timeout_seconds: u64,
}
impl Default for Extract {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            max_paragraphs: 0,
            user_agent: concat!("dualtrans/", env!("CARGO_PKG_VERSION")).into(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub out_dir: String,
    pub write_docx: bool,
    pub write_report_json: bool,
    pub report_filename: String,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            out_dir: "output".into(),
            write_docx: true,
            write_report_json: true,
            report_filename: "report.json".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
