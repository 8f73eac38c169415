use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::Duration;
use clap::ValueEnum;
use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConfigError {
    #[error("Failed to load {0}. error: {1}")]
    LoadFileError(PathBuf, io::ErrorKind),
    #[error(transparent)]
    TomlParseError(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// 計測に使うバックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Backend {
    /// ICMPソケットを試し、権限がなければpingコマンドにフォールバックする
    #[default]
    Auto,

    /// ICMPソケットのみを使う
    Socket,

    /// OSのpingコマンドのみを使う
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Target {
    /// 対象の表示名
    pub(crate) name: String,

    /// 対象のホスト名またはIPアドレス
    pub(crate) host: String,
}

impl Target {
    /// ホストをそのまま表示名にしたターゲットを作成
    pub(crate) fn from_host(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            name: host.clone(),
            host,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Config {
    /// 監視対象のリスト
    #[serde(default)]
    pub(crate) targets: Vec<Target>,

    /// ICMP Echoの送信間隔(秒)
    /// デフォルトは1秒
    #[serde_as(as = "DurationSeconds<i64>")]
    #[serde(default = "Config::default_interval")]
    pub(crate) interval: Duration,

    /// ICMP Echoのタイムアウト(秒)
    /// デフォルトは1秒
    #[serde_as(as = "DurationSeconds<i64>")]
    #[serde(default = "Config::default_timeout")]
    pub(crate) timeout: Duration,

    /// ICMP Echoのペイロードサイズ(バイト)
    #[serde(default = "Config::default_packet_size")]
    pub(crate) packet_size: usize,

    /// ホストごとに保持するサンプル数
    /// デフォルトは1000サンプル
    #[serde(default = "Config::default_buffer_size")]
    pub(crate) buffer_size: usize,

    #[serde(default)]
    pub(crate) backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            interval: Self::default_interval(),
            timeout: Self::default_timeout(),
            packet_size: Self::default_packet_size(),
            buffer_size: Self::default_buffer_size(),
            backend: Backend::default(),
        }
    }
}

impl Config {
    /// ターゲットが1つも指定されていない場合の監視対象
    pub(crate) const DEFAULT_HOST: &'static str = "1.1.1.1";

    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFileError(path.to_path_buf(), e.kind()))?;
        toml::from_str(&content).map_err(ConfigError::TomlParseError)
    }

    /// 設定ファイルを読み込む
    ///
    /// `required`がfalseでファイルが存在しない場合はデフォルト値を返す
    pub(crate) fn load_or_default(
        path: impl AsRef<Path>,
        required: bool,
    ) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::LoadFileError(_, io::ErrorKind::NotFound)) if !required => {
                Ok(Self::default())
            }
            result => result,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.interval <= Duration::zero() {
            return Err(ConfigError::InvalidValue(format!(
                "interval must be positive, but got {}s",
                self.interval.num_seconds()
            )));
        }
        if self.timeout <= Duration::zero() {
            return Err(ConfigError::InvalidValue(format!(
                "timeout must be positive, but got {}s",
                self.timeout.num_seconds()
            )));
        }
        if self.packet_size == 0 {
            return Err(ConfigError::InvalidValue(
                "packet_size must be greater than 0".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::InvalidValue(
                "buffer_size must be greater than 0".to_string(),
            ));
        }
        if let Some(target) = self.targets.iter().find(|t| t.host.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "host of target {:?} is empty",
                target.name
            )));
        }

        Ok(())
    }

    /// 監視対象を取得
    ///
    /// 何も指定されていない場合は`DEFAULT_HOST`のみを返す
    pub(crate) fn effective_targets(&self) -> Vec<Target> {
        if self.targets.is_empty() {
            vec![Target::from_host(Self::DEFAULT_HOST)]
        } else {
            self.targets.clone()
        }
    }

    /// デフォルトのICMP Echo送信間隔
    const fn default_interval() -> Duration {
        Duration::seconds(1)
    }

    /// デフォルトのICMP Echoタイムアウト
    const fn default_timeout() -> Duration {
        Duration::seconds(1)
    }

    /// デフォルトのペイロードサイズ
    const fn default_packet_size() -> usize {
        56
    }

    /// デフォルトのバッファサイズ
    const fn default_buffer_size() -> usize {
        1000
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load() {
        // [正常系] 有効なTOMLファイルを読み込む
        let temp_file = write_config(
            r#"
interval = 5
timeout = 2
packet_size = 120
buffer_size = 300
backend = "command"

[[targets]]
name = "Router"
host = "192.168.1.1"

[[targets]]
name = "DNS"
host = "8.8.8.8"
"#,
        );

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].name, "Router");
        assert_eq!(config.targets[0].host, "192.168.1.1");
        assert_eq!(config.targets[1].name, "DNS");
        assert_eq!(config.targets[1].host, "8.8.8.8");
        assert_eq!(config.interval, Duration::seconds(5));
        assert_eq!(config.timeout, Duration::seconds(2));
        assert_eq!(config.packet_size, 120);
        assert_eq!(config.buffer_size, 300);
        assert_eq!(config.backend, Backend::Command);

        // [正常系] 省略したフィールドはデフォルト値が使用される
        let temp_file = write_config(
            r#"
[[targets]]
name = "Router"
host = "192.168.1.1"
"#,
        );
        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.interval, Duration::seconds(1));
        assert_eq!(config.timeout, Duration::seconds(1));
        assert_eq!(config.packet_size, 56);
        assert_eq!(config.buffer_size, 1000);
        assert_eq!(config.backend, Backend::Auto);

        // [異常系] 存在しないファイルを読み込む
        let result = Config::load("/path/to/non/existent/file.toml");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::LoadFileError(_, io::ErrorKind::NotFound)
        ));

        // [異常系] 無効なTOMLファイルを読み込む
        let temp_file = write_config(
            r#"
invalid toml content
[unclosed section
"#,
        );
        assert!(matches!(
            Config::load(temp_file.path()).unwrap_err(),
            ConfigError::TomlParseError(_)
        ));

        // [異常系] 未知のバックエンド
        let temp_file = write_config(r#"backend = "icmp""#);
        assert!(matches!(
            Config::load(temp_file.path()).unwrap_err(),
            ConfigError::TomlParseError(_)
        ));
    }

    #[test]
    fn test_load_or_default() {
        // [正常系] 任意のファイルが存在しない場合はデフォルト値
        let config = Config::load_or_default("/path/to/non/existent/file.toml", false).unwrap();
        assert_eq!(config, Config::default());

        // [異常系] 明示的に指定されたファイルが存在しない
        assert!(matches!(
            Config::load_or_default("/path/to/non/existent/file.toml", true).unwrap_err(),
            ConfigError::LoadFileError(_, io::ErrorKind::NotFound)
        ));

        // [異常系] 任意のファイルでも壊れていればエラー
        let temp_file = write_config("interval = ");
        assert!(matches!(
            Config::load_or_default(temp_file.path(), false).unwrap_err(),
            ConfigError::TomlParseError(_)
        ));
    }

    #[test]
    fn test_validate() {
        // [正常系] デフォルト値は有効
        assert!(Config::default().validate().is_ok());

        // [異常系] packet_sizeが0
        let config = Config {
            packet_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidValue(_)
        ));

        // [異常系] intervalが0以下
        let config = Config {
            interval: Duration::seconds(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        // [異常系] timeoutが負
        let config = Config {
            timeout: Duration::seconds(-1),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        // [異常系] buffer_sizeが0
        let config = Config {
            buffer_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        // [異常系] 空白のみのホスト
        let config = Config {
            targets: vec![Target {
                name: "Blank".to_string(),
                host: "  ".to_string(),
            }],
            ..Config::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::InvalidValue("host of target \"Blank\" is empty".to_string())
        );
    }

    #[test]
    fn test_effective_targets() {
        // [正常系] ターゲット未指定ならデフォルトホスト
        let targets = Config::default().effective_targets();
        assert_eq!(targets, vec![Target::from_host("1.1.1.1")]);

        // [正常系] 指定済みならそのまま
        let config = Config {
            targets: vec![Target::from_host("example.com")],
            ..Config::default()
        };
        assert_eq!(config.effective_targets()[0].name, "example.com");
    }
}
