use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{Backend, Config, Target};

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    #[clap(long, short, help = "Path to the config file [default: ./config.toml]")]
    pub(crate) config: Option<PathBuf>,

    #[clap(long, help = "Sample every target once, print `<host> <ms>` and exit")]
    pub(crate) once: bool,

    #[clap(long, short, help = "ICMP payload size in bytes")]
    pub(crate) size: Option<usize>,

    #[clap(long, value_enum, help = "Backend used to send ICMP Echo Requests")]
    pub(crate) backend: Option<Backend>,

    #[clap(help = "Hosts to monitor in addition to the config targets")]
    pub(crate) hosts: Vec<String>,
}

impl Cli {
    const DEFAULT_CONFIG_PATH: &'static str = "./config.toml";

    pub(crate) fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// 読み込む設定ファイルのパス
    pub(crate) fn config_path(&self) -> &Path {
        self.config
            .as_deref()
            .unwrap_or(Path::new(Self::DEFAULT_CONFIG_PATH))
    }

    /// 設定ファイルが必須かどうか
    ///
    /// 明示的に指定された場合のみ必須
    pub(crate) fn config_required(&self) -> bool {
        self.config.is_some()
    }

    /// コマンドライン引数で設定を上書きする
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(size) = self.size {
            config.packet_size = size;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        config
            .targets
            .extend(self.hosts.iter().map(Target::from_host));
    }
}
