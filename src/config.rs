//! 起動時の設定: コマンドライン引数（`argh`）と環境変数。
//!
//! | 入力 | 意味 |
//! |------|------|
//! | 位置引数 `script` | 指定があれば非対話モードでそのファイルを読む |
//! | `PS1` | 対話モードのプロンプト（未設定なら空） |
//! | `MINSH_LOG` | ログフィルタ（`tracing_subscriber::EnvFilter` 形式、既定 `warn`） |

use std::env;
use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use argh::FromArgs;

use crate::input::LineReader;

/// ログフィルタを読む環境変数名。
pub const LOG_ENV: &str = "MINSH_LOG";
/// `MINSH_LOG` 未設定時のフィルタ。
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(FromArgs, Debug, PartialEq)]
/// A small line-oriented command interpreter.
pub struct Args {
    /// script file to run instead of reading standard input
    #[argh(positional)]
    pub script: Option<PathBuf>,
}

/// 実行時設定。
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub script: Option<PathBuf>,
    pub prompt: String,
}

impl Config {
    /// 引数と環境変数から設定を作る。
    pub fn new(args: Args) -> Self {
        Self {
            script: args.script,
            prompt: env::var("PS1").unwrap_or_default(),
        }
    }

    /// 標準入力から読む場合に `true`。
    pub fn interactive(&self) -> bool {
        self.script.is_none()
    }

    /// 入力元を開く。スクリプトが開けなければ致命的エラー。
    pub fn open_input(&self) -> anyhow::Result<LineReader> {
        match &self.script {
            None => Ok(LineReader::stdin()),
            Some(path) => {
                let file = File::open(path).with_context(|| path.display().to_string())?;
                Ok(LineReader::from_file(file))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        Args::from_args(&["minsh"], args)
    }

    #[test]
    fn no_arguments_is_interactive() {
        let cfg = Config::new(parse(&[]).unwrap());
        assert!(cfg.interactive());
    }

    #[test]
    fn one_argument_is_script() {
        let cfg = Config::new(parse(&["run.sh"]).unwrap());
        assert!(!cfg.interactive());
        assert_eq!(cfg.script, Some(PathBuf::from("run.sh")));
    }

    #[test]
    fn too_many_arguments() {
        assert!(parse(&["a.sh", "b.sh"]).is_err());
    }

    #[test]
    fn missing_script_fails_to_open() {
        let cfg = Config::new(parse(&["/nonexistent/minsh/script"]).unwrap());
        let err = cfg.open_input().err().unwrap();
        assert!(format!("{:#}", err).starts_with("/nonexistent/minsh/script: "));
    }
}
