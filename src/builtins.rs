//! ビルトインコマンドの実装。
//!
//! ビルトインは fork/exec を経由せずシェルのプロセス内で直接実行される。
//! リダイレクトと `&` は無視され、`$?` も更新しない。
//! `try_exec()` が `Some(..)` を返せばビルトインとして処理済み、
//! `None` なら外部コマンドとして executor に委ねる。

use std::env;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::executor::Flow;

/// ビルトインの使い方の誤り・実行失敗。報告されるだけでシェルは続行する。
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),
    #[error("exit: {0}: numeric argument required")]
    NotNumeric(String),
    #[error("cd: HOME not set")]
    HomeNotSet,
    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// ビルトインコマンドの実行を試みる。
///
/// 戻り値:
/// - `Some(Ok(flow))` — ビルトインとして実行済み
/// - `Some(Err(e))` — ビルトインだが失敗（呼び出し側が報告する）
/// - `None` — 該当するビルトインなし（外部コマンドとして実行すべき）
pub fn try_exec(args: &[String]) -> Option<Result<Flow, BuiltinError>> {
    match args.first()?.as_str() {
        "exit" => Some(builtin_exit(args)),
        "cd" => Some(builtin_cd(args).map(|()| Flow::Continue)),
        _ => None,
    }
}

/// `exit [N]` — シェルを終了する。N 省略時は 0。
fn builtin_exit(args: &[String]) -> Result<Flow, BuiltinError> {
    match args {
        [_] => Ok(Flow::Exit(0)),
        [_, status] => status
            .parse::<i32>()
            .map(Flow::Exit)
            .map_err(|_| BuiltinError::NotNumeric(status.clone())),
        _ => Err(BuiltinError::TooManyArguments("exit")),
    }
}

/// `cd [dir]` — カレントディレクトリを変更する。引数省略時は `$HOME` に移動。
fn builtin_cd(args: &[String]) -> Result<(), BuiltinError> {
    let target = match args {
        [_] => env::var_os("HOME")
            .ok_or(BuiltinError::HomeNotSet)?
            .to_string_lossy()
            .into_owned(),
        [_, dir] => dir.clone(),
        _ => return Err(BuiltinError::TooManyArguments("cd")),
    };

    env::set_current_dir(Path::new(&target))
        .map_err(|source| BuiltinError::ChangeDir { path: target, source })
}
