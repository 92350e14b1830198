//! `fork()` + `execvp()` による外部コマンド起動。
//!
//! 子プロセス側の手順:
//!
//! 1. SIGINT / SIGTSTP を継承元の処分に戻す（[`SignalDispositions::restore_inherited`]）
//! 2. リダイレクトを出現順に適用する（対象 fd を close → open → 必要なら dup2 + close）
//! 3. `execvp` で PATH 検索付き実行。失敗したら報告して終了ステータス 2 で終了
//!
//! argv とリダイレクト先パスの `CString` は fork 前に親側で用意する。
//!
//! ## 構成
//!
//! | 型 | 役割 |
//! |-----|------|
//! | [`SpawnError`] | fork 失敗（致命的）と引数変換失敗（コマンド単位） |
//! | [`CStringVec`] | argv 用の NULL 終端ポインタ配列 |
//! | [`PreparedRedirect`] | `CString` 化済みのリダイレクト指定 |
//! | [`spawn`] | 上記を組み合わせて fork/exec する公開関数 |

use std::ffi::CString;
use std::io;

use libc::pid_t;
use thiserror::Error;

use crate::parser::{Command, Redirect, RedirectKind};
use crate::signals::SignalDispositions;

/// exec できなかった子プロセスの終了ステータス。
pub const EXEC_FAILURE_STATUS: i32 = 2;
/// 子プロセス内のセットアップ（シグナル復元・リダイレクト）失敗時の終了ステータス。
pub const SETUP_FAILURE_STATUS: i32 = 1;

// ── エラー型 ──────────────────────────────────────────────────────

/// 起動の失敗。
#[derive(Debug, Error)]
pub enum SpawnError {
    /// `fork` 自体の失敗。シェルを終了させる。
    #[error("fork: {0}")]
    Fork(#[source] io::Error),
    /// 引数やパスに NUL バイトが含まれ、C 文字列にできない。
    #[error("{0}: argument contains a NUL byte")]
    NulByte(String),
}

impl SpawnError {
    /// シェル全体を終了させるべきエラーか。
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fork(_))
    }
}

fn to_cstring(s: &str) -> Result<CString, SpawnError> {
    CString::new(s).map_err(|_| SpawnError::NulByte(s.to_string()))
}

// ── CStringVec ────────────────────────────────────────────────────

/// argv 用の CString ベクタ。NULL 終端のポインタ配列を構築する。
pub struct CStringVec {
    strings: Vec<CString>,
    ptrs: Vec<*const libc::c_char>,
}

impl CStringVec {
    /// 引数リストから構築する。各要素を `CString` に変換し、NULL 終端ポインタ配列を作る。
    pub fn from_args(args: &[String]) -> Result<Self, SpawnError> {
        let strings = args
            .iter()
            .map(|s| to_cstring(s))
            .collect::<Result<Vec<_>, _>>()?;
        let mut ptrs: Vec<*const libc::c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(std::ptr::null()); // NULL 終端
        Ok(Self { strings, ptrs })
    }

    /// プログラム名（argv[0]）。
    fn program(&self) -> Option<&CString> {
        self.strings.first()
    }

    /// NULL 終端ポインタ配列を返す。
    fn as_ptr(&self) -> *const *const libc::c_char {
        self.ptrs.as_ptr()
    }
}

// ── PreparedRedirect ──────────────────────────────────────────────

/// fork 前に C 文字列化したリダイレクト指定。
pub struct PreparedRedirect {
    kind: RedirectKind,
    target: String,
    path: CString,
}

impl PreparedRedirect {
    pub fn new(redirect: &Redirect) -> Result<Self, SpawnError> {
        Ok(Self {
            kind: redirect.kind,
            target: redirect.target.clone(),
            path: to_cstring(&redirect.target)?,
        })
    }

    fn open_flags(&self) -> libc::c_int {
        match self.kind {
            RedirectKind::Input => libc::O_RDONLY,
            RedirectKind::Output => libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            RedirectKind::Append => libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND,
        }
    }

    /// 子プロセス内で標準 fd を差し替える。
    ///
    /// 対象 fd を先に close するため、open は通常その番号を再利用する。
    /// 番号が一致しなかった場合のみ dup2 + close を行う。
    pub fn apply(&self) -> io::Result<()> {
        let target_fd = self.kind.target_fd();
        unsafe {
            libc::close(target_fd);
        }
        let fd = unsafe { libc::open(self.path.as_ptr(), self.open_flags(), 0o777 as libc::c_uint) };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }
        if fd != target_fd {
            if unsafe { libc::dup2(fd, target_fd) } == -1 {
                let err = io::Error::last_os_error();
                unsafe {
                    libc::close(fd);
                }
                return Err(err);
            }
            unsafe {
                libc::close(fd);
            }
        }
        Ok(())
    }
}

// ── spawn 関数 ────────────────────────────────────────────────────

/// 子プロセスを終了させる。親から複製された atexit ハンドラや stdio バッファは実行しない。
fn child_exit(status: i32) -> ! {
    unsafe { libc::_exit(status) }
}

/// 子プロセス側: シグナル復元 → リダイレクト → exec。戻らない。
fn exec_child(argv: &CStringVec, redirects: &[PreparedRedirect], signals: &SignalDispositions) -> ! {
    if let Err(e) = signals.restore_inherited() {
        eprintln!("minsh: {}", e);
        child_exit(SETUP_FAILURE_STATUS);
    }

    for r in redirects {
        if let Err(e) = r.apply() {
            eprintln!("minsh: {}: {}", r.target, e);
            child_exit(SETUP_FAILURE_STATUS);
        }
    }

    if let Some(program) = argv.program() {
        unsafe {
            libc::execvp(program.as_ptr(), argv.as_ptr());
        }
        // exec が戻るのは失敗時のみ
        let err = io::Error::last_os_error();
        eprintln!("minsh: {}: {}", program.to_string_lossy(), err);
    }
    child_exit(EXEC_FAILURE_STATUS);
}

/// `fork` で子プロセスを作り、`cmd` を実行させる。成功時は子 PID を返す。
///
/// 待機はしない。フォアグラウンド/バックグラウンドの扱いは呼び出し側が決める。
pub fn spawn(cmd: &Command, signals: &SignalDispositions) -> Result<pid_t, SpawnError> {
    let argv = CStringVec::from_args(&cmd.args)?;
    let redirects = cmd
        .redirects
        .iter()
        .map(PreparedRedirect::new)
        .collect::<Result<Vec<_>, _>>()?;

    match unsafe { libc::fork() } {
        -1 => Err(SpawnError::Fork(io::Error::last_os_error())),
        0 => exec_child(&argv, &redirects, signals),
        pid => {
            tracing::debug!(pid, program = %cmd.args[0], background = cmd.background, "spawned");
            Ok(pid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_is_null_terminated() {
        let args = vec!["echo".to_string(), "hi".to_string()];
        let argv = CStringVec::from_args(&args).unwrap();
        assert_eq!(argv.ptrs.len(), 3);
        assert!(argv.ptrs[2].is_null());
        assert_eq!(argv.program().unwrap().to_str().unwrap(), "echo");
    }

    #[test]
    fn nul_byte_rejected() {
        let args = vec!["ec\0ho".to_string()];
        let err = CStringVec::from_args(&args).err().unwrap();
        assert!(matches!(err, SpawnError::NulByte(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn fork_error_is_fatal() {
        let err = SpawnError::Fork(io::Error::from_raw_os_error(libc::EAGAIN));
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("fork: "));
    }

    #[test]
    fn open_flags_per_kind() {
        let prep = |kind| {
            PreparedRedirect::new(&Redirect {
                kind,
                target: "f".into(),
            })
            .unwrap()
        };
        assert_eq!(prep(RedirectKind::Input).open_flags(), libc::O_RDONLY);
        assert_ne!(prep(RedirectKind::Output).open_flags() & libc::O_TRUNC, 0);
        assert_ne!(prep(RedirectKind::Append).open_flags() & libc::O_APPEND, 0);
    }
}
