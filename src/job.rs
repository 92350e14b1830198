//! 子プロセスの待機・reap・通知。
//!
//! - [`ChildStatus`]: `waitpid` の raw status を解釈した結果
//! - [`wait_for_fg`]: フォアグラウンド子プロセスを PID 指定で待機（停止も検出）
//! - [`reap_children`]: プロンプト前に非ブロッキングで全子プロセスを回収し、通知する
//!
//! 停止した子プロセスはその場で SIGCONT を送って再開させる。シェルは停止ジョブを保持しない。

use std::io;

use libc::pid_t;

// ── ステータス ──────────────────────────────────────────────────────

/// `waitpid` が報告した子プロセスの状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// 正常終了。引数は終了コード。
    Exited(i32),
    /// シグナルで終了。引数はシグナル番号。
    Signaled(i32),
    /// 停止。引数は停止させたシグナル番号。
    Stopped(i32),
}

impl ChildStatus {
    /// raw status を解釈する。継続（`WIFCONTINUED`）等の想定外の値は `None`。
    pub fn from_raw(raw: i32) -> Option<Self> {
        if libc::WIFEXITED(raw) {
            Some(Self::Exited(libc::WEXITSTATUS(raw)))
        } else if libc::WIFSIGNALED(raw) {
            Some(Self::Signaled(libc::WTERMSIG(raw)))
        } else if libc::WIFSTOPPED(raw) {
            Some(Self::Stopped(libc::WSTOPSIG(raw)))
        } else {
            None
        }
    }

    /// `$?` に入れる値。正常終了は終了コード、シグナル終了は 128 + シグナル番号。停止は `None`。
    pub fn exit_code(self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(code),
            Self::Signaled(sig) => Some(128 + sig),
            Self::Stopped(_) => None,
        }
    }

    /// ユーザ向けの通知文。
    pub fn notice(self, pid: pid_t) -> String {
        match self {
            Self::Exited(code) => format!("Child process {} done. Exit status {}.", pid, code),
            Self::Signaled(sig) => format!("Child process {} done. Signaled {}.", pid, sig),
            Self::Stopped(_) => format!("Child process {} stopped. Continuing.", pid),
        }
    }
}

// ── 再開 ────────────────────────────────────────────────────────────

/// 停止したプロセスに SIGCONT を送る。
pub fn resume(pid: pid_t) -> io::Result<()> {
    if unsafe { libc::kill(pid, libc::SIGCONT) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// 停止した子を再開させ、通知を出す。`kill` の失敗は報告のみ。
pub fn continue_stopped(pid: pid_t, status: ChildStatus) {
    if let Err(e) = resume(pid) {
        eprintln!("minsh: kill {}: {}", pid, e);
    }
    eprintln!("{}", status.notice(pid));
}

// ── 待機 ────────────────────────────────────────────────────────────

/// フォアグラウンドの子プロセスを `waitpid(pid, WUNTRACED)` で待つ。
///
/// EINTR は再試行する。停止を検出した場合は [`ChildStatus::Stopped`] を返す。
/// 再開と `$!` の更新は呼び出し側（executor）の責任。
pub fn wait_for_fg(pid: pid_t) -> io::Result<ChildStatus> {
    loop {
        let mut raw: i32 = 0;
        let ret = unsafe { libc::waitpid(pid, &mut raw, libc::WUNTRACED) };
        if ret == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if let Some(status) = ChildStatus::from_raw(raw) {
            tracing::debug!(pid, ?status, "foreground child");
            return Ok(status);
        }
    }
}

/// 非ブロッキングで回収できる子プロセスをすべて回収し、各々について通知する。
///
/// `waitpid(-1, WNOHANG | WUNTRACED)` を回収対象がなくなるまで繰り返す。
/// 停止していた子は SIGCONT で再開させる。回収した `(pid, status)` を回収順に返す。
pub fn reap_children() -> Vec<(pid_t, ChildStatus)> {
    let mut reaped = Vec::new();
    loop {
        let mut raw: i32 = 0;
        let pid = unsafe { libc::waitpid(-1, &mut raw, libc::WNOHANG | libc::WUNTRACED) };
        if pid <= 0 {
            break;
        }
        let Some(status) = ChildStatus::from_raw(raw) else {
            continue;
        };
        tracing::debug!(pid, ?status, "reaped");
        match status {
            ChildStatus::Stopped(_) => continue_stopped(pid, status),
            _ => eprintln!("{}", status.notice(pid)),
        }
        reaped.push((pid, status));
    }
    reaped
}
