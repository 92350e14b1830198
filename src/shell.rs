//! シェルのグローバル状態を保持するモジュール。
//!
//! `$$` / `$?` / `$!` の値は数値で保持し、文字列化は展開時にのみ行う。
//! 更新するのはプロセス制御側（フォアグラウンド待機の直後とバックグラウンド起動の直後）だけで、
//! [`expand`](crate::expand) は読み取るだけ。

use libc::pid_t;

use crate::job::ChildStatus;
use crate::signals::SignalDispositions;

/// 展開に使う状態。プロセスの生存期間中ずっと保持される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellStatus {
    /// シェル自身の PID（`$$`）。
    pub pid: pid_t,
    /// 直前のフォアグラウンドコマンドの終了ステータス（`$?`）。初期値 0。
    pub last_fg_status: i32,
    /// 直前のバックグラウンドプロセスの PID（`$!`）。未設定なら空文字に展開される。
    pub last_bg_pid: Option<pid_t>,
}

impl ShellStatus {
    pub fn new() -> Self {
        Self {
            pid: unsafe { libc::getpid() },
            last_fg_status: 0,
            last_bg_pid: None,
        }
    }

    /// フォアグラウンド待機の結果を `$?` に反映する。
    ///
    /// 正常終了 → 終了コード、シグナル終了 → 128 + シグナル番号。
    /// 停止の場合は `$?` を変えず、呼び出し側が [`record_background`](Self::record_background) する。
    pub fn record_foreground(&mut self, status: ChildStatus) {
        if let Some(code) = status.exit_code() {
            self.last_fg_status = code;
        }
    }

    /// 非同期に走り始めたプロセスを `$!` に記録する。
    pub fn record_background(&mut self, pid: pid_t) {
        self.last_bg_pid = Some(pid);
    }
}

impl Default for ShellStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// シェルの実行状態。REPL ループ全体で共有される。
pub struct Shell {
    pub status: ShellStatus,
    /// 標準入力から読んでいる場合に `true`（プロンプト表示とシグナル設定を行う）。
    pub interactive: bool,
    /// `PS1` から取ったプロンプト文字列。
    pub prompt: String,
    pub signals: SignalDispositions,
}

impl Shell {
    pub fn new(interactive: bool, prompt: String) -> Self {
        Self {
            status: ShellStatus::new(),
            interactive,
            prompt,
            signals: SignalDispositions::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let st = ShellStatus::new();
        assert_eq!(st.pid as u32, std::process::id());
        assert_eq!(st.last_fg_status, 0);
        assert_eq!(st.last_bg_pid, None);
    }

    #[test]
    fn foreground_exit_and_signal() {
        let mut st = ShellStatus::new();
        st.record_foreground(ChildStatus::Exited(3));
        assert_eq!(st.last_fg_status, 3);
        st.record_foreground(ChildStatus::Signaled(libc::SIGINT));
        assert_eq!(st.last_fg_status, 128 + libc::SIGINT);
    }

    #[test]
    fn stop_leaves_status_alone() {
        let mut st = ShellStatus::new();
        st.record_foreground(ChildStatus::Exited(5));
        st.record_foreground(ChildStatus::Stopped(libc::SIGTSTP));
        assert_eq!(st.last_fg_status, 5);
    }

    #[test]
    fn background_pid_independent_of_status() {
        let mut st = ShellStatus::new();
        st.record_foreground(ChildStatus::Exited(1));
        st.record_background(1234);
        assert_eq!(st.last_bg_pid, Some(1234));
        assert_eq!(st.last_fg_status, 1);
    }
}
