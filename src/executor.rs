//! 1 行分のコマンド実行: 分割 → 展開 → 分類 → ディスパッチ。
//!
//! - ビルトイン（`exit`, `cd`）: fork なしでシェル内で実行（[`builtins::try_exec`]）
//! - それ以外: [`spawn::spawn`] で fork/exec
//!   - foreground: `waitpid(pid, WUNTRACED)` で待機し `$?` を更新。停止したら再開させて `$!` に記録
//!   - background: 待たずに `$!` に記録して返る
//!
//! どの段階で行を打ち切っても、戻り値 [`Flow`] でループに制御を返す。
//! ユーザの誤り（分類エラー・ビルトインの失敗）はここで報告し、`Err` にはしない。
//! `waitpid` の失敗もコマンド単位のエラーとして報告し、`$?` は変えない。
//! `Err` はシェル自体を終了させるべき致命的エラー（fork 失敗等）のみ。

use crate::builtins;
use crate::expand;
use crate::job::{self, ChildStatus};
use crate::parser::{self, Command};
use crate::shell::Shell;
use crate::spawn;

/// 1 行を処理した後の制御。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// 次の行へ進む。
    Continue,
    /// シェルを指定ステータスで終了する（`exit` ビルトイン）。
    Exit(i32),
}

/// 1 行を実行する。
pub fn execute_line(shell: &mut Shell, line: &str) -> anyhow::Result<Flow> {
    let words = parser::split_words(line);
    if words.is_empty() {
        return Ok(Flow::Continue);
    }

    let words = expand::expand_words(words, &shell.status);

    let cmd = match parser::classify(words) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("minsh: {}", e);
            return Ok(Flow::Continue);
        }
    };
    if cmd.is_empty() {
        return Ok(Flow::Continue);
    }

    if let Some(result) = builtins::try_exec(&cmd.args) {
        return Ok(result.unwrap_or_else(|e| {
            eprintln!("minsh: {}", e);
            Flow::Continue
        }));
    }

    execute_external(shell, &cmd)
}

/// 外部コマンドを起動し、foreground なら待機して状態を更新する。
fn execute_external(shell: &mut Shell, cmd: &Command) -> anyhow::Result<Flow> {
    let pid = match spawn::spawn(cmd, &shell.signals) {
        Ok(pid) => pid,
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            eprintln!("minsh: {}", e);
            return Ok(Flow::Continue);
        }
    };

    if cmd.background {
        shell.status.record_background(pid);
        return Ok(Flow::Continue);
    }

    let status = match job::wait_for_fg(pid) {
        Ok(status) => status,
        Err(e) => {
            // SIGCHLD が SIG_IGN で継承された場合など。子は既に回収されている
            eprintln!("minsh: waitpid({}): {}", pid, e);
            return Ok(Flow::Continue);
        }
    };
    match status {
        ChildStatus::Stopped(_) => {
            // 停止したフォアグラウンドは再開させ、以後は非同期に走るものとして扱う
            job::continue_stopped(pid, status);
            shell.status.record_background(pid);
        }
        _ => shell.status.record_foreground(status),
    }

    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(false, String::new())
    }

    #[test]
    fn blank_and_comment_lines() {
        let mut sh = shell();
        assert_eq!(execute_line(&mut sh, "").unwrap(), Flow::Continue);
        assert_eq!(execute_line(&mut sh, "   ").unwrap(), Flow::Continue);
        assert_eq!(execute_line(&mut sh, "# exit 3").unwrap(), Flow::Continue);
    }

    #[test]
    fn missing_operand_runs_nothing() {
        let mut sh = shell();
        assert_eq!(execute_line(&mut sh, "exit <").unwrap(), Flow::Continue);
        assert_eq!(sh.status.last_fg_status, 0);
        assert_eq!(sh.status.last_bg_pid, None);
    }

    #[test]
    fn redirect_only_line_is_noop() {
        let mut sh = shell();
        assert_eq!(execute_line(&mut sh, "> /nonexistent/minsh").unwrap(), Flow::Continue);
    }

    #[test]
    fn exit_builtin() {
        let mut sh = shell();
        assert_eq!(execute_line(&mut sh, "exit").unwrap(), Flow::Exit(0));
        assert_eq!(execute_line(&mut sh, "exit 7").unwrap(), Flow::Exit(7));
        assert_eq!(execute_line(&mut sh, "exit abc").unwrap(), Flow::Continue);
        assert_eq!(execute_line(&mut sh, "exit 1 2").unwrap(), Flow::Continue);
    }

    #[test]
    fn exit_status_is_expanded() {
        let mut sh = shell();
        sh.status.last_fg_status = 42;
        assert_eq!(execute_line(&mut sh, "exit $?").unwrap(), Flow::Exit(42));
    }

    #[test]
    fn exit_ignores_background_marker() {
        let mut sh = shell();
        assert_eq!(execute_line(&mut sh, "exit 4 &").unwrap(), Flow::Exit(4));
    }
}
