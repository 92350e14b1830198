//! SIGINT / SIGTSTP の処分（disposition）管理。
//!
//! シェルは初めて処分を変更するときに、継承した元の処分を保存する。
//! 以後は何度モードを切り替えても保存値は上書きしないため、
//! 子プロセスは常に本来の継承処分を取り戻してから exec する。
//!
//! | 操作 | SIGTSTP | SIGINT |
//! |------|---------|--------|
//! | [`enter_interactive`](SignalDispositions::enter_interactive) | 無視 | 空ハンドラ（`read` を EINTR で中断させる） |
//! | [`ignore_interrupt`](SignalDispositions::ignore_interrupt) | そのまま | 無視 |
//! | [`restore_inherited`](SignalDispositions::restore_inherited) | 継承値 | 継承値 |

use std::io;
use std::ptr;

use thiserror::Error;

/// `sigaction` の失敗。
#[derive(Debug, Error)]
#[error("sigaction({signal}): {source}")]
pub struct SignalError {
    pub signal: &'static str,
    #[source]
    pub source: io::Error,
}

/// 何もしない SIGINT ハンドラ。`SA_RESTART` なしで設定するため、
/// ブロック中の `read` は EINTR で戻り、入力行の読み直しになる。
extern "C" fn interrupt_read(_sig: libc::c_int) {}

fn signal_name(sig: libc::c_int) -> &'static str {
    match sig {
        libc::SIGINT => "SIGINT",
        libc::SIGTSTP => "SIGTSTP",
        _ => "signal",
    }
}

fn new_action(handler: libc::sighandler_t) -> libc::sigaction {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler;
        libc::sigemptyset(&mut sa.sa_mask);
        sa.sa_flags = 0;
        sa
    }
}

/// `sigaction` を呼び、直前の処分を返す。
fn swap_action(sig: libc::c_int, action: &libc::sigaction) -> Result<libc::sigaction, SignalError> {
    let mut old: libc::sigaction = unsafe { std::mem::zeroed() };
    if unsafe { libc::sigaction(sig, action, &mut old) } == -1 {
        return Err(SignalError {
            signal: signal_name(sig),
            source: io::Error::last_os_error(),
        });
    }
    Ok(old)
}

/// シェルが管理する 2 つのシグナルの処分と、その継承元の値。
pub struct SignalDispositions {
    inherited_int: Option<libc::sigaction>,
    inherited_tstp: Option<libc::sigaction>,
}

impl SignalDispositions {
    pub fn new() -> Self {
        Self {
            inherited_int: None,
            inherited_tstp: None,
        }
    }

    fn install(&mut self, sig: libc::c_int, handler: libc::sighandler_t) -> Result<(), SignalError> {
        let old = swap_action(sig, &new_action(handler))?;
        let slot = match sig {
            libc::SIGTSTP => &mut self.inherited_tstp,
            _ => &mut self.inherited_int,
        };
        // 最初の 1 回だけ保存する
        slot.get_or_insert(old);
        Ok(())
    }

    /// 対話モード: SIGTSTP を無視し、SIGINT は読み取りを中断するだけにする。
    pub fn enter_interactive(&mut self) -> Result<(), SignalError> {
        self.install(libc::SIGTSTP, libc::SIG_IGN)?;
        self.install(
            libc::SIGINT,
            interrupt_read as extern "C" fn(libc::c_int) as libc::sighandler_t,
        )?;
        tracing::trace!("signals: interactive");
        Ok(())
    }

    /// 行の解析・展開・ディスパッチ中は SIGINT を無視する。
    pub fn ignore_interrupt(&mut self) -> Result<(), SignalError> {
        self.install(libc::SIGINT, libc::SIG_IGN)?;
        tracing::trace!("signals: ignoring SIGINT");
        Ok(())
    }

    /// 保存済みの継承処分に戻す。上の 2 操作の逆操作で、子プロセスでは exec 前に呼ぶ。
    ///
    /// 一度も変更していないシグナルはそのまま（既に継承値のまま）。
    pub fn restore_inherited(&self) -> Result<(), SignalError> {
        for (sig, saved) in [
            (libc::SIGTSTP, &self.inherited_tstp),
            (libc::SIGINT, &self.inherited_int),
        ] {
            if let Some(action) = saved {
                if unsafe { libc::sigaction(sig, action, ptr::null_mut()) } == -1 {
                    return Err(SignalError {
                        signal: signal_name(sig),
                        source: io::Error::last_os_error(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for SignalDispositions {
    fn default() -> Self {
        Self::new()
    }
}
