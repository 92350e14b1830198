//! minsh — 行指向の小さなコマンドインタプリタ
//!
//! REPL ループ: reap → (対話モードなら) シグナル設定 + プロンプト → 1 行読み取り
//! → SIGINT 無視 → 分割 → 展開 → 分類 → 実行 → ループ
//!
//! 終了ステータス: 入力終端で 0、`exit` の引数（省略時 0）、致命的エラーで 1。

use std::process;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use minsh::config::{Args, Config, DEFAULT_LOG_FILTER, LOG_ENV};
use minsh::executor::{self, Flow};
use minsh::input::{LineReader, ReadLine};
use minsh::job;
use minsh::shell::Shell;

/// `MINSH_LOG` に従って stderr 向けのログ出力を初期化する。
fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 入力が尽きるか `exit` されるまで行を処理し、終了ステータスを返す。
fn run(shell: &mut Shell, reader: &mut LineReader) -> anyhow::Result<i32> {
    loop {
        // プロンプト前に終了/停止した子を回収して通知する
        job::reap_children();

        if shell.interactive {
            shell
                .signals
                .enter_interactive()
                .context("cannot set up interactive signal handling")?;
            eprint!("{}", shell.prompt);
        }

        let line = match reader.read_line().context("read error")? {
            ReadLine::Line(line) => line,
            ReadLine::Interrupted => {
                eprintln!();
                continue;
            }
            ReadLine::Eof => return Ok(0),
        };

        shell
            .signals
            .ignore_interrupt()
            .context("cannot ignore SIGINT")?;

        match executor::execute_line(shell, &line)? {
            Flow::Continue => {}
            Flow::Exit(code) => return Ok(code),
        }
    }
}

fn main() {
    init_logging();

    let config = Config::new(argh::from_env::<Args>());
    let result = config.open_input().and_then(|mut reader| {
        let mut shell = Shell::new(config.interactive(), config.prompt.clone());
        tracing::debug!(interactive = shell.interactive, pid = shell.status.pid, "starting");
        run(&mut shell, &mut reader)
    });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("minsh: {:#}", e);
            process::exit(1);
        }
    }
}
