//! minsh ライブラリ — ベンチマーク・テスト用にモジュールを公開する。
//!
//! バイナリ本体は `main.rs` の REPL ループ。
//! この `lib.rs` は `benches/bench_main.rs` や `tests/` から
//! トークナイザ・展開・分類・実行の各段に直接アクセスするために存在する。
//!
//! ## モジュール構成
//!
//! | モジュール | 役割 |
//! |-----------|------|
//! | [`parser`] | トークナイザ（空白区切り、`#` コメント、`\` エスケープ）と分類器（argv / `<` `>` `>>` / 末尾 `&`） |
//! | [`expand`] | パラメータ展開（`$$`, `$!`, `$?`, `${NAME}`） |
//! | [`executor`] | 1 行の実行（分割 → 展開 → 分類 → ビルトイン or fork/exec） |
//! | [`builtins`] | ビルトイン（`exit`, `cd`） |
//! | [`spawn`] | `fork` + シグナル復元 + リダイレクト + `execvp` |
//! | [`job`] | フォアグラウンド待機、非ブロッキング reap、停止プロセスの再開と通知 |
//! | [`signals`] | SIGINT / SIGTSTP の処分の切り替えと継承値の保存・復元 |
//! | [`shell`] | シェルのグローバル状態（`$$`, `$?`, `$!`、対話フラグ、プロンプト） |
//! | [`input`] | EINTR を区別する行リーダー |
//! | [`config`] | コマンドライン引数と環境変数による設定 |

pub mod builtins;
pub mod config;
pub mod executor;
pub mod expand;
pub mod input;
pub mod job;
pub mod parser;
pub mod shell;
pub mod signals;
pub mod spawn;
