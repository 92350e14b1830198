//! パラメータ展開: `$$`, `$!`, `$?`, `${NAME}` をワード内で置換する。
//!
//! 走査状態は [`ParamScanner`] が、出力の組み立ては [`expand`] 内のローカルバッファが持つ。
//! どちらも 1 ワードの展開ごとに新しく作られるため、ワード間で状態が漏れることはない。
//!
//! 不正な参照（末尾の `$`、閉じない `${`、`$x` 等）はエラーにせずリテラルとして残す。

use std::borrow::Cow;

use crate::shell::ShellStatus;

/// `$` の直後の文字で決まる参照の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `$$` — シェル自身の PID
    Pid,
    /// `$!` — 直前のバックグラウンドプロセスの PID
    LastBgPid,
    /// `$?` — 直前のフォアグラウンドコマンドの終了ステータス
    LastFgStatus,
    /// `${NAME}` — 環境変数
    Env,
}

/// ワード内で見つかった 1 つの参照。`word[start..end]` が参照全体（`$` から閉じ `}` まで）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamToken {
    pub start: usize,
    pub end: usize,
    pub kind: ParamKind,
}

impl ParamToken {
    /// `${NAME}` の `NAME` 部分。その他の種類では空文字。
    pub fn name<'a>(&self, word: &'a str) -> &'a str {
        match self.kind {
            ParamKind::Env => &word[self.start + 2..self.end - 1],
            _ => "",
        }
    }
}

/// ワードから参照を先頭から順に取り出すイテレータ。
///
/// 認識できない `$` は 1 文字進めて走査を続ける。
/// 閉じ `}` のない `${` はマッチせず、後続の `$$` 等は引き続き認識される。
pub struct ParamScanner<'a> {
    word: &'a str,
    pos: usize,
}

impl<'a> ParamScanner<'a> {
    pub fn new(word: &'a str) -> Self {
        Self { word, pos: 0 }
    }
}

impl Iterator for ParamScanner<'_> {
    type Item = ParamToken;

    fn next(&mut self) -> Option<ParamToken> {
        let bytes = self.word.as_bytes();
        while let Some(offset) = self.word[self.pos..].find('$') {
            let start = self.pos + offset;
            let (kind, end) = match bytes.get(start + 1) {
                Some(b'$') => (ParamKind::Pid, start + 2),
                Some(b'!') => (ParamKind::LastBgPid, start + 2),
                Some(b'?') => (ParamKind::LastFgStatus, start + 2),
                Some(b'{') => match self.word[start + 2..].find('}') {
                    Some(close) => (ParamKind::Env, start + 2 + close + 1),
                    None => {
                        self.pos = start + 1;
                        continue;
                    }
                },
                _ => {
                    self.pos = start + 1;
                    continue;
                }
            };
            self.pos = end;
            return Some(ParamToken { start, end, kind });
        }
        self.pos = self.word.len();
        None
    }
}

/// 1 つの参照の置換値を `out` に追加する。
fn push_value(out: &mut String, word: &str, token: &ParamToken, status: &ShellStatus) {
    match token.kind {
        ParamKind::Pid => out.push_str(&status.pid.to_string()),
        ParamKind::LastBgPid => {
            if let Some(pid) = status.last_bg_pid {
                out.push_str(&pid.to_string());
            }
        }
        ParamKind::LastFgStatus => out.push_str(&status.last_fg_status.to_string()),
        ParamKind::Env => {
            let name = token.name(word);
            // 空の名前・未定義 → 空文字（何も追加しない）
            if !name.is_empty() {
                if let Some(val) = std::env::var_os(name) {
                    out.push_str(&val.to_string_lossy());
                }
            }
        }
    }
}

/// ワード内の参照をすべて展開する。`$` が含まれなければゼロコピーの `Cow::Borrowed` を返す。
pub fn expand<'a>(word: &'a str, status: &ShellStatus) -> Cow<'a, str> {
    if !word.contains('$') {
        return Cow::Borrowed(word);
    }

    let mut out = String::with_capacity(word.len());
    let mut literal_start = 0;
    for token in ParamScanner::new(word) {
        out.push_str(&word[literal_start..token.start]);
        push_value(&mut out, word, &token, status);
        literal_start = token.end;
    }
    out.push_str(&word[literal_start..]);

    Cow::Owned(out)
}

/// ワード列を順に展開し、各要素を展開結果で置き換える。
pub fn expand_words(words: Vec<String>, status: &ShellStatus) -> Vec<String> {
    words
        .into_iter()
        .map(|w| {
            if w.contains('$') {
                expand(&w, status).into_owned()
            } else {
                w
            }
        })
        .collect()
}
