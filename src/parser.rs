//! トークナイザ + 分類器: 入力行をワード列に分割し、引数・リダイレクト・`&` に振り分ける。
//!
//! 2 段構成:
//!
//! 1. [`split_words`] — 行をワード列（所有 `String` の `Vec`）に分割する。
//!    先頭空白の除去、ワード先頭の `#` によるコメント、`\X` による 1 文字エスケープのみを扱う。
//!    クォートは存在しない。行は改行を除いた状態で渡されるため、行末の `\` は何もエスケープせず
//!    リテラルの `\` としてワードに残る（行継続はない）。
//! 2. [`classify`] — 展開済みワード列を [`Command`]（argv・リダイレクト・バックグラウンドフラグ）に変換する。
//!
//! 変数展開は両者の間で [`expand`](crate::expand) が行う。

use thiserror::Error;

/// 1 行あたりの最大ワード数。超過分は読み捨てる。
pub const MAX_WORDS: usize = 512;

// ── Tokenizer ───────────────────────────────────────────────────────

/// C の `isspace` 相当（ASCII 空白 + 垂直タブ）。
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

/// 入力行をワードに分割するイテレータ。
///
/// 各ワードは独立した `String` に 1 文字ずつ追記して構築する。
/// ワード先頭の裸の `#` に出会うと、以降の行全体をコメントとして打ち切る。
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            done: false,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let skipped = rest.len() - rest.trim_start_matches(is_space).len();
        self.pos += skipped;
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        self.skip_whitespace();

        let input = self.input;
        let mut chars = input[self.pos..].char_indices().peekable();
        match chars.peek() {
            None | Some((_, '#')) => {
                self.done = true;
                return None;
            }
            Some(_) => {}
        }

        let start = self.pos;
        let mut word = String::new();
        let mut consumed = input.len() - start;
        while let Some((i, c)) = chars.next() {
            match c {
                c if is_space(c) => {
                    consumed = i;
                    break;
                }
                '\\' => match chars.next() {
                    // `\X` → リテラル X（空白・`#`・`\` を含む）
                    Some((_, escaped)) => word.push(escaped),
                    // 行末のバックスラッシュ → そのまま
                    None => word.push('\\'),
                },
                c => word.push(c),
            }
        }
        self.pos = start + consumed;
        Some(word)
    }
}

/// 行をワード列に分割する。最大 [`MAX_WORDS`] 個。
pub fn split_words(line: &str) -> Vec<String> {
    Tokenizer::new(line).take(MAX_WORDS).collect()
}

// ── Classifier ──────────────────────────────────────────────────────

/// リダイレクトの種別。対象 fd とオープンモードを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<` — stdin をファイルから読み取り
    Input,
    /// `>` — stdout を上書き
    Output,
    /// `>>` — stdout を追記
    Append,
}

impl RedirectKind {
    /// 演算子ワードを種別に変換する。演算子でなければ `None`。
    pub fn from_operator(word: &str) -> Option<Self> {
        match word {
            "<" => Some(Self::Input),
            ">" => Some(Self::Output),
            ">>" => Some(Self::Append),
            _ => None,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            Self::Input => "<",
            Self::Output => ">",
            Self::Append => ">>",
        }
    }

    /// 置き換える標準 fd。
    pub fn target_fd(self) -> i32 {
        match self {
            Self::Input => libc::STDIN_FILENO,
            Self::Output | Self::Append => libc::STDOUT_FILENO,
        }
    }
}

/// リダイレクト指定。種別とターゲットファイルパスを持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: String,
}

/// 分類済みコマンド。
///
/// `args` からはリダイレクト演算子とそのオペランド、末尾の `&` が取り除かれている。
/// リダイレクトは行内の出現順に並び、子プロセスでその順に適用される（同じ fd なら後勝ち）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub args: Vec<String>,
    pub redirects: Vec<Redirect>,
    /// 元のワード列の最後が `&` だった場合に `true`。
    pub background: bool,
}

impl Command {
    /// 実行すべきものがない（コメントのみ、リダイレクトのみ等）。
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// 分類時のエラー。ユーザに報告され、その行は実行されない。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// リダイレクト演算子が行末にあり、オペランドがない。
    #[error("syntax error: missing redirection operand after `{0}`")]
    MissingRedirectTarget(&'static str),
}

/// 展開済みワード列を argv・リダイレクト・バックグラウンドフラグに振り分ける。
pub fn classify(mut words: Vec<String>) -> Result<Command, ParseError> {
    let background = words.last().is_some_and(|w| w == "&");
    if background {
        words.pop();
    }

    let mut cmd = Command {
        args: Vec::with_capacity(words.len()),
        redirects: Vec::new(),
        background,
    };

    let mut iter = words.into_iter();
    while let Some(word) = iter.next() {
        match RedirectKind::from_operator(&word) {
            Some(kind) => {
                let target = iter
                    .next()
                    .ok_or(ParseError::MissingRedirectTarget(kind.operator()))?;
                cmd.redirects.push(Redirect { kind, target });
            }
            None => cmd.args.push(word),
        }
    }

    tracing::trace!(
        args = cmd.args.len(),
        redirects = cmd.redirects.len(),
        background = cmd.background,
        "classified"
    );
    Ok(cmd)
}
