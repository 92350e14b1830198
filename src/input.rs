//! 入力行の取得。
//!
//! `std::io::BufRead` は EINTR を内部で再試行してしまうため、`libc::read` で直接読み取る。
//! 対話モードで SIGINT を受けると [`ReadLine::Interrupted`] を返し、ループ側がプロンプトを出し直す。

use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, RawFd};

const CHUNK: usize = 4096;

/// 1 回の読み取りの結果。
#[derive(Debug, PartialEq, Eq)]
pub enum ReadLine {
    /// 改行を除いた 1 行。
    Line(String),
    /// シグナルで中断された。途中まで読んだ内容は破棄済み。
    Interrupted,
    /// 入力の終端。
    Eof,
}

/// fd から改行区切りで行を読み取るリーダー。
pub struct LineReader {
    fd: RawFd,
    /// スクリプトファイルの場合の所有者（drop で close）。
    _file: Option<File>,
    buf: Vec<u8>,
    eof: bool,
}

impl LineReader {
    /// 標準入力から読む。
    pub fn stdin() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
            _file: None,
            buf: Vec::new(),
            eof: false,
        }
    }

    /// 開いたファイルから読む。
    pub fn from_file(file: File) -> Self {
        Self {
            fd: file.as_raw_fd(),
            _file: Some(file),
            buf: Vec::new(),
            eof: false,
        }
    }

    fn take_line(&mut self, end: usize, skip: usize) -> ReadLine {
        let rest = self.buf.split_off(end + skip);
        let mut line = std::mem::replace(&mut self.buf, rest);
        line.truncate(end);
        ReadLine::Line(String::from_utf8_lossy(&line).into_owned())
    }

    /// 1 行読み取る。EINTR 以外の読み取りエラーは `Err` で返す。
    pub fn read_line(&mut self) -> io::Result<ReadLine> {
        loop {
            if let Some(nl) = self.buf.iter().position(|&b| b == b'\n') {
                return Ok(self.take_line(nl, 1));
            }
            if self.eof {
                if self.buf.is_empty() {
                    return Ok(ReadLine::Eof);
                }
                // 改行なしの最終行
                let len = self.buf.len();
                return Ok(self.take_line(len, 0));
            }

            let mut chunk = [0u8; CHUNK];
            let n = unsafe { libc::read(self.fd, chunk.as_mut_ptr() as *mut libc::c_void, CHUNK) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    self.buf.clear();
                    return Ok(ReadLine::Interrupted);
                }
                return Err(err);
            }
            if n == 0 {
                self.eof = true;
                continue;
            }
            self.buf.extend_from_slice(&chunk[..n as usize]);
        }
    }
}
