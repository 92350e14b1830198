//! minsh ベンチマーク: 分割、展開、分類、fork/exec の計測。
//!
//! `std::time::Instant` による手動計測（外部クレート不要）。
//!
//! 実行: `cargo bench`

use std::time::{Duration, Instant};

use minsh::expand;
use minsh::parser::{self, Command};
use minsh::shell::ShellStatus;
use minsh::signals::SignalDispositions;

// ── ベンチマークインフラ ──────────────────────────────────────────

struct BenchResult {
    category: &'static str,
    name: &'static str,
    avg: Duration,
    iters: u64,
}

impl BenchResult {
    fn print(&self) {
        let avg_us = self.avg.as_nanos() as f64 / 1000.0;
        println!(
            "[{:<8}] {:<40}: avg {:>10.2}µs  ({} iters)",
            self.category, self.name, avg_us, self.iters,
        );
    }
}

fn bench<F: FnMut()>(category: &'static str, name: &'static str, iters: u64, mut f: F) -> BenchResult {
    // ウォームアップ
    for _ in 0..iters.min(100) {
        f();
    }

    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    let elapsed = start.elapsed();

    BenchResult {
        category,
        name,
        avg: elapsed / iters as u32,
        iters,
    }
}

fn print_all(results: &mut Vec<BenchResult>) {
    for r in results.iter() {
        r.print();
    }
    results.clear();
}

// ── メイン ────────────────────────────────────────────────────────

fn main() {
    println!("minsh benchmark suite");
    println!("{}", "=".repeat(80));

    let mut results = Vec::new();
    let mut status = ShellStatus::new();
    status.last_fg_status = 1;
    status.last_bg_pid = Some(12345);
    std::env::set_var("MINSH_BENCH_VAR", "some value");

    // ── 分割 ──
    println!("\n--- Tokenizer ---");

    results.push(bench("split", "echo hello", 10_000, || {
        let _ = parser::split_words("echo hello");
    }));

    results.push(bench("split", "cat < in > out &", 10_000, || {
        let _ = parser::split_words("cat < in > out &");
    }));

    results.push(bench("split", "a\\ b\\ c d #comment e f", 10_000, || {
        let _ = parser::split_words("a\\ b\\ c d #comment e f");
    }));

    print_all(&mut results);

    // ── 展開 ──
    println!("\n--- Expansion ---");

    results.push(bench("expand", "plain (no-op)", 10_000, || {
        let _ = expand::expand("plain", &status);
    }));

    results.push(bench("expand", "$$-$?-$!", 10_000, || {
        let _ = expand::expand("$$-$?-$!", &status);
    }));

    results.push(bench("expand", "pre${MINSH_BENCH_VAR}post", 10_000, || {
        let _ = expand::expand("pre${MINSH_BENCH_VAR}post", &status);
    }));

    print_all(&mut results);

    // ── 分類 ──
    println!("\n--- Classifier ---");

    results.push(bench("classify", "sort < a > b >> c &", 10_000, || {
        let _ = parser::classify(parser::split_words("sort < a > b >> c &"));
    }));

    print_all(&mut results);

    // ── fork/exec ──
    println!("\n--- Spawn (fork + execvp) ---");

    let signals = SignalDispositions::new();
    let cmd = Command {
        args: vec!["/bin/true".to_string()],
        ..Command::default()
    };

    results.push(bench("spawn", "/bin/true (fork + execvp)", 1_000, || {
        if let Ok(pid) = minsh::spawn::spawn(&cmd, &signals) {
            let _ = minsh::job::wait_for_fg(pid);
        }
    }));

    print_all(&mut results);

    println!("\n{}", "=".repeat(80));
    println!("done.");
}
