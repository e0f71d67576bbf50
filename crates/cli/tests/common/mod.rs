// Shared helpers for ctrsum integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_xlsxwriter::Workbook;

pub enum Val<'a> {
    Num(f64),
    Text(&'a str),
    Blank,
}

/// `ctrsum` running in `dir`, with settings and credentials isolated from
/// the machine it runs on.
pub fn ctrsum(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ctrsum"));
    cmd.current_dir(dir)
        .env("CTRSUM_SETTINGS", settings_path(dir))
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env_remove("CTRSUM_OPENAI_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Settings file used by [`ctrsum`] for `dir`.
pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(".config").join("ctrsum").join("settings.json")
}

pub fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run ctrsum")
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is valid JSON")
}

/// Keyword report in the fixed layout: keyword in A, volume in D, traffic in H.
pub fn write_keyword_file(path: &Path, rows: &[(&str, Val, Val)]) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    let headers = ["Keyword", "Position", "URL", "Search Volume", "KD", "CPC", "Competition", "Traffic"];
    for (col, h) in headers.iter().enumerate() {
        ws.write_string(0, col as u16, *h).unwrap();
    }
    for (i, (keyword, volume, traffic)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        ws.write_string(r, 0, *keyword).unwrap();
        for (col, val) in [(3u16, volume), (7u16, traffic)] {
            match val {
                Val::Num(n) => {
                    ws.write_number(r, col, *n).unwrap();
                }
                Val::Text(s) => {
                    ws.write_string(r, col, *s).unwrap();
                }
                Val::Blank => {}
            }
        }
    }
    wb.save(path).unwrap();
}

/// The two-file batch: a Chase month and a Wells Fargo month.
pub fn write_bank_batch(dir: &Path) {
    write_keyword_file(
        &dir.join("a.xlsx"),
        &[
            ("chase sapphire", Val::Num(100.0), Val::Num(10.0)),
            ("chase login", Val::Text("n/a"), Val::Num(5.0)),
            ("credit card", Val::Num(50.0), Val::Text("x")),
        ],
    );
    write_keyword_file(
        &dir.join("b.xlsx"),
        &[("wells fargo online", Val::Num(200.0), Val::Num(20.0))],
    );
}
