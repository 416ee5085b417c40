#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Layout of the source spreadsheet: a title row, then the real header.
pub const SHEET_HEADER: &str = "TT,Câu hỏi,Phương án A,Phương án B,Phương án C,Phương án D,Phương án E,Đ.án đúng,Số văn bản tham chiếu (kèm trích yếu văn bản),Điều khoản tham chiếu cụ thể,Unnamed: 10";

pub struct Fixture {
    _tmp: TempDir,
    pub dir: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = tmp.path().to_path_buf();
        Self { _tmp: tmp, dir }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// A sheet export with `count` questions whose key is always `B`.
    pub fn sheet(&self, name: &str, count: usize) -> PathBuf {
        self.write(name, &sheet_csv(count))
    }
}

pub fn sheet_csv(count: usize) -> String {
    let mut csv = String::from("Question bank 2025,,,,,,,,,,\n");
    csv.push_str(SHEET_HEADER);
    csv.push('\n');
    for id in 1..=count {
        writeln!(
            csv,
            "{id},\"Question {id}, part one\",alpha,beta,gamma,delta,, b ,Decree {id},Art. {id},"
        )
        .expect("write row");
    }
    csv
}
