#![allow(dead_code)]
use std::fs;

pub const WORKLOADS: [(&str, &str); 2] = [
    ("comprehensive", "tests/programs/comprehensive/program.py"),
    ("fstrings", "tests/programs/fstrings/program.py"),
];

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}
