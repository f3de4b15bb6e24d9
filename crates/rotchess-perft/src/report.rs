//! Serializable results, printed as text or as JSON with `--json`.

use serde::Serialize;

/// Outcome of one suite entry at one depth.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PerftRecord {
    pub name: String,
    pub depth: u32,
    pub expected: u64,
    pub nodes: u64,
    pub passed: bool,
    pub millis: u128,
}

impl PerftRecord {
    pub fn nodes_per_second(&self) -> u64 {
        if self.millis == 0 {
            return 0;
        }
        (u128::from(self.nodes) * 1000 / self.millis) as u64
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub records: Vec<PerftRecord>,
    pub failures: usize,
}

impl SuiteReport {
    pub fn new(records: Vec<PerftRecord>) -> Self {
        let failures = records.iter().filter(|r| !r.passed).count();
        SuiteReport { records, failures }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DivideEntry {
    #[serde(rename = "move")]
    pub mv: String,
    pub nodes: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DivideReport {
    pub fen: String,
    pub depth: u32,
    pub moves: Vec<DivideEntry>,
    pub total: u64,
}

impl DivideReport {
    pub fn new(fen: String, depth: u32, counts: Vec<(String, u64)>) -> Self {
        let total = counts.iter().map(|(_, nodes)| nodes).sum();
        let moves = counts
            .into_iter()
            .map(|(mv, nodes)| DivideEntry { mv, nodes })
            .collect();
        DivideReport {
            fen,
            depth,
            moves,
            total,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SeeReport {
    pub fen: String,
    #[serde(rename = "move")]
    pub mv: String,
    pub san: String,
    pub score: i32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub fen: String,
    pub notation: String,
    pub moves: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub fen: String,
    pub mode: String,
    pub legal_moves: usize,
    pub in_check: bool,
    pub insufficient_material: bool,
    pub result: Option<String>,
}
