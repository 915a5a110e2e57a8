// ==========================================
// 学校管理系统 - 批次内冲突索引
// ==========================================
// 职责: 记录本批次已接受行的 NIS / NISN，检测批次内重复
// 说明: 只登记已接受的行；被拒绝行的学号不占位
// ==========================================

use crate::domain::import::ValidatedStudentRecord;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct BatchKeyIndex {
    // 学号 → 首次接受的行号
    nis: HashMap<String, usize>,
    nisn: HashMap<String, usize>,
}

impl BatchKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 该 NIS 首次被接受的行号
    pub fn nis_row(&self, nis: &str) -> Option<usize> {
        self.nis.get(nis).copied()
    }

    /// 该 NISN 首次被接受的行号
    pub fn nisn_row(&self, nisn: &str) -> Option<usize> {
        self.nisn.get(nisn).copied()
    }

    /// 登记已接受的记录
    pub fn record(&mut self, row_number: usize, record: &ValidatedStudentRecord) {
        self.nis.entry(record.nis.clone()).or_insert(row_number);
        if let Some(nisn) = &record.nisn {
            self.nisn.entry(nisn.clone()).or_insert(row_number);
        }
    }

    pub fn len(&self) -> usize {
        self.nis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nis.is_empty()
    }
}
