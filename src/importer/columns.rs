// ==========================================
// 学校管理系统 - 导入列定义
// ==========================================
// 职责: 导入文件的表头契约（区分大小写的精确列名）
// 说明: 导入校验与模板生成共用此表
// ==========================================

pub const NIS: &str = "NIS";
pub const FULL_NAME: &str = "Full Name";
pub const GENDER: &str = "Gender";
pub const DATE_OF_BIRTH: &str = "Date of Birth";
pub const PLACE_OF_BIRTH: &str = "Place of Birth";
pub const ADDRESS: &str = "Address";
pub const GUARDIAN_ID: &str = "Guardian ID";
pub const ENROLLMENT_DATE: &str = "Enrollment Date";
pub const NISN: &str = "NISN";
pub const PHONE: &str = "Phone";
pub const PHOTO_URL: &str = "Photo URL";

/// 列定义
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub required: bool,
    /// 模板示例值
    pub example: &'static str,
}

/// 全部列（模板中的列顺序）
pub const COLUMNS: [ColumnSpec; 11] = [
    ColumnSpec { header: NIS, required: true, example: "2024001" },
    ColumnSpec { header: NISN, required: false, example: "0098765432" },
    ColumnSpec { header: FULL_NAME, required: true, example: "Budi Santoso" },
    ColumnSpec { header: GENDER, required: true, example: "MALE" },
    ColumnSpec { header: DATE_OF_BIRTH, required: true, example: "2012-05-14" },
    ColumnSpec { header: PLACE_OF_BIRTH, required: true, example: "Bandung" },
    ColumnSpec { header: ADDRESS, required: true, example: "Jl. Merdeka No. 10" },
    ColumnSpec { header: PHONE, required: false, example: "081234567890" },
    ColumnSpec { header: PHOTO_URL, required: false, example: "https://example.com/photos/2024001.jpg" },
    ColumnSpec { header: GUARDIAN_ID, required: true, example: "<guardian-id>" },
    ColumnSpec { header: ENROLLMENT_DATE, required: true, example: "2024-07-15" },
];

/// 必需列
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().filter(|c| c.required).map(|c| c.header)
}

/// 找出缺失的必需列（按列表顺序）
pub fn missing_required_columns(headers: &[String]) -> Vec<String> {
    required_columns()
        .filter(|required| !headers.iter().any(|h| h == required))
        .map(str::to_string)
        .collect()
}
