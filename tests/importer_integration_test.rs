// ==========================================
// 学生导入器集成测试
// ==========================================
// 真实 SQLite + 默认组件（解析 → 映射 → 校验 → 冲突检查 → 落库）
// ==========================================


use chrono::NaiveDate;
use chrono::Utc;
use school_admin::config::config_keys;
use school_admin::importer::{FileFormat, StudentImporter};
use school_admin::{Gender, ImportErrorKind};
use test_helpers::{
    csv_bytes, student_line, xlsx_bytes, xlsx_bytes_1904, TestEnv, XlsxCell, FULL_HEADER,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// 成功路径
// ==========================================

#[tokio::test]
async fn test_import_all_valid_rows() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "0011111111", "Budi Santoso", &guardian),
            student_line("2024002", "0022222222", "Ani Wijaya", &guardian),
            student_line("2024003", "", "Citra Lestari", &guardian),
        ],
    );

    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert!(result.success);
    assert_eq!(result.total_rows, 3);
    assert_eq!(result.imported, 3);
    assert_eq!(result.skipped, 0);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert!(result.summary.contains('3'));
    assert_eq!(env.student_count(), 3);

    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    assert_eq!(stored.full_name, "Budi Santoso");
    assert_eq!(stored.gender, Gender::Male);
    assert_eq!(stored.date_of_birth, ymd(2012, 5, 14));
    assert_eq!(stored.enrollment_date, ymd(2024, 7, 15));
    assert_eq!(stored.guardian_id, guardian);

    // 空 NISN 存为 None
    let third = env.student_repo.find_by_nis("2024003").unwrap().unwrap();
    assert_eq!(third.nisn, None);

    // 成功落库后通知列表页
    assert_eq!(env.revalidator.paths(), vec!["/dashboard/students"]);
}

#[tokio::test]
async fn test_optional_columns_may_be_absent() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let header = "NIS,Full Name,Gender,Date of Birth,Place of Birth,Address,Guardian ID,Enrollment Date";
    let line = format!(
        "2024001,Budi Santoso,female,14/05/2012,Bandung,Jl. Merdeka No. 10,{},2024-07-15",
        guardian
    );
    let result = env
        .importer()
        .import_batch(&csv_bytes(header, &[line]), FileFormat::Csv)
        .await
        .unwrap();

    assert_eq!(result.imported, 1, "errors: {:?}", result.errors);
    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    assert_eq!(stored.gender, Gender::Female);
    assert_eq!(stored.phone, None);
    assert_eq!(stored.photo_url, None);
}

// ==========================================
// 文件级错误
// ==========================================

#[tokio::test]
async fn test_header_only_file_is_empty() {
    let env = TestEnv::new();

    let result = env
        .importer()
        .import_batch(&csv_bytes(FULL_HEADER, &[]), FileFormat::Csv)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 0);
    assert_eq!(result.errors[0].kind, ImportErrorKind::EmptyFile);
    assert!(result.errors[0].message.contains("empty"));
    assert!(env.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_zero_byte_file_is_empty() {
    let env = TestEnv::new();

    let result = env.importer().import_batch(&[], FileFormat::Csv).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.errors[0].kind, ImportErrorKind::EmptyFile);
}

#[tokio::test]
async fn test_missing_address_column() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let header = "NIS,Full Name,Gender,Date of Birth,Place of Birth,Guardian ID,Enrollment Date";
    let line = format!("2024001,Budi Santoso,MALE,2012-05-14,Bandung,{},2024-07-15", guardian);
    let result = env
        .importer()
        .import_batch(&csv_bytes(header, &[line]), FileFormat::Csv)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ImportErrorKind::MissingColumns);
    assert!(result.errors[0].message.contains("Address"));
    assert_eq!(result.imported, 0);
    assert_eq!(env.student_count(), 0);
}

#[tokio::test]
async fn test_header_names_are_case_sensitive() {
    let env = TestEnv::new();

    let header = FULL_HEADER.replace("Full Name", "full name");
    let result = env
        .importer()
        .import_batch(&csv_bytes(&header, &["x".to_string()]), FileFormat::Csv)
        .await
        .unwrap();

    assert_eq!(result.errors[0].kind, ImportErrorKind::MissingColumns);
    assert!(result.errors[0].message.contains("Full Name"));
}

#[tokio::test]
async fn test_unreadable_xlsx_is_reported() {
    let env = TestEnv::new();

    let result = env
        .importer()
        .import_batch(b"definitely not a workbook", FileFormat::Xlsx)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ImportErrorKind::UnreadableFile);
}

// ==========================================
// 行级错误
// ==========================================

#[tokio::test]
async fn test_invalid_gender_row_is_skipped() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "", "Budi Santoso", &guardian),
            student_line("2024002", "", "Ani Wijaya", &guardian).replace(",MALE,", ",X,"),
        ],
    );
    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 3);
    assert_eq!(result.errors[0].field.as_deref(), Some("Gender"));
    assert_eq!(result.errors[0].data.as_deref(), Some("X"));
    assert!(env.student_repo.find_by_nis("2024002").unwrap().is_none());
}

#[tokio::test]
async fn test_mixed_batch_counts() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "", "Budi Santoso", &guardian),
            student_line("2024001", "", "Budi Duplikat", &guardian),
            student_line("2024003", "", "Citra Lestari", &guardian).replace("2012-05-14", "14.05.2012"),
        ],
    );
    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert!(result.success);
    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.errors.len(), 2);

    assert_eq!(result.errors[0].row, 3);
    assert_eq!(result.errors[0].kind, ImportErrorKind::DuplicateRegistrationId);
    assert_eq!(result.errors[1].row, 4);
    assert_eq!(result.errors[1].kind, ImportErrorKind::DateFormat);
    assert_eq!(result.errors[1].field.as_deref(), Some("Date of Birth"));

    // 重复 NIS 提示进入汇总
    assert!(result.summary.contains("NIS"));
}

#[tokio::test]
async fn test_first_occurrence_of_duplicate_nis_wins() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "", "Ani Pertama", &guardian),
            student_line("2024001", "0099999999", "Ani Kedua Lengkap", &guardian),
        ],
    );
    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors[0].row, 3);
    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    assert_eq!(stored.full_name, "Ani Pertama");
}

#[tokio::test]
async fn test_duplicate_nisn_within_batch() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "0011111111", "Budi Santoso", &guardian),
            student_line("2024002", "0011111111", "Ani Wijaya", &guardian),
        ],
    );
    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ImportErrorKind::DuplicateSecondaryId);
    assert_eq!(result.errors[0].field.as_deref(), Some("NISN"));
}

#[tokio::test]
async fn test_unknown_and_deleted_guardian_rejected() {
    let env = TestEnv::new();
    let deleted = env.seed_guardian("Pak Lama");
    env.guardian_repo.soft_delete(&deleted, Utc::now()).unwrap();

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "", "Budi Santoso", "no-such-guardian"),
            student_line("2024002", "", "Ani Wijaya", &deleted),
        ],
    );
    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.imported, 0);
    assert_eq!(result.count_errors(ImportErrorKind::GuardianNotFound), 2);
    assert!(result.errors.iter().all(|e| e.field.as_deref() == Some("Guardian ID")));
    assert!(env.revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_soft_deleted_student_nis_still_counts_as_duplicate() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(FULL_HEADER, &[student_line("2024001", "", "Budi Santoso", &guardian)]);
    let first = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();
    assert_eq!(first.imported, 1);

    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    env.student_repo.soft_delete(&stored.student_id, Utc::now()).unwrap();

    let second = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();
    assert_eq!(second.imported, 0);
    assert_eq!(second.errors[0].kind, ImportErrorKind::DuplicateRegistrationId);
}

#[tokio::test]
async fn test_configured_min_name_length_applies() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");
    env.set_config(config_keys::MIN_NAME_LENGTH, "8");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "", "Budi", &guardian),
            student_line("2024002", "", "Budi Santoso", &guardian),
        ],
    );
    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors[0].kind, ImportErrorKind::FieldValidation);
    assert_eq!(result.errors[0].field.as_deref(), Some("Full Name"));
    assert_eq!(result.errors[0].data.as_deref(), Some("Budi"));
}

#[tokio::test]
async fn test_configured_locale_translates_messages() {
    let env = TestEnv::new();
    env.set_config(config_keys::LOCALE, "id");

    let header = "NIS,Full Name";
    let result = env
        .importer()
        .import_batch(&csv_bytes(header, &["1,Budi".to_string()]), FileFormat::Csv)
        .await
        .unwrap();

    assert_eq!(result.errors[0].kind, ImportErrorKind::MissingColumns);
    assert!(result.errors[0].message.contains("Kolom wajib"));
}

// ==========================================
// 计数不变式
// ==========================================

#[tokio::test]
async fn test_counts_and_row_numbers_hold_with_blank_rows() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let lines = vec![
        student_line("2024001", "", "Budi Santoso", &guardian),
        ",,,,,,,,,,".to_string(),
        // NIS 与姓名均为空：格式空行，不计数
        format!(",,,MALE,2012-05-14,Bandung,Jl. Merdeka No. 10,,,{},2024-07-15", guardian),
        student_line("2024004", "", "Ani Wijaya", &guardian).replace(",MALE,", ",unknown,"),
        student_line("2024005", "", "Citra Lestari", "missing-guardian"),
        student_line("2024006", "", "Dewi Anggraini", &guardian),
    ];
    let last_row = lines.len() + 1;
    let result = env
        .importer()
        .import_batch(&csv_bytes(FULL_HEADER, &lines), FileFormat::Csv)
        .await
        .unwrap();

    assert_eq!(result.total_rows, 4);
    assert_eq!(result.imported + result.skipped, result.total_rows);
    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), result.skipped);

    let rows: Vec<usize> = result.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![5, 6]);
    assert!(rows.iter().all(|r| *r >= 2 && *r <= last_row));
}

#[tokio::test]
async fn test_reimport_reports_every_row_as_duplicate() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let bytes = csv_bytes(
        FULL_HEADER,
        &[
            student_line("2024001", "0011111111", "Budi Santoso", &guardian),
            student_line("2024002", "0022222222", "Ani Wijaya", &guardian),
        ],
    );

    let first = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();
    assert_eq!(first.imported, 2);

    let second = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();
    assert!(!second.success);
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.count_errors(ImportErrorKind::DuplicateRegistrationId), 2);
    assert_eq!(env.student_count(), 2);

    // 仅第一次导入触发页面失效
    assert_eq!(env.revalidator.paths().len(), 1);
}

// ==========================================
// XLSX
// ==========================================

#[tokio::test]
async fn test_xlsx_import_with_serial_dates() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let header: Vec<XlsxCell> = FULL_HEADER.split(',').map(XlsxCell::text).collect();
    let valid = vec![
        XlsxCell::Number(2024001.0),
        XlsxCell::Empty,
        XlsxCell::text("Budi Santoso"),
        XlsxCell::text("Male"),
        XlsxCell::Number(41043.0),
        XlsxCell::text("Bandung"),
        XlsxCell::text("Jl. Merdeka No. 10"),
        XlsxCell::Empty,
        XlsxCell::text("https://example.com/p/2024001.jpg"),
        XlsxCell::text(&guardian),
        XlsxCell::Number(45488.0),
    ];
    let mut bad_gender = valid.clone();
    bad_gender[0] = XlsxCell::Number(2024002.0);
    bad_gender[3] = XlsxCell::text("L");

    let bytes = xlsx_bytes(&[header, valid, bad_gender]);
    let result = env.importer().import_batch(&bytes, FileFormat::Xlsx).await.unwrap();

    assert_eq!(result.imported, 1, "errors: {:?}", result.errors);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 3);
    assert_eq!(result.errors[0].kind, ImportErrorKind::GenderValue);

    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    assert_eq!(stored.date_of_birth, ymd(2012, 5, 14));
    assert_eq!(stored.enrollment_date, ymd(2024, 7, 15));
    assert_eq!(stored.photo_url.as_deref(), Some("https://example.com/p/2024001.jpg"));
}

fn date_styled_row(nis: &str, guardian: &str, birth: f64, enrolled: f64) -> Vec<XlsxCell> {
    vec![
        XlsxCell::text(nis),
        XlsxCell::Empty,
        XlsxCell::text("Budi Santoso"),
        XlsxCell::text("Male"),
        XlsxCell::Date(birth),
        XlsxCell::text("Bandung"),
        XlsxCell::text("Jl. Merdeka No. 10"),
        XlsxCell::Empty,
        XlsxCell::Empty,
        XlsxCell::text(guardian),
        XlsxCell::Date(enrolled),
    ]
}

#[tokio::test]
async fn test_xlsx_date_formatted_cells_in_1900_system() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let header: Vec<XlsxCell> = FULL_HEADER.split(',').map(XlsxCell::text).collect();
    let row = date_styled_row("2024001", &guardian, 41043.0, 45488.0);

    let bytes = xlsx_bytes(&[header, row]);
    let result = env.importer().import_batch(&bytes, FileFormat::Xlsx).await.unwrap();
    assert_eq!(result.imported, 1, "errors: {:?}", result.errors);

    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    assert_eq!(stored.date_of_birth, ymd(2012, 5, 14));
    assert_eq!(stored.enrollment_date, ymd(2024, 7, 15));
}

#[tokio::test]
async fn test_xlsx_date_formatted_cells_in_1904_system() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    // 1904 系统序列号 = 1900 系统序列号 - 1462
    let header: Vec<XlsxCell> = FULL_HEADER.split(',').map(XlsxCell::text).collect();
    let row = date_styled_row("2024001", &guardian, 39581.0, 44026.0);

    let bytes = xlsx_bytes_1904(&[header, row]);
    let result = env.importer().import_batch(&bytes, FileFormat::Xlsx).await.unwrap();
    assert_eq!(result.imported, 1, "errors: {:?}", result.errors);

    let stored = env.student_repo.find_by_nis("2024001").unwrap().unwrap();
    assert_eq!(stored.date_of_birth, ymd(2012, 5, 14));
    assert_eq!(stored.enrollment_date, ymd(2024, 7, 15));
}

// ==========================================
// 编码
// ==========================================

#[tokio::test]
async fn test_non_utf8_csv_row_does_not_block_batch() {
    let env = TestEnv::new();
    let guardian = env.seed_guardian("Siti Aminah");

    let mut bytes = csv_bytes(
        FULL_HEADER,
        &[student_line("2024001", "", "Budi Santoso", &guardian)],
    );
    // 第 3 行姓名含 cp1252 字节 0xE9
    let latin1_line = student_line("2024002", "", "Ren@ Wijaya", &guardian).into_bytes();
    bytes.extend(latin1_line.into_iter().map(|b| if b == b'@' { 0xE9 } else { b }));
    bytes.push(b'\n');

    let result = env.importer().import_batch(&bytes, FileFormat::Csv).await.unwrap();

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.imported, 2);
    assert!(result.errors.is_empty());

    let stored = env.student_repo.find_by_nis("2024002").unwrap().unwrap();
    assert_eq!(stored.full_name, "Ren\u{FFFD} Wijaya");
}
