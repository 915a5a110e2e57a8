// ==========================================
// 学校管理系统 - 学生导入器实现
// ==========================================
// 职责: 整合导入流程，从上传字节到数据库
// 流程: 解析 → 表头检查 → 逐行(映射 → 校验 → 重复/监护人检查) → 整批落库 → 汇总
// 约束: 逐行错误是值不是 Err；Err 只用于基础设施故障
// ==========================================

use crate::config::{FieldRules, ImportConfigReader};
use crate::domain::import::{
    ImportErrorEntry, ImportErrorKind, ImportResult, ImportRow, ValidatedStudentRecord,
};
use crate::domain::student::Student;
use crate::i18n::t_in;
use crate::importer::columns;
use crate::importer::conflict_handler::BatchKeyIndex;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::field_validator::FieldValidator as FieldValidatorImpl;
use crate::importer::file_parser::{FileFormat, UniversalFileParser};
use crate::importer::student_importer_trait::{
    FieldMapper, FieldValidator, FileParser, StudentImporter,
};
use crate::repository::StudentImportRepository;
use crate::revalidation::{self, PageRevalidator};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug)]
enum RowOutcome {
    /// NIS 与 Full Name 均为空：静默跳过，不计数
    Blank,
    Accepted(ValidatedStudentRecord),
    Rejected(ImportError),
}

impl RowOutcome {
    /// 行级错误 → Rejected；基础设施错误继续向上传播
    fn reject(err: ImportError) -> ImporterResult<Self> {
        match err.kind() {
            Some(kind) if kind.is_row_scoped() => Ok(RowOutcome::Rejected(err)),
            _ => Err(err),
        }
    }
}

// ==========================================
// StudentImporterImpl - 学生导入器实现
// ==========================================
pub struct StudentImporterImpl<R, C>
where
    R: StudentImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    field_validator: Box<dyn FieldValidator>,

    // 列表页失效通知
    revalidator: Arc<dyn PageRevalidator>,
}

impl<R, C> StudentImporterImpl<R, C>
where
    R: StudentImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 StudentImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - field_validator: 字段校验器
    /// - revalidator: 页面失效通知者
    pub fn new(
        import_repo: R,
        config: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        field_validator: Box<dyn FieldValidator>,
        revalidator: Arc<dyn PageRevalidator>,
    ) -> Self {
        Self {
            import_repo,
            config,
            file_parser,
            field_mapper,
            field_validator,
            revalidator,
        }
    }

    /// 使用默认组件创建
    pub fn with_defaults(import_repo: R, config: C, revalidator: Arc<dyn PageRevalidator>) -> Self {
        Self::new(
            import_repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::default()),
            Box::new(FieldValidatorImpl),
            revalidator,
        )
    }
}

#[async_trait::async_trait]
impl<R, C> StudentImporter for StudentImporterImpl<R, C>
where
    R: StudentImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, bytes), fields(batch_id, size = bytes.len()))]
    async fn import_batch(&self, bytes: &[u8], format: FileFormat) -> ImporterResult<ImportResult> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let locale = self.config.get_locale().await.map_err(config_error)?;
        info!(batch_id = %batch_id, format = %format, "开始导入学生数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let sheet = match self.file_parser.parse_sheet(bytes, format) {
            Ok(sheet) => sheet,
            Err(e) if e.kind().is_some() => {
                warn!(error = %e, "文件无法读取");
                return Ok(ImportResult::fatal(batch_id, e.to_entry(0, &locale)));
            }
            Err(e) => return Err(e),
        };
        info!(rows = sheet.rows.len(), columns = sheet.headers.len(), "文件解析完成");

        // === 步骤 2: 文件级检查 ===
        if sheet.rows.is_empty() {
            warn!("文件无数据行");
            return Ok(ImportResult::fatal(
                batch_id,
                ImportError::EmptyFile.to_entry(0, &locale),
            ));
        }

        let missing = columns::missing_required_columns(&sheet.headers);
        if !missing.is_empty() {
            warn!(missing = ?missing, "缺少必需列");
            return Ok(ImportResult::fatal(
                batch_id,
                ImportError::MissingColumns(missing).to_entry(0, &locale),
            ));
        }

        // === 步骤 3: 逐行处理 ===
        debug!("步骤 3: 逐行处理");
        let rules = self.config.get_field_rules().await.map_err(config_error)?;
        let mut index = BatchKeyIndex::new();
        let mut accepted: Vec<ValidatedStudentRecord> = Vec::new();
        let mut errors: Vec<ImportErrorEntry> = Vec::new();
        let mut total_rows = 0usize;

        for row in &sheet.rows {
            match self.process_row(row, &rules, &index).await? {
                RowOutcome::Blank => {
                    debug!(row = row.row_number, "NIS 与姓名均为空，跳过");
                }
                RowOutcome::Accepted(record) => {
                    total_rows += 1;
                    index.record(row.row_number, &record);
                    accepted.push(record);
                }
                RowOutcome::Rejected(err) => {
                    total_rows += 1;
                    warn!(row = row.row_number, error = %err, "行被拒绝");
                    errors.push(err.to_entry(row.row_number, &locale));
                }
            }
        }
        info!(
            total = total_rows,
            accepted = accepted.len(),
            rejected = errors.len(),
            "逐行处理完成"
        );

        // === 步骤 4: 整批落库 ===
        let imported = self.commit(accepted, &locale, &mut errors).await;

        // === 步骤 5: 构造返回结果 ===
        let skipped = total_rows.saturating_sub(imported);
        let duplicate_nis = errors
            .iter()
            .filter(|e| e.kind == ImportErrorKind::DuplicateRegistrationId)
            .count();
        let summary = build_summary(&locale, imported, total_rows, skipped, duplicate_nis);

        if imported > 0 {
            self.revalidate_student_list().await;
        }

        info!(
            batch_id = %batch_id,
            total = total_rows,
            imported = imported,
            skipped = skipped,
            elapsed_ms = start_time.elapsed().as_millis(),
            "学生数据导入完成"
        );

        Ok(ImportResult {
            batch_id,
            success: imported > 0,
            total_rows,
            imported,
            skipped,
            errors,
            summary,
        })
    }
}

// 辅助方法
impl<R, C> StudentImporterImpl<R, C>
where
    R: StudentImportRepository,
    C: ImportConfigReader,
{
    /// 处理单行：映射 → 校验 → 冲突检查
    async fn process_row(
        &self,
        row: &ImportRow,
        rules: &FieldRules,
        index: &BatchKeyIndex,
    ) -> ImporterResult<RowOutcome> {
        if row.text(columns::NIS).is_none() && row.text(columns::FULL_NAME).is_none() {
            return Ok(RowOutcome::Blank);
        }

        let draft = match self.field_mapper.map_row(row) {
            Ok(draft) => draft,
            Err(e) => return RowOutcome::reject(e),
        };

        let record = match self.field_validator.validate(draft, rules) {
            Ok(record) => record,
            Err(e) => return RowOutcome::reject(e),
        };

        match self.check_conflicts(&record, index).await? {
            Some(conflict) => RowOutcome::reject(conflict),
            None => Ok(RowOutcome::Accepted(record)),
        }
    }

    /// 重复与引用检查
    ///
    /// # 顺序
    /// 1. NIS 已入库（含软删除）
    /// 2. NIS 已在本批次被接受
    /// 3. NISN 同上
    /// 4. 监护人不存在或已删除
    async fn check_conflicts(
        &self,
        record: &ValidatedStudentRecord,
        index: &BatchKeyIndex,
    ) -> ImporterResult<Option<ImportError>> {
        if self
            .import_repo
            .find_student_by_nis(&record.nis)
            .await?
            .is_some()
        {
            return Ok(Some(ImportError::DuplicateRegistrationId {
                nis: record.nis.clone(),
                in_batch: false,
            }));
        }
        if index.nis_row(&record.nis).is_some() {
            return Ok(Some(ImportError::DuplicateRegistrationId {
                nis: record.nis.clone(),
                in_batch: true,
            }));
        }

        if let Some(nisn) = &record.nisn {
            if self.import_repo.find_student_by_nisn(nisn).await?.is_some() {
                return Ok(Some(ImportError::DuplicateSecondaryId {
                    nisn: nisn.clone(),
                    in_batch: false,
                }));
            }
            if index.nisn_row(nisn).is_some() {
                return Ok(Some(ImportError::DuplicateSecondaryId {
                    nisn: nisn.clone(),
                    in_batch: true,
                }));
            }
        }

        if self
            .import_repo
            .find_guardian_by_id(&record.guardian_id)
            .await?
            .is_none()
        {
            return Ok(Some(ImportError::GuardianNotFound {
                guardian_id: record.guardian_id.clone(),
            }));
        }

        Ok(None)
    }

    /// 整批事务化写入；失败时追加一条 Commit 错误（行号 0），返回 0
    async fn commit(
        &self,
        accepted: Vec<ValidatedStudentRecord>,
        locale: &str,
        errors: &mut Vec<ImportErrorEntry>,
    ) -> usize {
        if accepted.is_empty() {
            debug!("无可写入记录，跳过落库");
            return 0;
        }

        let now = Utc::now();
        let students: Vec<Student> = accepted
            .into_iter()
            .map(|record| Student::from_validated(record, now))
            .collect();
        let count = students.len();

        match self.import_repo.bulk_insert_students(students).await {
            Ok(inserted) => {
                info!(count = inserted, "学生记录写入完成");
                inserted
            }
            Err(e) => {
                error!(count = count, error = %e, "批量写入失败，整批回滚");
                errors.push(ImportError::Commit(e.to_string()).to_entry(0, locale));
                0
            }
        }
    }

    /// 刷新学生列表页（失败只告警）
    async fn revalidate_student_list(&self) {
        match self.config.get_student_list_path().await {
            Ok(path) => revalidation::notify(self.revalidator.as_ref(), &path),
            Err(e) => warn!(error = %e, "读取列表页路径失败，跳过页面失效通知"),
        }
    }
}

fn config_error(err: Box<dyn std::error::Error + Send + Sync>) -> ImportError {
    ImportError::ConfigReadError(err.to_string())
}

/// 汇总文案：计数 + 重复 NIS 提示
fn build_summary(
    locale: &str,
    imported: usize,
    total: usize,
    skipped: usize,
    duplicate_nis: usize,
) -> String {
    let mut summary = t_in(
        locale,
        "import.summary",
        &[
            ("imported", imported.to_string().as_str()),
            ("total", total.to_string().as_str()),
            ("skipped", skipped.to_string().as_str()),
        ],
    );
    if duplicate_nis > 0 {
        summary.push(' ');
        summary.push_str(&t_in(
            locale,
            "import.summary_duplicates",
            &[("count", duplicate_nis.to_string().as_str())],
        ));
    }
    summary
}
