// ==========================================
// 学校管理系统 - 页面缓存失效通知
// ==========================================
// 职责: 定义"页面失效"协作者 trait（依赖倒置）
// 说明: 写操作成功后通知外部渲染层刷新列表页缓存
//       通知失败只记录日志，不影响写操作结果
// ==========================================

use std::error::Error;
use std::sync::Mutex;

/// 页面缓存失效通知者
///
/// # 实现说明
/// - 渲染层（外部）实现此 trait
/// - 单元测试/命令行使用 `NoOpRevalidator` 或 `RecordingRevalidator`
pub trait PageRevalidator: Send + Sync {
    /// 通知指定路径的页面缓存失效
    fn revalidate(&self, path: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 发送失效通知（fire-and-forget，失败只告警）
pub fn notify(revalidator: &dyn PageRevalidator, path: &str) {
    if let Err(e) = revalidator.revalidate(path) {
        tracing::warn!(path = %path, error = %e, "页面缓存失效通知失败");
    }
}

/// 空操作通知者
#[derive(Debug, Clone, Default)]
pub struct NoOpRevalidator;

impl PageRevalidator for NoOpRevalidator {
    fn revalidate(&self, path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(path = %path, "NoOpRevalidator: 跳过页面失效通知");
        Ok(())
    }
}

/// 记录型通知者（内存中保存收到的路径）
#[derive(Debug, Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到的失效路径（按接收顺序）
    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

impl PageRevalidator for RecordingRevalidator {
    fn revalidate(&self, path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut paths = self
            .paths
            .lock()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        paths.push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRevalidator;

    impl PageRevalidator for FailingRevalidator {
        fn revalidate(&self, _path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
            Err("renderer offline".into())
        }
    }

    #[test]
    fn test_recording_revalidator_keeps_order() {
        let revalidator = RecordingRevalidator::new();
        notify(&revalidator, "/dashboard/students");
        notify(&revalidator, "/dashboard/students/abc");
        assert_eq!(
            revalidator.paths(),
            vec!["/dashboard/students", "/dashboard/students/abc"]
        );
    }

    #[test]
    fn test_notify_swallows_failure() {
        // 不应 panic
        notify(&FailingRevalidator, "/dashboard/students");
        notify(&NoOpRevalidator, "/dashboard/students");
    }
}
