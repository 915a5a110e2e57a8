// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认/回退）和印尼文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言列表
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "id"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（不支持的语言代码会被忽略）
///
/// # 参数
/// - locale: 语言代码（"en" 或 "id"）
pub fn set_locale(locale: &str) {
    if SUPPORTED_LOCALES.contains(&locale) {
        rust_i18n::set_locale(locale);
    } else {
        tracing::warn!(locale = %locale, "不支持的语言，保持当前设置");
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use school_admin::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use school_admin::i18n::t_with_args;
/// let msg = t_with_args("import.missing_columns", &[("columns", "Address")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    interpolate(rust_i18n::t!(key).to_string(), args)
}

/// 按指定语言翻译（不修改全局语言设置）
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    interpolate(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn interpolate(mut result: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // 全局 locale 在测试间共享，这里只使用 t_in 指定语言，不做 set_locale

    #[test]
    fn test_translate_in_locale() {
        assert_eq!(t_in("en", "common.success", &[]), "Operation successful");
        assert_eq!(t_in("id", "common.success", &[]), "Operasi berhasil");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_in("en", "import.missing_columns", &[("columns", "Address, NIS")]);
        assert!(msg.contains("Address, NIS"));
        assert!(msg.contains("Missing required columns"));

        let msg = t_in("id", "import.missing_columns", &[("columns", "Address")]);
        assert!(msg.contains("Address"));
        assert!(msg.contains("Kolom wajib"));
    }

    #[test]
    fn test_empty_file_message_mentions_empty() {
        assert!(t_in("en", "import.empty_file", &[]).contains("empty"));
    }
}
