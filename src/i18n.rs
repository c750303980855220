// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）、英文、德文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::Season;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" / "en" / "de"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use merchify_pricing::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use merchify_pricing::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 季节展示名
pub fn season_label(season: Season) -> String {
    t(&format!("season.{}", season.as_key().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("de");
        assert_eq!(current_locale(), "de");

        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(t("common.success"), "操作成功");

        set_locale("en");
        assert_eq!(t("common.success"), "Operation successful");

        set_locale("zh-CN");
    }

    #[test]
    fn test_decision_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("decision.insufficient_sales_data"), "insufficient sales data");
        assert_eq!(t("decision.no_target_defined"), "no target defined");

        set_locale("de");
        assert_eq!(t("decision.insufficient_sales_data"), "unzureichende Verkaufsdaten");

        set_locale("zh-CN");
    }

    #[test]
    fn test_season_label() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("de");
        assert_eq!(season_label(Season::Spring), "Frühling");
        assert_eq!(season_label(Season::Autumn), "Herbst");

        set_locale("zh-CN");
        assert_eq!(season_label(Season::Winter), "冬季");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
        assert!(msg.contains("/tmp/test.csv"));
        assert!(msg.contains("文件不存在"));

        set_locale("en");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
        assert!(msg.contains("File not found"));

        set_locale("zh-CN");
    }
}
