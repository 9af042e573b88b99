#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    use crate::config::constants::{DEFAULT_CONFIG_ENV, USER_CONFIG_ENV, USER_FILE_NAME};
    use crate::config::environment::{env_path, env_string};
    use crate::config::{ConfigError, ConfigPaths, ConfigStore, TemplateError};

    fn env_lock<'a>() -> std::sync::MutexGuard<'a, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(vars: &[(&str, Option<&str>)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
                .collect::<Vec<_>>();
            for (key, value) in vars {
                match value {
                    Some(val) => unsafe { std::env::set_var(key, val) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(val) => unsafe { std::env::set_var(key, val) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
        }
    }

    fn paths_in(dir: &Path) -> ConfigPaths {
        ConfigPaths::new(Some(dir.join("crutoolrc")), dir.join("user.ini"))
    }

    fn write_defaults(dir: &Path, contents: &str) {
        std::fs::write(dir.join("crutoolrc"), contents).unwrap();
    }

    #[test]
    fn missing_files_yield_empty_tiers() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::open(paths_in(temp.path())).unwrap();

        assert_eq!(store.get("jira", "user"), None);
        assert!(store.sections().is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn set_then_get_returns_original_literal() {
        let temp = TempDir::new().unwrap();
        let mut store = ConfigStore::open(paths_in(temp.path())).unwrap();

        let values = [
            "alice",
            "",
            "line one\nline two\n",
            "say \"hi\" and 'bye'",
            "C:\\path\\to\\file \\n not a newline",
            "  padded  ",
            "tab\tand\u{1}control",
            "\u{a0}padded\u{3000}",
            "\u{2028}x\u{85}",
        ];

        for (idx, value) in values.iter().enumerate() {
            let key = format!("key{idx}");
            store.set("roundtrip", &key, value).unwrap();
            assert_eq!(store.get("roundtrip", &key).as_deref(), Some(*value));
        }

        store.save().unwrap();
        let reloaded = ConfigStore::open(paths_in(temp.path())).unwrap();
        for (idx, value) in values.iter().enumerate() {
            let key = format!("key{idx}");
            assert_eq!(reloaded.get("roundtrip", &key).as_deref(), Some(*value));
        }
    }

    #[test]
    fn set_rejects_names_the_user_file_cannot_hold() {
        let temp = TempDir::new().unwrap();
        let mut store = ConfigStore::open(paths_in(temp.path())).unwrap();

        let bad_names = [
            ("jira", "a=b"),
            ("jira", "a:b"),
            ("jira", "[x"),
            ("jira", "#note"),
            ("jira", ";note"),
            ("jira", "line\nbreak"),
            ("jira", " user"),
            ("jira", ""),
            ("a]b", "user"),
            ("[jira", "user"),
            ("ji\nra", "user"),
            ("jira ", "user"),
            ("", "user"),
        ];
        for (section, key) in bad_names {
            let err = store.set(section, key, "value").unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidName { .. }),
                "[{section}] {key:?} gave {err}"
            );
        }
        assert!(!store.is_dirty());

        store.set("jira", "user", "alice").unwrap();
        store.set("jira", "dotted.key-name", "ok").unwrap();
        store.save().unwrap();

        let reloaded = ConfigStore::open(paths_in(temp.path())).unwrap();
        assert_eq!(reloaded.get("jira", "user").as_deref(), Some("alice"));
        assert_eq!(reloaded.get("jira", "dotted.key-name").as_deref(), Some("ok"));
        assert_eq!(reloaded.sections(), vec!["jira".to_string()]);
    }

    #[test]
    fn user_tier_shadows_defaults() {
        let temp = TempDir::new().unwrap();
        write_defaults(
            temp.path(),
            "[jira]\nurl = https://jira.example.com\nuser = nobody\n",
        );
        let mut store = ConfigStore::open(paths_in(temp.path())).unwrap();

        assert_eq!(store.get("jira", "user").as_deref(), Some("nobody"));

        store.set("jira", "user", "alice").unwrap();
        assert_eq!(store.get("jira", "user").as_deref(), Some("alice"));

        store.set("jira", "url", "").unwrap();
        assert_eq!(store.get("jira", "url").as_deref(), Some(""));
    }

    #[test]
    fn absent_values_fall_back_or_error() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::open(paths_in(temp.path())).unwrap();

        assert_eq!(store.get("jira", "password"), None);
        assert_eq!(store.get_or("jira", "password", "fallback"), "fallback");

        let err = store.require("jira", "password").unwrap_err();
        match err {
            ConfigError::Missing { section, key } => {
                assert_eq!(section, "jira");
                assert_eq!(key, "password");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn save_without_changes_does_not_write() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(temp.path());

        let mut store = ConfigStore::open(paths.clone()).unwrap();
        assert!(!store.save().unwrap());
        assert!(!paths.user_file().exists());

        std::fs::write(paths.user_file(), "[jira]\nuser = alice\n").unwrap();
        let mut store = ConfigStore::open(paths.clone()).unwrap();
        std::fs::write(paths.user_file(), "[jira]\nuser = edited elsewhere\n").unwrap();

        assert!(!store.save().unwrap());
        let on_disk = std::fs::read_to_string(paths.user_file()).unwrap();
        assert_eq!(on_disk, "[jira]\nuser = edited elsewhere\n");
    }

    #[test]
    fn save_when_dirty_writes_once_and_clears_flag() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(temp.path());
        let mut store = ConfigStore::open(paths.clone()).unwrap();

        store.set("jira", "user", "alice").unwrap();
        assert!(store.is_dirty());
        assert!(store.save().unwrap());
        assert!(!store.is_dirty());

        std::fs::write(paths.user_file(), "[jira]\nuser = replaced\n").unwrap();
        assert!(!store.save().unwrap());
        let on_disk = std::fs::read_to_string(paths.user_file()).unwrap();
        assert_eq!(on_disk, "[jira]\nuser = replaced\n");
    }

    #[test]
    fn round_trip_through_a_fresh_store() {
        let temp = TempDir::new().unwrap();
        let mut store = ConfigStore::open(paths_in(temp.path())).unwrap();
        store.set("jira", "user", "alice").unwrap();
        store.save().unwrap();

        let mut fresh = ConfigStore::new(paths_in(temp.path()));
        assert_eq!(fresh.get("jira", "user"), None);
        fresh.load().unwrap();
        assert_eq!(fresh.get("jira", "user").as_deref(), Some("alice"));
    }

    #[test]
    fn save_preserves_comments_and_creates_directories() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("nested").join("dir");
        let paths = ConfigPaths::new(None, nested.join("user.ini"));

        let mut store = ConfigStore::open(paths.clone()).unwrap();
        store.set("jira", "user", "alice").unwrap();
        store.save().unwrap();

        let original = "# my settings\n[jira]\n; who am i\nuser = alice\n";
        std::fs::write(paths.user_file(), original).unwrap();
        let mut store = ConfigStore::open(paths.clone()).unwrap();
        store.set("jira", "password", "hunter2").unwrap();
        store.save().unwrap();

        let on_disk = std::fs::read_to_string(paths.user_file()).unwrap();
        assert_eq!(
            on_disk,
            "# my settings\n[jira]\n; who am i\nuser = alice\npassword = hunter2\n"
        );
    }

    #[test]
    fn reload_discards_unsaved_edits() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(temp.path());
        std::fs::write(paths.user_file(), "[jira]\nuser = alice\n").unwrap();

        let mut store = ConfigStore::open(paths).unwrap();
        store.set("jira", "user", "mallory").unwrap();
        store.load().unwrap();

        assert!(!store.is_dirty());
        assert_eq!(store.get("jira", "user").as_deref(), Some("alice"));
    }

    #[test]
    fn format_fills_named_placeholders() {
        let temp = TempDir::new().unwrap();
        write_defaults(temp.path(), "[msg]\ngreet = Hello, {name}!\n");
        let store = ConfigStore::open(paths_in(temp.path())).unwrap();

        let data = HashMap::from([("name", "Bob".to_string())]);
        assert_eq!(store.format("msg", "greet", &data).unwrap(), "Hello, Bob!");

        let err = store.format("msg", "greet", &HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Template(TemplateError::MissingKey(ref name)) if name == "name"
        ));

        assert_eq!(store.format("msg", "absent", &data).unwrap(), "");
    }

    #[test]
    fn malformed_files_report_path_and_line() {
        let temp = TempDir::new().unwrap();
        write_defaults(temp.path(), "[jira]\nthis line is broken\n");

        let err = ConfigStore::open(paths_in(temp.path())).unwrap_err();
        match err {
            ConfigError::Parse { path, line, .. } => {
                assert_eq!(path, temp.path().join("crutoolrc"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sections_and_entries_merge_both_tiers() {
        let temp = TempDir::new().unwrap();
        write_defaults(
            temp.path(),
            "[jira]\nurl = https://jira.example.com\nuser = nobody\n[templates]\nline = {key}\n",
        );
        let mut store = ConfigStore::open(paths_in(temp.path())).unwrap();
        store.set("jira", "user", "alice").unwrap();
        store.set("extra", "note", "multi\nline").unwrap();

        assert_eq!(store.sections(), vec!["jira", "templates", "extra"]);
        assert_eq!(
            store.entries("jira"),
            vec![
                ("url".to_string(), "https://jira.example.com".to_string()),
                ("user".to_string(), "alice".to_string()),
            ]
        );
        assert_eq!(
            store.entries("extra"),
            vec![("note".to_string(), "multi\nline".to_string())]
        );
    }

    #[test]
    fn resolve_uses_home_directory() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();

        let _env = EnvGuard::new(&[
            ("HOME", Some(home.as_str())),
            (USER_CONFIG_ENV, None),
            (DEFAULT_CONFIG_ENV, None),
        ]);

        let paths = ConfigPaths::resolve().unwrap();
        assert_eq!(paths.user_file(), temp_home.path().join(USER_FILE_NAME));
        assert_eq!(
            paths.default_file().and_then(|p| p.file_name()),
            Some(std::ffi::OsStr::new("crutoolrc"))
        );
    }

    #[test]
    fn resolve_prefers_env_overrides() {
        let _lock = env_lock();
        let temp = TempDir::new().unwrap();
        let user = temp.path().join("custom-user.ini");
        let defaults = temp.path().join("custom-defaults.ini");

        let _env = EnvGuard::new(&[
            (USER_CONFIG_ENV, Some(user.to_str().unwrap())),
            (DEFAULT_CONFIG_ENV, Some(defaults.to_str().unwrap())),
        ]);

        let paths = ConfigPaths::resolve().unwrap();
        assert_eq!(paths.user_file(), user.as_path());
        assert_eq!(paths.default_file(), Some(defaults.as_path()));
    }

    #[test]
    fn test_env_string() {
        let _lock = env_lock();
        let _env = EnvGuard::new(&[("CRUTOOL_TEST_VAR", Some("test_value"))]);

        assert_eq!(
            env_string("CRUTOOL_TEST_VAR").unwrap(),
            Some("test_value".to_string())
        );
        assert_eq!(env_string("CRUTOOL_NONEXISTENT_VAR").unwrap(), None);
    }

    #[test]
    fn test_env_path_ignores_blank_values() {
        let _lock = env_lock();
        let _env = EnvGuard::new(&[("CRUTOOL_TEST_PATH", Some("   "))]);

        assert_eq!(env_path("CRUTOOL_TEST_PATH").unwrap(), None);
    }
}
