pub const DEFAULT_FILE_NAME: &str = "crutoolrc";
#[cfg(unix)]
pub const USER_FILE_NAME: &str = ".crutoolrc";
#[cfg(not(unix))]
pub const USER_FILE_NAME: &str = "crutool.ini";

pub const USER_CONFIG_ENV: &str = "CRUTOOL_CONFIG";
pub const DEFAULT_CONFIG_ENV: &str = "CRUTOOL_DEFAULT_CONFIG";
