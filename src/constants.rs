// backend
pub const DEFAULT_TF_PATH: &str = "tf";
pub const DEFAULT_TF_ARGS_PREFIX: &[&str] = &["vc"];
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;
pub const RECURSIVE_FLAG: &str = "/recursive";
pub const XML_FORMAT_FLAG: &str = "/format:xml";
pub const COMMENT_FLAG: &str = "/comment:";

// status output
pub const PENDING_CHANGE_TAG: &[u8] = b"PendingChange";
pub const LOCAL_ATTR: &[u8] = b"local";
pub const CHANGE_KIND_ATTR: &[u8] = b"chg";

// config
pub const CONFIG_DIR_NAME: &str = "tfvc-scm";
pub const CONFIG_FILE_NAME: &str = "settings.json";
pub const WORKSPACE_CONFIG_FILE_NAME: &str = ".tfvc-scm.json";

// ui
pub const SPINNER_TICK_MILLIS: u64 = 100;
