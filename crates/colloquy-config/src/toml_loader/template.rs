//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Colloquy Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# The API key is read from GEMINI_API_KEY (or GOOGLE_API_KEY), never from this file.

[model]
# model = "gemini-2.5-flash"
# max_tokens = 4096            # 1-65536
# temperature = 0.7            # 0.0-2.0
# request_timeout_secs = 120   # 5-600

[agent]
# system_prompt = "You are a highly qualified programming expert. ..."
# max_tool_rounds = 10         # 1-100, tool round-trips per user turn
# title_max_chars = 50         # 10-200

[sandbox]
# interpreter = "python3"      # python3, python, node, ruby, lua, bash, sh
# interpreter_args = ["-I"]
# timeout_secs = 10            # 1-300
# max_output_bytes = 16384     # 1024-1048576

[storage]
# database = "/path/to/conversations.db"

[logging]
# level = "info"               # trace, debug, info, warn, error
"##
    .to_string()
}
