use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::prompts::{DEFAULT_BATCH_TICKET_PROMPT, DEFAULT_SINGLE_TICKET_PROMPT};

/// Configuration from config.toml (or config.yaml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Root directory holding one subdirectory per column.
    /// Default: `.kanban` under the current directory
    #[serde(default, alias = "kanban_dir")]
    pub board_dir: PathBuf,
    /// External editor command. Default: `$EDITOR`, then `vi`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnConfig>,
    /// Template for the prompt copied with `p`
    #[serde(default = "default_single_ticket_prompt")]
    pub single_ticket_prompt: String,
    /// Template for the prompt copied with `P`
    #[serde(default = "default_batch_ticket_prompt")]
    pub batch_ticket_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Display name
    pub name: String,
    /// Directory name beneath the board directory
    pub dir: String,
    /// Hex color like `#f87171`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Quiet period before a burst of changes to one file is reported
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        WatcherConfig {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_single_ticket_prompt() -> String {
    DEFAULT_SINGLE_TICKET_PROMPT.to_string()
}

fn default_batch_ticket_prompt() -> String {
    DEFAULT_BATCH_TICKET_PROMPT.to_string()
}

pub fn default_columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig::new("To Do", "todo", Some("#f87171")),
        ColumnConfig::new("Doing", "doing", Some("#fbbf24")),
        ColumnConfig::new("Done", "done", Some("#4ade80")),
    ]
}

impl ColumnConfig {
    pub fn new(name: &str, dir: &str, color: Option<&str>) -> Self {
        ColumnConfig {
            name: name.to_string(),
            dir: dir.to_string(),
            color: color.map(str::to_string),
        }
    }
}

impl BoardConfig {
    /// Defaults rooted at `board_dir`.
    pub fn with_board_dir(board_dir: PathBuf) -> Self {
        BoardConfig {
            board_dir,
            editor: None,
            watcher: WatcherConfig::default(),
            columns: default_columns(),
            single_ticket_prompt: default_single_ticket_prompt(),
            batch_ticket_prompt: default_batch_ticket_prompt(),
        }
    }

    /// Replace blank values with defaults.
    pub fn fill_defaults(&mut self) {
        if self.columns.is_empty() {
            self.columns = default_columns();
        }
        if self.single_ticket_prompt.trim().is_empty() {
            self.single_ticket_prompt = default_single_ticket_prompt();
        }
        if self.batch_ticket_prompt.trim().is_empty() {
            self.batch_ticket_prompt = default_batch_ticket_prompt();
        }
    }

    /// Full path of a column directory.
    pub fn column_path(&self, dir: &str) -> PathBuf {
        self.board_dir.join(dir)
    }

    /// Index of the column backed by `dir`.
    pub fn column_index(&self, dir: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.dir == dir)
    }

    /// Editor command, falling back to `$EDITOR` and then `vi`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.watcher.debounce_ms)
    }

    /// Column agents move a ticket into while working on it: `doing` if
    /// configured, otherwise the second column.
    pub fn doing_column(&self) -> Option<&ColumnConfig> {
        self.columns
            .iter()
            .find(|c| c.dir == "doing")
            .or_else(|| self.columns.get(1))
            .or_else(|| self.columns.last())
    }

    /// Column finished tickets go to: `done` if configured, otherwise the last.
    pub fn done_column(&self) -> Option<&ColumnConfig> {
        self.columns
            .iter()
            .find(|c| c.dir == "done")
            .or_else(|| self.columns.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_gets_defaults() {
        let config: BoardConfig = toml::from_str("board_dir = \"/tmp/b\"\n").unwrap();
        assert_eq!(config.board_dir, PathBuf::from("/tmp/b"));
        assert_eq!(config.columns, default_columns());
        assert_eq!(config.watcher.debounce_ms, 150);
        assert_eq!(config.editor, None);
    }

    #[test]
    fn columns_and_unknown_keys() {
        let text = r##"
theme = "ignored"

[watcher]
debounce_ms = 300

[[columns]]
name = "Backlog"
dir = "backlog"

[[columns]]
name = "Shipped"
dir = "shipped"
color = "#00ff00"
"##;
        let config: BoardConfig = toml::from_str(text).unwrap();
        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.columns[0].color, None);
        assert_eq!(config.columns[1].color.as_deref(), Some("#00ff00"));
        assert_eq!(config.column_index("shipped"), Some(1));
        assert_eq!(config.debounce().as_millis(), 300);
    }

    #[test]
    fn prompt_templates_default_and_override() {
        let config: BoardConfig = toml::from_str("").unwrap();
        assert_eq!(config.single_ticket_prompt, DEFAULT_SINGLE_TICKET_PROMPT);
        assert_eq!(config.batch_ticket_prompt, DEFAULT_BATCH_TICKET_PROMPT);

        let mut config: BoardConfig =
            toml::from_str("single_ticket_prompt = \"do {{.Title}}\"\nbatch_ticket_prompt = \"\"\n")
                .unwrap();
        config.fill_defaults();
        assert_eq!(config.single_ticket_prompt, "do {{.Title}}");
        assert_eq!(config.batch_ticket_prompt, DEFAULT_BATCH_TICKET_PROMPT);
    }

    #[test]
    fn kanban_dir_is_an_alias_for_board_dir() {
        let config: BoardConfig = serde_yaml::from_str("kanban_dir: /tmp/k\n").unwrap();
        assert_eq!(config.board_dir, PathBuf::from("/tmp/k"));
    }

    #[test]
    fn doing_and_done_columns() {
        let mut config = BoardConfig::with_board_dir(PathBuf::from("/x"));
        assert_eq!(config.doing_column().unwrap().dir, "doing");
        assert_eq!(config.done_column().unwrap().dir, "done");

        config.columns = vec![
            ColumnConfig::new("Backlog", "backlog", None),
            ColumnConfig::new("Active", "active", None),
            ColumnConfig::new("Shipped", "shipped", None),
        ];
        assert_eq!(config.doing_column().unwrap().dir, "active");
        assert_eq!(config.done_column().unwrap().dir, "shipped");
    }

    #[test]
    fn column_path_joins_board_dir() {
        let config = BoardConfig::with_board_dir(PathBuf::from("/x/.kanban"));
        assert_eq!(config.column_path("todo"), PathBuf::from("/x/.kanban/todo"));
    }
}
