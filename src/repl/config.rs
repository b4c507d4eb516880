use std::path::PathBuf;

const HISTORY_FILE: &str = "~/.reckometer_history.txt";

pub fn history_file() -> Option<PathBuf> {
    Some(PathBuf::from(shellexpand::tilde(HISTORY_FILE).as_ref()))
}
