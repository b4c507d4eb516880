use rustyline::{completion::Pair, Context};

const COMMANDS: &[&str] = &[
    "account",
    "add",
    "connect",
    "disconnect",
    "exit",
    "help",
    "network",
    "projects",
    "quit",
    "refresh",
    "show",
    "total",
    "vote",
];

pub(crate) struct MyCompleter {
    endpoints: Vec<String>,
}

impl MyCompleter {
    pub fn new(endpoints: Vec<String>) -> Self {
        MyCompleter { endpoints }
    }
}

fn get_current_word(line: &str, pos: usize) -> &str {
    let start = line[..pos].rfind(' ').map_or(0, |i| i + 1);
    &line[start..pos]
}

impl rustyline::completion::Completer for MyCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let current_word = get_current_word(line, pos);

        let candidates: Vec<String> = if !line[..pos].trim_start().contains(' ') {
            COMMANDS.iter().map(|c| c.to_string()).collect()
        } else if line.trim_start().starts_with("network ") {
            self.endpoints.clone()
        } else {
            Vec::new()
        };

        let matches = candidates
            .into_iter()
            .filter(|c| c.starts_with(current_word))
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Ok((pos - current_word.len(), matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_current_word() {
        assert_eq!(get_current_word("vote 1", 6), "1");
        assert_eq!(get_current_word("pro", 3), "pro");
        assert_eq!(get_current_word("network te", 10), "te");
        assert_eq!(get_current_word("", 0), "");
    }
}
