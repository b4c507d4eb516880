use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    Account,
    Projects { filter: Option<String> },
    Show { project_id: u64 },
    Total,
    Add { name: String, description: String },
    Vote { project_id: u64 },
    Refresh,
    Network { endpoint: Option<String> },
    Help,
    Quit,
}

/// Splits on whitespace, honoring double-quoted segments so project names
/// and descriptions can contain spaces.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        bail!("unterminated quote");
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_command(line: &str) -> Result<Command> {
    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        bail!("empty command");
    };
    match (head.as_str(), rest) {
        ("connect", []) => Ok(Command::Connect),
        ("disconnect", []) => Ok(Command::Disconnect),
        ("account", []) => Ok(Command::Account),
        ("projects", []) => Ok(Command::Projects { filter: None }),
        ("projects", filter) => Ok(Command::Projects {
            filter: Some(filter.join(" ")),
        }),
        ("show", [id]) => Ok(Command::Show {
            project_id: parse_id(id)?,
        }),
        ("show", _) => bail!("usage: show <project-id>"),
        ("total", []) => Ok(Command::Total),
        ("add", [name, description @ ..]) if !description.is_empty() => Ok(Command::Add {
            name: name.clone(),
            description: description.join(" "),
        }),
        ("add", _) => bail!("usage: add <name> <description>"),
        ("vote", [id]) => Ok(Command::Vote {
            project_id: parse_id(id)?,
        }),
        ("vote", _) => bail!("usage: vote <project-id>"),
        ("refresh", []) => Ok(Command::Refresh),
        ("network", []) => Ok(Command::Network { endpoint: None }),
        ("network", [name]) => Ok(Command::Network {
            endpoint: Some(name.clone()),
        }),
        ("network", _) => bail!("usage: network [<endpoint-name>]"),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        (other, _) => bail!("unknown command: {} (try `help`)", other),
    }
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| anyhow!("project id must be a positive integer, got {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("vote 3").unwrap(), vec!["vote", "3"]);
        assert_eq!(
            tokenize("add \"My Project\" a thing").unwrap(),
            vec!["add", "My Project", "a", "thing"]
        );
        assert!(tokenize("add \"unterminated").is_err());
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("connect").unwrap(), Command::Connect);
        assert_eq!(parse_command("refresh").unwrap(), Command::Refresh);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
        assert!(parse_command("connect now").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_parse_projects_filter() {
        assert_eq!(
            parse_command("projects").unwrap(),
            Command::Projects { filter: None }
        );
        assert_eq!(
            parse_command("projects swap router").unwrap(),
            Command::Projects {
                filter: Some("swap router".to_string())
            }
        );
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse_command("add \"My Project\" does useful things").unwrap(),
            Command::Add {
                name: "My Project".to_string(),
                description: "does useful things".to_string()
            }
        );
        assert!(parse_command("add OnlyName").is_err());
    }

    #[test]
    fn test_parse_vote() {
        assert_eq!(
            parse_command("vote 12").unwrap(),
            Command::Vote { project_id: 12 }
        );
        assert!(parse_command("vote twelve").is_err());
        assert!(parse_command("vote").is_err());
    }
}
