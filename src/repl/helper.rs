use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use rustyline::{
    highlight::Highlighter, hint::HistoryHinter, history::FileHistory, validate::Validator,
    Completer, Config, Editor, Helper, Hinter,
};

use crate::repl::completer::MyCompleter;

#[derive(Helper, Completer, Hinter)]
pub(crate) struct MyHelper {
    #[rustyline(Completer)]
    completer: MyCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    colored_prompt: String,
}

impl MyHelper {
    pub fn new(endpoints: Vec<String>) -> Self {
        MyHelper {
            completer: MyCompleter::new(endpoints),
            hinter: HistoryHinter::new(),
            colored_prompt: "reck> ".to_owned(),
        }
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.colored_prompt = prompt.to_owned();
    }
}

impl Validator for MyHelper {}

impl Highlighter for MyHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Borrowed(&self.colored_prompt)
        } else {
            Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned("\x1b[1m".to_owned() + hint + "\x1b[m")
    }
}

pub(crate) fn create_editor(endpoints: Vec<String>) -> Result<Editor<MyHelper, FileHistory>> {
    let config = Config::builder()
        .completion_type(rustyline::CompletionType::List)
        .auto_add_history(true)
        .build();
    let helper = MyHelper::new(endpoints);
    let mut rl: Editor<MyHelper, FileHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    Ok(rl)
}
