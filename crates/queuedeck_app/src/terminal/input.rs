//! Commands typed into the live dashboard.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use queuedeck_core::{Action, JobId, LogStream, Msg, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    Quit,
    Empty,
    /// Could not be understood; carries a hint for the notice line.
    Invalid(String),
}

pub const HELP: &str = "updates [on|off] | debug [on|off] | expand|collapse|toggle <job> | \
job <action> <id> | task <action> <id> | all <action> | logs <task> [stdout|stderr] | \
submit <url> [format] | dl <url> [format] | shutdown | quit";

pub fn parse(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Input::Empty;
    };
    let args: Vec<&str> = words.collect();

    let parsed = match command.to_ascii_lowercase().as_str() {
        "updates" => switch(&args).map(Msg::SetUpdates),
        "debug" => switch(&args).map(Msg::SetDebug),
        "expand" => expansion(&args, Some(true)),
        "collapse" => expansion(&args, Some(false)),
        "toggle" => expansion(&args, None),
        "job" => with_action(&args, "job <action> <id>").map(|(action, id)| Msg::JobAction {
            job_id: JobId::new(id),
            action,
        }),
        "task" => with_action(&args, "task <action> <id>").map(|(action, id)| Msg::TaskAction {
            task_id: TaskId::new(id),
            action,
        }),
        "all" => match args.as_slice() {
            [raw] => action(raw).map(Msg::BulkAction),
            _ => Err("usage: all <action>".to_string()),
        },
        "logs" => logs(&args),
        "submit" => url_and_format(&args, "submit <url> [format]")
            .map(|(url, format)| Msg::SubmitUrl { url, format }),
        "dl" => url_and_format(&args, "dl <url> [format]")
            .map(|(url, format)| Msg::StartDownload { url, format }),
        "shutdown" if args.is_empty() => Ok(Msg::RequestShutdown),
        "quit" | "exit" | "q" => return Input::Quit,
        "help" | "?" => Err(HELP.to_string()),
        other => Err(format!("unknown command '{other}'; type help")),
    };

    match parsed {
        Ok(msg) => Input::Msg(msg),
        Err(hint) => Input::Invalid(hint),
    }
}

fn switch(args: &[&str]) -> Result<Option<bool>, String> {
    match args {
        [] => Ok(None),
        ["on"] => Ok(Some(true)),
        ["off"] => Ok(Some(false)),
        _ => Err("expected on, off or nothing to toggle".to_string()),
    }
}

fn expansion(args: &[&str], expanded: Option<bool>) -> Result<Msg, String> {
    match args {
        [id] => Ok(Msg::SetExpanded {
            job_id: JobId::new(*id),
            expanded,
        }),
        _ => Err("expected a job id".to_string()),
    }
}

fn action(raw: &str) -> Result<Action, String> {
    Action::parse(raw).ok_or_else(|| format!("unknown action '{raw}'"))
}

fn with_action<'a>(args: &[&'a str], usage: &str) -> Result<(Action, &'a str), String> {
    match args {
        [raw, id] => Ok((action(raw)?, *id)),
        _ => Err(format!("usage: {usage}")),
    }
}

fn logs(args: &[&str]) -> Result<Msg, String> {
    let (id, stream) = match args {
        [id] => (*id, LogStream::Stdout),
        [id, raw] => (
            *id,
            LogStream::parse(raw).ok_or_else(|| format!("unknown stream '{raw}'"))?,
        ),
        _ => return Err("usage: logs <task> [stdout|stderr]".to_string()),
    };
    Ok(Msg::OpenTaskLog {
        task_id: TaskId::new(id),
        stream,
    })
}

fn url_and_format(args: &[&str], usage: &str) -> Result<(String, Option<String>), String> {
    match args {
        [url] => Ok((url.to_string(), None)),
        [url, format] => Ok((url.to_string(), Some(format.to_string()))),
        _ => Err(format!("usage: {usage}")),
    }
}

/// The command line being edited at the bottom of the dashboard.
#[derive(Debug, Default)]
pub struct Prompt {
    line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Edited,
    Submitted(Input),
    Scroll(i16),
    Quit,
    Ignored,
}

impl Prompt {
    pub fn text(&self) -> &str {
        &self.line
    }

    pub fn handle(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Ignored;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => KeyOutcome::Quit,
                KeyCode::Char('u') => {
                    self.line.clear();
                    KeyOutcome::Edited
                }
                _ => KeyOutcome::Ignored,
            };
        }
        match key.code {
            KeyCode::Char(c) => {
                self.line.push(c);
                KeyOutcome::Edited
            }
            KeyCode::Backspace => match self.line.pop() {
                Some(_) => KeyOutcome::Edited,
                None => KeyOutcome::Ignored,
            },
            KeyCode::Esc => {
                self.line.clear();
                KeyOutcome::Edited
            }
            KeyCode::Enter => KeyOutcome::Submitted(parse(&std::mem::take(&mut self.line))),
            KeyCode::Up => KeyOutcome::Scroll(-1),
            KeyCode::Down => KeyOutcome::Scroll(1),
            KeyCode::PageUp => KeyOutcome::Scroll(-10),
            KeyCode::PageDown => KeyOutcome::Scroll(10),
            _ => KeyOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_line(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            assert_eq!(prompt.handle(key(KeyCode::Char(c))), KeyOutcome::Edited);
        }
    }

    #[test]
    fn enter_submits_the_typed_line_and_clears_it() {
        let mut prompt = Prompt::default();
        type_line(&mut prompt, "all pausx");
        prompt.handle(key(KeyCode::Backspace));
        type_line(&mut prompt, "e");
        assert_eq!(prompt.text(), "all pause");
        assert_eq!(
            prompt.handle(key(KeyCode::Enter)),
            KeyOutcome::Submitted(Input::Msg(Msg::BulkAction(Action::Pause)))
        );
        assert_eq!(prompt.text(), "");
        assert_eq!(
            prompt.handle(key(KeyCode::Enter)),
            KeyOutcome::Submitted(Input::Empty)
        );
    }

    #[test]
    fn control_keys_quit_or_clear() {
        let mut prompt = Prompt::default();
        type_line(&mut prompt, "debug");
        assert_eq!(
            prompt.handle(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            KeyOutcome::Edited
        );
        assert_eq!(prompt.text(), "");
        assert_eq!(prompt.handle(key(KeyCode::Backspace)), KeyOutcome::Ignored);
        assert_eq!(
            prompt.handle(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyOutcome::Quit
        );
    }

    #[test]
    fn arrows_scroll_and_releases_are_ignored() {
        let mut prompt = Prompt::default();
        assert_eq!(prompt.handle(key(KeyCode::PageDown)), KeyOutcome::Scroll(10));
        assert_eq!(prompt.handle(key(KeyCode::Up)), KeyOutcome::Scroll(-1));
        let mut release = key(KeyCode::Char('x'));
        release.kind = KeyEventKind::Release;
        assert_eq!(prompt.handle(release), KeyOutcome::Ignored);
        assert_eq!(prompt.text(), "");
    }

    #[test]
    fn toggles_accept_explicit_and_implicit_values() {
        assert_eq!(parse("updates"), Input::Msg(Msg::SetUpdates(None)));
        assert_eq!(parse("updates off"), Input::Msg(Msg::SetUpdates(Some(false))));
        assert_eq!(parse("DEBUG on"), Input::Msg(Msg::SetDebug(Some(true))));
        assert!(matches!(parse("debug maybe"), Input::Invalid(_)));
    }

    #[test]
    fn entity_actions_parse_action_names() {
        assert_eq!(
            parse("job Pause job-7"),
            Input::Msg(Msg::JobAction {
                job_id: JobId::new("job-7"),
                action: Action::Pause,
            })
        );
        assert_eq!(
            parse("task retry t-2"),
            Input::Msg(Msg::TaskAction {
                task_id: TaskId::new("t-2"),
                action: Action::Retry,
            })
        );
        assert_eq!(parse("all delete"), Input::Msg(Msg::BulkAction(Action::Delete)));
        assert_eq!(
            parse("job explode job-7"),
            Input::Invalid("unknown action 'explode'".into())
        );
    }

    #[test]
    fn expansion_commands_carry_intent() {
        assert_eq!(
            parse("toggle a"),
            Input::Msg(Msg::SetExpanded {
                job_id: JobId::new("a"),
                expanded: None,
            })
        );
        assert_eq!(
            parse("collapse a"),
            Input::Msg(Msg::SetExpanded {
                job_id: JobId::new("a"),
                expanded: Some(false),
            })
        );
    }

    #[test]
    fn logs_default_to_stdout() {
        assert_eq!(
            parse("logs t-1"),
            Input::Msg(Msg::OpenTaskLog {
                task_id: TaskId::new("t-1"),
                stream: LogStream::Stdout,
            })
        );
        assert_eq!(
            parse("logs t-1 err"),
            Input::Msg(Msg::OpenTaskLog {
                task_id: TaskId::new("t-1"),
                stream: LogStream::Stderr,
            })
        );
    }

    #[test]
    fn submissions_take_an_optional_format() {
        assert_eq!(
            parse("submit https://video.example/watch?v=1"),
            Input::Msg(Msg::SubmitUrl {
                url: "https://video.example/watch?v=1".into(),
                format: None,
            })
        );
        assert_eq!(
            parse("dl https://video.example/watch?v=1 flac"),
            Input::Msg(Msg::StartDownload {
                url: "https://video.example/watch?v=1".into(),
                format: Some("flac".into()),
            })
        );
    }

    #[test]
    fn blank_quit_and_unknown_lines() {
        assert_eq!(parse("   "), Input::Empty);
        assert_eq!(parse("quit"), Input::Quit);
        assert_eq!(parse("shutdown"), Input::Msg(Msg::RequestShutdown));
        assert!(matches!(parse("frobnicate"), Input::Invalid(_)));
    }
}
