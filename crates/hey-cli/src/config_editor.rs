use anyhow::Result;
use hey_core::{constants::endpoints, AppPaths, Settings};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;

use crate::theme::Theme;

/// Source of answers for the editor. `None` means the user aborted.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads from the terminal with line editing.
pub struct TerminalInput {
    editor: DefaultEditor,
}

impl TerminalInput {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Canned answers, for driving the editor without a terminal.
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Result of an editing session.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Save(Settings),
    Discard,
    Aborted,
}

/// `hey config`: show, edit and optionally save the configuration file.
pub fn run_config(paths: &AppPaths) -> Result<u8> {
    let theme = Theme::detect();
    let current = Settings::load(paths);

    println!("{}", theme.accent(&format!("Config file: {}", paths.config_path().display())));
    print!("{}", describe(&current));

    let mut input = TerminalInput::new()?;
    match edit_settings(current, &mut input, &theme)? {
        EditOutcome::Save(settings) => {
            settings.save(paths)?;
            println!("{}", theme.success("Configuration saved."));
        }
        EditOutcome::Discard => println!("{}", theme.muted("Changes discarded.")),
        EditOutcome::Aborted => println!("{}", theme.muted("Aborted.")),
    }
    Ok(crate::commands::exit::OK)
}

/// Current values, one per line.
pub fn describe(settings: &Settings) -> String {
    let unset = "(not set)";
    format!(
        "  tos:         {}\n  model:       {}\n  prompt:      {}\n  proxy:       {}\n  socks_proxy: {}\n  timeout:     {}s\n",
        if settings.tos { "accepted" } else { "not accepted" },
        settings.model,
        settings.prompt.as_deref().unwrap_or(unset),
        settings.proxy.as_deref().unwrap_or(unset),
        settings.socks_proxy.as_deref().unwrap_or(unset),
        settings.timeout_secs,
    )
}

/// Walk through each setting. The optional fields are only touched after a
/// yes to their default-no question, so pressing Enter throughout changes
/// nothing. Once inside, a blank answer clears the field.
pub fn edit_settings(
    mut settings: Settings,
    input: &mut dyn LineSource,
    theme: &Theme,
) -> Result<EditOutcome> {
    if !settings.tos {
        println!("DuckDuckGo AI Chat terms of use: {}", endpoints::TERMS_URL);
        let Some(accepted) = ask_yes_no(input, "Accept the terms? [y/N] ", false)? else {
            return Ok(EditOutcome::Aborted);
        };
        settings.tos = accepted;
    }

    let Some(model) = input.read_line(&format!("Model [{}]: ", settings.model))? else {
        return Ok(EditOutcome::Aborted);
    };
    let model = model.trim();
    if !model.is_empty() {
        settings.model = model.to_string();
    }

    let question = format!(
        "Set a new system prompt? (current: {}) [y/N] ",
        shown(&settings.prompt)
    );
    match ask_yes_no(input, &question, false)? {
        None => return Ok(EditOutcome::Aborted),
        Some(false) => {}
        Some(true) => {
            let Some(prompt) = input.read_line("System prompt (blank to clear): ")? else {
                return Ok(EditOutcome::Aborted);
            };
            settings.prompt = non_blank(&prompt);
        }
    }

    let question = format!(
        "Configure HTTP proxy? (current: {}) [y/N] ",
        shown(&settings.proxy)
    );
    match ask_yes_no(input, &question, false)? {
        None => return Ok(EditOutcome::Aborted),
        Some(false) => {}
        Some(true) => {
            let prompt = "HTTP proxy, e.g. http://proxy:8080 (blank to clear): ";
            let Some(proxy) = ask_proxy(input, theme, prompt, false)? else {
                return Ok(EditOutcome::Aborted);
            };
            settings.proxy = proxy;
        }
    }

    let question = format!(
        "Configure SOCKS proxy? (current: {}) [y/N] ",
        shown(&settings.socks_proxy)
    );
    match ask_yes_no(input, &question, false)? {
        None => return Ok(EditOutcome::Aborted),
        Some(false) => {}
        Some(true) => {
            let prompt = "SOCKS proxy, e.g. socks5://127.0.0.1:1080 (blank to clear): ";
            let Some(socks) = ask_proxy(input, theme, prompt, true)? else {
                return Ok(EditOutcome::Aborted);
            };
            settings.socks_proxy = socks;
        }
    }

    match ask_yes_no(input, "Save? [Y/n] ", true)? {
        Some(true) => Ok(EditOutcome::Save(settings)),
        Some(false) => Ok(EditOutcome::Discard),
        None => Ok(EditOutcome::Aborted),
    }
}

fn shown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("not set")
}

fn non_blank(line: &str) -> Option<String> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Re-asks until the answer is blank or a valid proxy URL.
fn ask_proxy(
    input: &mut dyn LineSource,
    theme: &Theme,
    prompt: &str,
    allow_socks: bool,
) -> Result<Option<Option<String>>> {
    loop {
        let Some(line) = input.read_line(prompt)? else {
            return Ok(None);
        };
        let Some(url) = non_blank(&line) else {
            return Ok(Some(None));
        };
        if Settings::validate_proxy_url(&url, allow_socks) {
            return Ok(Some(Some(url)));
        }
        eprintln!("{}", theme.error(&format!("Invalid proxy URL: {url}")));
    }
}

fn ask_yes_no(input: &mut dyn LineSource, prompt: &str, default: bool) -> Result<Option<bool>> {
    loop {
        let Some(line) = input.read_line(prompt)? else {
            return Ok(None);
        };
        match line.trim().to_lowercase().as_str() {
            "" => return Ok(Some(default)),
            "y" | "yes" => return Ok(Some(true)),
            "n" | "no" => return Ok(Some(false)),
            _ => eprintln!("Please answer y or n."),
        }
    }
}
