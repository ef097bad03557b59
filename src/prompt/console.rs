use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, IsTerminal, Write};

use console::style;
use thiserror::Error;

const TTY_PATH: &str = "/dev/tty";

#[derive(Error, Debug)]
pub enum PromptError {
  #[error("input closed while waiting for an answer")]
  InputClosed,

  #[error("nothing to choose from")]
  NoChoices,

  #[error(transparent)]
  Io(#[from] io::Error)
}

pub type Result<T, E = PromptError> = std::result::Result<T, E>;

/// Line-oriented console the prompt handlers talk to.
///
/// Input and output are injected so that prompts can be driven from memory in
/// tests and from the controlling terminal inside a git hook.
pub struct Console<'a> {
  input:  Box<dyn BufRead + 'a>,
  output: Box<dyn Write + 'a>
}

impl<'a> Console<'a> {
  pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
    Self { input: Box::new(input), output: Box::new(output) }
  }

  /// Process standard input and output.
  pub fn stdio() -> Self {
    Self::new(io::stdin().lock(), io::stdout())
  }

  /// The controlling terminal.
  ///
  /// Git starts hooks with stdin detached from the terminal, so when stdin is not a
  /// tty the console talks to `/dev/tty` directly. Falls back to stdio when there
  /// is no terminal at all.
  pub fn terminal() -> Self {
    if io::stdin().is_terminal() {
      return Self::stdio();
    }

    match (File::open(TTY_PATH), OpenOptions::new().write(true).open(TTY_PATH)) {
      (Ok(input), Ok(output)) => {
        log::debug!("Reading answers from {}", TTY_PATH);
        Self::new(BufReader::new(input), output)
      }
      _ => {
        log::debug!("No terminal available, falling back to stdio");
        Self::stdio()
      }
    }
  }

  /// Writes a full line.
  pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
    writeln!(self.output, "{}", line.as_ref())?;
    Ok(())
  }

  /// Shows `prompt` and returns the next input line with surrounding whitespace
  /// removed.
  pub fn read_line(&mut self, prompt: &str) -> Result<String> {
    write!(self.output, "{}", prompt)?;
    self.output.flush()?;

    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Err(PromptError::InputClosed);
    }

    Ok(line.trim().to_string())
  }

  /// Re-prompts until `parse` accepts the answer.
  pub fn read_until<T>(&mut self, prompt: &str, mut parse: impl FnMut(&str) -> Option<T>) -> Result<T> {
    loop {
      let answer = self.read_line(prompt)?;
      if let Some(value) = parse(&answer) {
        return Ok(value);
      }
      log::debug!("Rejected answer {:?}", answer);
    }
  }

  /// Re-prompts until the answer is not empty.
  pub fn read_non_empty(&mut self, prompt: &str) -> Result<String> {
    self.read_until(prompt, |answer| (!answer.is_empty()).then(|| answer.to_string()))
  }

  fn menu(&mut self, title: &str, choices: &[String]) -> Result<String> {
    if choices.is_empty() {
      return Err(PromptError::NoChoices);
    }

    self.say(title)?;
    for (idx, choice) in choices.iter().enumerate() {
      self.say(format!("{} - {}", style(format!("{:3}", idx + 1)).cyan(), choice))?;
    }

    Ok(format!("(1-{})> ", choices.len()))
  }

  /// Numbered single-choice menu. Re-prompts until a valid index is given.
  pub fn choose(&mut self, title: &str, choices: &[String]) -> Result<String> {
    let prompt = self.menu(title, choices)?;

    self.read_until(&prompt, |answer| {
      answer
        .parse::<usize>()
        .ok()
        .filter(|idx| (1..=choices.len()).contains(idx))
        .map(|idx| choices[idx - 1].clone())
    })
  }

  /// Numbered multi-choice menu; indices are separated by whitespace. Re-prompts
  /// until every index is valid and at least one is given.
  pub fn choose_many(&mut self, title: &str, choices: &[String]) -> Result<Vec<String>> {
    let prompt = self.menu(title, choices)?;

    loop {
      let answer = self.read_line(&prompt)?;
      match parse_selection(&answer, choices.len()) {
        Ok(indices) if indices.is_empty() => continue,
        Ok(indices) => return Ok(indices.into_iter().map(|idx| choices[idx - 1].clone()).collect()),
        Err(invalid) => self.say(format!("invalid value {}", invalid))?
      }
    }
  }

  /// Yes/no question. Accepts `y`, `yes`, `n` and `no` in any case.
  pub fn confirm(&mut self, question: &str) -> Result<bool> {
    self.say(question)?;
    self.read_until("(yes/no)> ", |answer| {
      match answer.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None
      }
    })
  }
}

/// One-based indices in the order given. Returns the first invalid entry on error.
fn parse_selection(answer: &str, len: usize) -> std::result::Result<Vec<usize>, String> {
  answer
    .split_whitespace()
    .map(|value| {
      value
        .parse::<usize>()
        .ok()
        .filter(|idx| (1..=len).contains(idx))
        .ok_or_else(|| value.to_string())
    })
    .collect()
}
