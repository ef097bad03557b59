//! Commit message templates.
//!
//! A template is a single line of text with placeholder markers such as
//! `{t}` or `{p,}`. Each marker names a placeholder kind with one character and may
//! carry a free-text modifier up to the closing brace. Resolution asks a handler
//! for every marker, left to right, and splices the answers back in place.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Used when a template string is empty.
pub const MESSAGE_ONLY_TEMPLATE: &str = "{m}";

lazy_static! {
  static ref MARKER: Regex = Regex::new(r"\{([^{}\s])([^}]*)\}").unwrap();
}

#[derive(Error, Debug)]
pub enum TemplateError {
  #[error("no placeholders found in commit message template {0:?}")]
  NoPlaceholders(String),

  #[error("unknown placeholder {token}")]
  UnknownPlaceholder { token: String },

  #[error("no handler registered for placeholder kind '{kind}'")]
  MissingHandler { kind: PlaceholderKind },

  #[error("failed to resolve placeholder {token}")]
  Handler {
    token:  String,
    #[source]
    source: anyhow::Error
  }
}

/// The closed set of placeholder kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
  /// `t`: commit type picked from a fixed list
  Type,
  /// `p`: affected package(s), modifier is the join separator
  Packages,
  /// `n`: ticket number
  Ticket,
  /// `m`: free-text commit message
  Message,
  /// `i`: integer input, modifier is the prompt label
  Integer,
  /// `s`: string input, modifier is the prompt label
  Text
}

impl PlaceholderKind {
  pub const ALL: [PlaceholderKind; 6] = [
    PlaceholderKind::Type,
    PlaceholderKind::Packages,
    PlaceholderKind::Ticket,
    PlaceholderKind::Message,
    PlaceholderKind::Integer,
    PlaceholderKind::Text
  ];

  pub fn from_char(c: char) -> Option<Self> {
    match c {
      't' => Some(PlaceholderKind::Type),
      'p' => Some(PlaceholderKind::Packages),
      'n' => Some(PlaceholderKind::Ticket),
      'm' => Some(PlaceholderKind::Message),
      'i' => Some(PlaceholderKind::Integer),
      's' => Some(PlaceholderKind::Text),
      _ => None
    }
  }

  pub fn as_char(&self) -> char {
    match self {
      PlaceholderKind::Type => 't',
      PlaceholderKind::Packages => 'p',
      PlaceholderKind::Ticket => 'n',
      PlaceholderKind::Message => 'm',
      PlaceholderKind::Integer => 'i',
      PlaceholderKind::Text => 's'
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      PlaceholderKind::Type => "commit type",
      PlaceholderKind::Packages => "affected packages",
      PlaceholderKind::Ticket => "ticket number",
      PlaceholderKind::Message => "commit message",
      PlaceholderKind::Integer => "integer input",
      PlaceholderKind::Text => "text input"
    }
  }
}

impl Display for PlaceholderKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_char())
  }
}

/// A marker exactly as it appears in the template.
///
/// The kind is kept as the raw character so that an unrecognised kind can be
/// reported with the offending marker instead of being skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind:     char,
  pub modifier: String,
  pub span:     Range<usize>
}

impl Token {
  pub fn placeholder_kind(&self) -> Option<PlaceholderKind> {
    PlaceholderKind::from_char(self.kind)
  }
}

impl Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{{}{}}}", self.kind, self.modifier)
  }
}

/// Resolves one placeholder kind to a string.
///
/// `ctx` is whatever the caller threads through resolution, typically the console
/// and repository the handlers talk to. Handlers that validate input loop
/// internally; whatever they return is taken as final.
pub trait PlaceholderHandler<C: ?Sized> {
  fn resolve(&self, modifier: &str, ctx: &mut C) -> anyhow::Result<String>;
}

struct FnHandler<F>(F);

impl<C: ?Sized, F> PlaceholderHandler<C> for FnHandler<F>
where
  F: Fn(&str, &mut C) -> anyhow::Result<String>
{
  fn resolve(&self, modifier: &str, ctx: &mut C) -> anyhow::Result<String> {
    (self.0)(modifier, ctx)
  }
}

/// One handler per placeholder kind.
pub struct Registry<'h, C: ?Sized> {
  handlers: HashMap<PlaceholderKind, Box<dyn PlaceholderHandler<C> + 'h>>
}

impl<C: ?Sized> Default for Registry<'_, C> {
  fn default() -> Self {
    Self { handlers: HashMap::new() }
  }
}

impl<'h, C: ?Sized> Registry<'h, C> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Binds `handler` to `kind`, replacing any previous binding.
  pub fn register<H>(mut self, kind: PlaceholderKind, handler: H) -> Self
  where
    H: PlaceholderHandler<C> + 'h
  {
    self.handlers.insert(kind, Box::new(handler));
    self
  }

  pub fn register_fn<F>(self, kind: PlaceholderKind, f: F) -> Self
  where
    F: Fn(&str, &mut C) -> anyhow::Result<String> + 'h
  {
    self.register(kind, FnHandler(f))
  }

  pub fn get(&self, kind: PlaceholderKind) -> Option<&(dyn PlaceholderHandler<C> + 'h)> {
    self.handlers.get(&kind).map(|handler| handler.as_ref())
  }
}

/// A parsed template. Holds at least one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  source: String,
  tokens: Vec<Token>
}

impl Template {
  pub fn parse(source: &str) -> Result<Self, TemplateError> {
    let source = if source.is_empty() { MESSAGE_ONLY_TEMPLATE } else { source };

    let tokens: Vec<Token> = MARKER
      .captures_iter(source)
      .filter_map(|caps| {
        let whole = caps.get(0)?;
        let kind = caps.get(1)?.as_str().chars().next()?;
        let modifier = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some(Token { kind, modifier: modifier.to_string(), span: whole.range() })
      })
      .collect();

    if tokens.is_empty() {
      return Err(TemplateError::NoPlaceholders(source.to_string()));
    }

    Ok(Self { source: source.to_string(), tokens })
  }

  pub fn as_str(&self) -> &str {
    &self.source
  }

  /// Markers in the order they appear.
  pub fn tokens(&self) -> &[Token] {
    &self.tokens
  }

  /// Asks the registry for a value for every marker, strictly in order, and
  /// returns the normalised message. The first failure aborts resolution.
  ///
  /// Every marker is matched to a handler before the first one runs, so a bad
  /// template fails without prompting.
  pub fn render<C: ?Sized>(&self, registry: &Registry<'_, C>, ctx: &mut C) -> Result<String, TemplateError> {
    let bound = self
      .tokens
      .iter()
      .map(|token| -> Result<_, TemplateError> {
        let kind = token
          .placeholder_kind()
          .ok_or_else(|| TemplateError::UnknownPlaceholder { token: token.to_string() })?;
        let handler = registry.get(kind).ok_or(TemplateError::MissingHandler { kind })?;
        Ok((token, kind, handler))
      })
      .collect::<Result<Vec<_>, _>>()?;

    let mut values = Vec::with_capacity(bound.len());

    for (token, kind, handler) in bound {
      log::debug!("Resolving placeholder {} ({})", token, kind.description());
      let value = handler
        .resolve(&token.modifier, ctx)
        .map_err(|source| TemplateError::Handler { token: token.to_string(), source })?;
      log::debug!("Placeholder {} resolved to {:?}", token, value);

      values.push(value);
    }

    Ok(normalize_whitespace(&self.substitute(&values)))
  }

  /// Replaces the Nth marker with the Nth value.
  fn substitute(&self, values: &[String]) -> String {
    let mut output = String::with_capacity(self.source.len() + values.iter().map(String::len).sum::<usize>());
    let mut cursor = 0;

    for (token, value) in self.tokens.iter().zip(values) {
      output.push_str(&self.source[cursor..token.span.start]);
      output.push_str(value);
      cursor = token.span.end;
    }

    output.push_str(&self.source[cursor..]);
    output
  }
}

/// Parses `template` and renders it against `registry`.
pub fn resolve<C: ?Sized>(template: &str, registry: &Registry<'_, C>, ctx: &mut C) -> Result<String, TemplateError> {
  Template::parse(template)?.render(registry, ctx)
}

/// Collapses every whitespace run to a single space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}
