#![allow(clippy::module_name_repetitions)]

//! Lexer and parser for the workout REPL.
//!
//! The lexer uses `logos` to produce a bounded token stream, while the parser
//! walks the [`catalog`](super::catalog) AST with `winnow` parsers over those
//! tokens to build structured command values.

use core::fmt;
use core::ops::Range;

use heapless::Vec as HeaplessVec;
use logos::Logos;
use winnow::ascii::dec_uint;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use super::catalog::{self, ChoiceBranch, ChoiceTag, CommandTag, Node, ValueSlot, ValueSpec};
use crate::workouts::{Day, SetId};

/// Maximum number of tokens produced per REPL line. Commands remain short and bounded.
pub const MAX_TOKENS: usize = 16;

/// Lexical token kinds recognized by the REPL grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Unsigned decimal literal.
    Integer,
    /// Identifier or keyword (case-insensitive match performed later).
    Ident,
    /// End-of-line token (`\r`, `\n`, or `\r\n`).
    Eol,
    /// Input the lexer could not classify.
    Error,
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[A-Za-z][A-Za-z0-9_-]*")]
    Ident,
    #[token("\r\n")]
    #[token("\n")]
    #[token("\r")]
    Eol,
    #[regex(r"[ \t]+", logos::skip)]
    Whitespace,
}

impl RawToken {
    const fn kind(self) -> TokenKind {
        match self {
            RawToken::Integer => TokenKind::Integer,
            RawToken::Ident => TokenKind::Ident,
            RawToken::Eol => TokenKind::Eol,
            RawToken::Whitespace => TokenKind::Error,
        }
    }
}

/// Token emitted by the lexer with a byte span back into the source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: Range<usize>,
}

/// Bounded token buffer to avoid dynamic allocation in `no_std` environments.
pub type TokenBuffer<'a> = HeaplessVec<Token<'a>, MAX_TOKENS>;

/// Lexer errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    /// Input produced more tokens than the static buffer allows.
    TooManyTokens { processed: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::TooManyTokens { processed } => {
                write!(f, "token buffer exhausted after {processed} items")
            }
        }
    }
}

/// Grammar errors emitted by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrammarErrorKind<'a> {
    UnexpectedToken {
        expected: &'static str,
        found: &'a str,
        span: Range<usize>,
    },
    UnexpectedEnd {
        expected: &'static str,
    },
    InvalidInteger {
        span: Range<usize>,
    },
    BelowMinimum {
        label: &'static str,
        min: u16,
        span: Range<usize>,
    },
    InvalidToken {
        span: Range<usize>,
        lexeme: &'a str,
    },
}

impl fmt::Display for GrammarErrorKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarErrorKind::UnexpectedToken {
                expected,
                found,
                span,
            } => write!(f, "expected {expected}, found `{found}` at {span:?}"),
            GrammarErrorKind::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            GrammarErrorKind::InvalidInteger { span } => {
                write!(f, "invalid integer literal at {span:?}")
            }
            GrammarErrorKind::BelowMinimum { label, min, span } => {
                write!(f, "{label} must be at least {min} at {span:?}")
            }
            GrammarErrorKind::InvalidToken { span, lexeme } => {
                write!(f, "unsupported token `{lexeme}` at {span:?}")
            }
        }
    }
}

/// Wrapper type enabling a consistent error surface for consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarError<'a> {
    pub kind: GrammarErrorKind<'a>,
}

impl fmt::Display for GrammarError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl<'a> GrammarError<'a> {
    fn unexpected(expected: &'static str, token: Option<&Token<'a>>) -> Self {
        GrammarError {
            kind: match token {
                Some(tok) if tok.kind != TokenKind::Eol => GrammarErrorKind::UnexpectedToken {
                    expected,
                    found: tok.lexeme,
                    span: tok.span.clone(),
                },
                _ => GrammarErrorKind::UnexpectedEnd { expected },
            },
        }
    }

    fn invalid_integer(token: &Token<'a>) -> Self {
        GrammarError {
            kind: GrammarErrorKind::InvalidInteger {
                span: token.span.clone(),
            },
        }
    }

    fn below_minimum(label: &'static str, min: u16, token: &Token<'a>) -> Self {
        GrammarError {
            kind: GrammarErrorKind::BelowMinimum {
                label,
                min,
                span: token.span.clone(),
            },
        }
    }

    fn invalid_token(token: &Token<'a>) -> Self {
        GrammarError {
            kind: GrammarErrorKind::InvalidToken {
                span: token.span.clone(),
                lexeme: token.lexeme,
            },
        }
    }
}

type Input<'src, 'slice> = &'slice [Token<'src>];

type GrammarResult<'src, T> = Result<T, ErrMode<GrammarError<'src>>>;

/// Combined lex/parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError<'a> {
    Lex(LexError),
    Grammar(GrammarError<'a>),
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => err.fmt(f),
            ParseError::Grammar(err) => err.fmt(f),
        }
    }
}

/// Structured commands produced by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Start(StartCommand),
    Pause,
    Resume,
    Toggle,
    Tick(TickCommand),
    Jump(JumpCommand),
    Status,
    Plan,
    Help(HelpCommand<'a>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartCommand {
    /// `None` restarts the plan already loaded.
    pub day: Option<Day>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickCommand {
    pub count: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpCommand {
    pub set: SetId,
    /// 1-based movement number as shown by `status`.
    pub movement: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HelpCommand<'a> {
    pub topic: Option<&'a str>,
}

pub(crate) fn parse_tokens_partial<'src, 'slice>(
    tokens: &'slice [Token<'src>],
) -> Result<(Command<'src>, &'slice [Token<'src>]), GrammarError<'src>>
where
    'src: 'slice,
{
    let mut input = tokens;
    match command().parse_next(&mut input) {
        Ok(cmd) => Ok((cmd, input)),
        Err(ErrMode::Backtrack(err) | ErrMode::Cut(err)) => Err(err),
        Err(ErrMode::Incomplete(_)) => Err(GrammarError::unexpected("token", input.first())),
    }
}

/// Tokenize the provided line.
///
/// # Errors
///
/// Fails when the line holds more than [`MAX_TOKENS`] tokens.
pub fn lex(line: &str) -> Result<TokenBuffer<'_>, LexError> {
    let mut buffer = TokenBuffer::new();

    for (result, span) in RawToken::lexer(line).spanned() {
        let kind = match result {
            Ok(raw) => raw.kind(),
            Err(()) => TokenKind::Error,
        };
        let token = Token {
            kind,
            lexeme: &line[span.clone()],
            span,
        };
        if buffer.push(token).is_err() {
            return Err(LexError::TooManyTokens {
                processed: buffer.len() + 1,
            });
        }
    }

    Ok(buffer)
}

/// Parse a REPL command from the provided line.
///
/// # Errors
///
/// Returns [`ParseError`] for lexer overflow, unknown symbols or input that
/// does not match the command grammar.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError<'_>> {
    let tokens = lex(line).map_err(ParseError::Lex)?;

    if let Some(token) = tokens.iter().find(|token| token.kind == TokenKind::Error) {
        return Err(ParseError::Grammar(GrammarError::invalid_token(token)));
    }

    let (command, mut rest) =
        parse_tokens_partial(tokens.as_slice()).map_err(ParseError::Grammar)?;

    while let Some((token, remaining)) = rest.split_first() {
        if token.kind == TokenKind::Eol {
            rest = remaining;
        } else {
            return Err(ParseError::Grammar(GrammarError::unexpected(
                "end of command",
                Some(token),
            )));
        }
    }

    Ok(command)
}

fn command<'src, 'slice>() -> impl Parser<Input<'src, 'slice>, Command<'src>, ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    move |input: &mut Input<'src, 'slice>| {
        let snapshot = *input;
        let command_token = expect_kind(TokenKind::Ident, "command keyword").parse_next(input)?;

        if let Some(spec) = catalog::find(command_token.lexeme) {
            let mut state = CommandState::new(spec.tag);
            parse_node(spec.grammar, input, &mut state)?;
            state.finish()
        } else {
            *input = snapshot;
            Err(ErrMode::Backtrack(GrammarError::unexpected(
                "command keyword",
                Some(&command_token),
            )))
        }
    }
}

fn parse_node<'src>(
    node: &'static Node,
    input: &mut Input<'src, '_>,
    state: &mut CommandState<'src>,
) -> GrammarResult<'src, ()> {
    match node {
        Node::End => Ok(()),
        Node::OptionalChoice { choices } => parse_optional_choice(input, choices, state),
        Node::Value {
            slot,
            spec,
            required,
            next,
        } => {
            if parse_value(input, *slot, *spec, *required, state)? {
                parse_node(next, input, state)
            } else {
                Ok(())
            }
        }
        Node::Topic { next, .. } => {
            parse_topic(input, state)?;
            parse_node(next, input, state)
        }
    }
}

fn parse_optional_choice<'src>(
    input: &mut Input<'src, '_>,
    choices: &'static [ChoiceBranch],
    state: &mut CommandState<'src>,
) -> GrammarResult<'src, ()> {
    match input.split_first() {
        Some((token, rest)) if token.kind == TokenKind::Ident => {
            if let Some(branch) = catalog::find_choice(choices, token.lexeme) {
                *input = rest;
                state.apply_choice(branch.tag)?;
                parse_node(branch.next, input, state)
            } else {
                Err(ErrMode::Cut(GrammarError::unexpected(
                    choice_expected_label(choices),
                    Some(token),
                )))
            }
        }
        Some((token, _)) if token.kind != TokenKind::Eol => Err(ErrMode::Backtrack(
            GrammarError::unexpected(choice_expected_label(choices), Some(token)),
        )),
        _ => Ok(()),
    }
}

/// Returns `true` when a value was consumed.
fn parse_value<'src>(
    input: &mut Input<'src, '_>,
    slot: ValueSlot,
    spec: ValueSpec,
    required: bool,
    state: &mut CommandState<'src>,
) -> GrammarResult<'src, bool> {
    let present = matches!(input.first(), Some(token) if token.kind != TokenKind::Eol);
    if !present && !required {
        return Ok(false);
    }

    let token = expect_kind(TokenKind::Integer, spec.label()).parse_next(input)?;
    let value = parse_integer(&token).map_err(ErrMode::Cut)?;
    let ValueSpec::Integer { label, min, .. } = spec;
    if value < min {
        return Err(ErrMode::Cut(GrammarError::below_minimum(label, min, &token)));
    }
    state.set_value(slot, value);
    Ok(true)
}

fn parse_topic<'src>(
    input: &mut Input<'src, '_>,
    state: &mut CommandState<'src>,
) -> GrammarResult<'src, ()> {
    match input.split_first() {
        Some((token, rest)) if token.kind == TokenKind::Ident => {
            state.set_topic(token.lexeme);
            *input = rest;
            Ok(())
        }
        Some((token, _)) if token.kind != TokenKind::Eol => Err(ErrMode::Backtrack(
            GrammarError::unexpected("identifier", Some(token)),
        )),
        _ => Ok(()),
    }
}

fn choice_expected_label(choices: &'static [ChoiceBranch]) -> &'static str {
    match choices.first().map(|choice| choice.tag) {
        Some(ChoiceTag::Day(_)) => "day name",
        None => "keyword",
    }
}

enum CommandState<'a> {
    Start { day: Option<Day> },
    Pause,
    Resume,
    Toggle,
    Tick { count: Option<u16> },
    Jump { set: Option<u16>, movement: Option<u16> },
    Status,
    Plan,
    Help { topic: Option<&'a str> },
}

impl<'a> CommandState<'a> {
    fn new(tag: CommandTag) -> Self {
        match tag {
            CommandTag::Start => CommandState::Start { day: None },
            CommandTag::Pause => CommandState::Pause,
            CommandTag::Resume => CommandState::Resume,
            CommandTag::Toggle => CommandState::Toggle,
            CommandTag::Tick => CommandState::Tick { count: None },
            CommandTag::Jump => CommandState::Jump {
                set: None,
                movement: None,
            },
            CommandTag::Status => CommandState::Status,
            CommandTag::Plan => CommandState::Plan,
            CommandTag::Help => CommandState::Help { topic: None },
        }
    }

    fn apply_choice(&mut self, tag: ChoiceTag) -> GrammarResult<'a, ()> {
        match (self, tag) {
            (CommandState::Start { day }, ChoiceTag::Day(chosen)) => {
                *day = Some(chosen);
                Ok(())
            }
            _ => Err(ErrMode::Backtrack(GrammarError::unexpected("choice", None))),
        }
    }

    fn set_value(&mut self, slot: ValueSlot, value: u16) {
        match (self, slot) {
            (CommandState::Tick { count }, ValueSlot::TickCount) => *count = Some(value),
            (CommandState::Jump { set, .. }, ValueSlot::JumpSet) => *set = Some(value),
            (CommandState::Jump { movement, .. }, ValueSlot::JumpMovement) => {
                *movement = Some(value);
            }
            _ => {}
        }
    }

    fn set_topic(&mut self, topic: &'a str) {
        if let CommandState::Help { topic: slot } = self {
            *slot = Some(topic);
        }
    }

    fn finish(self) -> GrammarResult<'a, Command<'a>> {
        match self {
            CommandState::Start { day } => Ok(Command::Start(StartCommand { day })),
            CommandState::Pause => Ok(Command::Pause),
            CommandState::Resume => Ok(Command::Resume),
            CommandState::Toggle => Ok(Command::Toggle),
            CommandState::Tick { count } => Ok(Command::Tick(TickCommand {
                count: count.unwrap_or(1),
            })),
            CommandState::Jump {
                set: Some(set),
                movement: Some(movement),
            } => Ok(Command::Jump(JumpCommand {
                set: SetId(set),
                movement,
            })),
            CommandState::Jump { set: None, .. } => Err(ErrMode::Backtrack(
                GrammarError::unexpected("set id", None),
            )),
            CommandState::Jump { movement: None, .. } => Err(ErrMode::Backtrack(
                GrammarError::unexpected("movement number", None),
            )),
            CommandState::Status => Ok(Command::Status),
            CommandState::Plan => Ok(Command::Plan),
            CommandState::Help { topic } => Ok(Command::Help(HelpCommand { topic })),
        }
    }
}

fn expect_kind<'src, 'slice>(
    kind: TokenKind,
    label: &'static str,
) -> impl Parser<Input<'src, 'slice>, Token<'src>, ErrMode<GrammarError<'src>>>
where
    'src: 'slice,
{
    move |input: &mut Input<'src, 'slice>| match input.split_first() {
        Some((token, rest)) if token.kind == kind => {
            *input = rest;
            Ok(token.clone())
        }
        Some((token, _)) => Err(ErrMode::Backtrack(GrammarError::unexpected(
            label,
            Some(token),
        ))),
        None => Err(ErrMode::Backtrack(GrammarError::unexpected(label, None))),
    }
}

fn parse_integer<'a>(token: &Token<'a>) -> Result<u16, GrammarError<'a>> {
    dec_uint::<_, u16, ContextError>
        .parse(token.lexeme)
        .map_err(|_| GrammarError::invalid_integer(token))
}
