//! Grammar-aware completion engine for the workout REPL.
//!
//! Suggestions come from walking the same [`catalog`] AST the parser uses,
//! so a command added there is completed without further changes here.

use heapless::Vec as HeaplessVec;

use super::catalog::{self, HelpTopics, Node};
use super::grammar::{self, Token, TokenKind};

const MAX_SUGGESTIONS: usize = 16;

type Candidates = HeaplessVec<Candidate, MAX_SUGGESTIONS>;

/// Completion result returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResult {
    /// Replacement to apply when one candidate matches or when the matching
    /// candidates share a prefix longer than what was typed.
    pub replacement: Option<Replacement>,
    /// Candidates for the word under the cursor. Empty when nothing fits.
    pub options: HeaplessVec<&'static str, MAX_SUGGESTIONS>,
}

impl CompletionResult {
    const fn empty() -> Self {
        Self {
            replacement: None,
            options: HeaplessVec::new(),
        }
    }
}

/// Portion of the buffer to substitute with `value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub value: &'static str,
    pub append_space: bool,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    text: &'static str,
    /// Grammar node reached after accepting this candidate.
    next: &'static Node,
}

/// Stateless completion engine that mirrors the REPL grammar.
#[derive(Default)]
pub struct CompletionEngine;

impl CompletionEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes completions for `buffer` with the cursor at byte `cursor`.
    ///
    /// A cursor past the end or inside a multi-byte character yields no
    /// completions.
    #[must_use]
    pub fn complete(&self, buffer: &str, cursor: usize) -> CompletionResult {
        if !buffer.is_char_boundary(cursor) {
            return CompletionResult::empty();
        }

        let upto_cursor = &buffer[..cursor];
        let prefix_start = token_start(upto_cursor);
        let prefix = &upto_cursor[prefix_start..];
        let leading = &upto_cursor[..prefix_start];

        let Ok(leading_tokens) = grammar::lex(leading) else {
            return CompletionResult::empty();
        };

        let Some(candidates) = candidates_after(leading_tokens.as_slice()) else {
            return CompletionResult::empty();
        };

        let mut matched: Candidates = HeaplessVec::new();
        let mut options = HeaplessVec::new();
        for candidate in candidates
            .iter()
            .filter(|candidate| starts_with_ignore_ascii_case(candidate.text, prefix))
        {
            let _ = matched.push(*candidate);
            let _ = options.push(candidate.text);
        }

        let replacement = match matched.as_slice() {
            [] => None,
            [only] => Some(Replacement {
                start: prefix_start,
                end: cursor,
                value: only.text,
                append_space: !only.next.is_end(),
            }),
            _ => {
                let lcp = longest_common_prefix(options.as_slice());
                (lcp.len() > common_prefix_len_ignore_case(prefix, lcp)).then_some(Replacement {
                    start: prefix_start,
                    end: cursor,
                    value: lcp,
                    append_space: false,
                })
            }
        };

        CompletionResult {
            replacement,
            options,
        }
    }
}

/// Walks the catalog with the already-typed tokens and lists what may follow.
fn candidates_after(tokens: &[Token<'_>]) -> Option<Candidates> {
    let Some((first, rest)) = tokens.split_first() else {
        let mut root = HeaplessVec::new();
        for spec in catalog::commands() {
            let _ = root.push(Candidate {
                text: spec.name,
                next: spec.grammar,
            });
        }
        return Some(root);
    };

    if first.kind != TokenKind::Ident {
        return None;
    }
    let mut node = catalog::find(first.lexeme)?.grammar;

    for token in rest {
        node = step(node, token)?;
    }

    Some(node_candidates(node))
}

fn step(node: &'static Node, token: &Token<'_>) -> Option<&'static Node> {
    match (node, token.kind) {
        (Node::OptionalChoice { choices }, TokenKind::Ident) => {
            catalog::find_choice(choices, token.lexeme).map(|branch| branch.next)
        }
        (Node::Value { next, .. }, TokenKind::Integer)
        | (Node::Topic { next, .. }, TokenKind::Ident) => Some(*next),
        _ => None,
    }
}

fn node_candidates(node: &'static Node) -> Candidates {
    let mut out = HeaplessVec::new();
    match node {
        Node::End | Node::Topic {
            topics: HelpTopics::None,
            ..
        } => {}
        Node::OptionalChoice { choices } => {
            for branch in *choices {
                let _ = out.push(Candidate {
                    text: branch.keyword,
                    next: branch.next,
                });
            }
        }
        Node::Value { spec, next, .. } => {
            for suggestion in spec.suggestions() {
                let _ = out.push(Candidate {
                    text: *suggestion,
                    next: *next,
                });
            }
        }
        Node::Topic {
            topics: HelpTopics::Commands,
            next,
        } => {
            for spec in catalog::commands() {
                let _ = out.push(Candidate {
                    text: spec.name,
                    next: *next,
                });
            }
        }
    }
    out
}

fn token_start(buffer: &str) -> usize {
    buffer
        .rfind([' ', '\t'])
        .map_or(0, |index| index + 1)
}

fn starts_with_ignore_ascii_case(candidate: &str, prefix: &str) -> bool {
    candidate
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn common_prefix_len_ignore_case(lhs: &str, rhs: &str) -> usize {
    lhs.as_bytes()
        .iter()
        .zip(rhs.as_bytes())
        .take_while(|(l, r)| l.eq_ignore_ascii_case(r))
        .count()
}

fn longest_common_prefix(candidates: &[&'static str]) -> &'static str {
    let Some((first, rest)) = candidates.split_first() else {
        return "";
    };
    let mut prefix = *first;
    for candidate in rest {
        let len = common_prefix_len_ignore_case(prefix, candidate);
        prefix = &prefix[..len];
        if prefix.is_empty() {
            break;
        }
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(buffer: &str) -> CompletionResult {
        CompletionEngine::new().complete(buffer, buffer.len())
    }

    #[test]
    fn offers_every_command_from_empty_buffer() {
        let result = complete("");
        assert!(result.replacement.is_none());
        assert_eq!(result.options.len(), catalog::commands().len());
        assert_eq!(result.options[0], "start");
    }

    #[test]
    fn shared_prefix_is_extended() {
        let result = complete("p");
        assert_eq!(result.options.as_slice(), ["pause", "plan"]);
        assert!(result.replacement.is_none());

        let result = complete("st");
        assert_eq!(result.options.as_slice(), ["start", "status"]);
        let replacement = result.replacement.expect("shared prefix");
        assert_eq!(replacement.value, "sta");
        assert!(!replacement.append_space);
    }

    #[test]
    fn unique_command_appends_space_only_with_arguments() {
        let replacement = complete("jum").replacement.expect("unique match");
        assert_eq!((replacement.start, replacement.end), (0, 3));
        assert_eq!(replacement.value, "jump");
        assert!(replacement.append_space);

        let replacement = complete("pau").replacement.expect("unique match");
        assert_eq!(replacement.value, "pause");
        assert!(!replacement.append_space);
    }

    #[test]
    fn suggests_day_names_after_start() {
        let result = complete("start ");
        assert_eq!(result.options.len(), 7);
        assert_eq!(result.options[0], "monday");

        let replacement = complete("start MO").replacement.expect("unique day");
        assert_eq!((replacement.start, replacement.end), (6, 8));
        assert_eq!(replacement.value, "monday");
        assert!(!replacement.append_space);
    }

    #[test]
    fn suggests_tick_counts() {
        let result = complete("tick 1");
        assert_eq!(result.options.as_slice(), ["1", "10", "15"]);
        let replacement = result.replacement;
        assert!(replacement.is_none());
    }

    #[test]
    fn help_topics_are_command_names() {
        let result = complete("help t");
        assert_eq!(result.options.as_slice(), ["toggle", "tick"]);
        let replacement = complete("help ju").replacement.expect("unique topic");
        assert_eq!(replacement.value, "jump");
        assert!(!replacement.append_space);
    }

    #[test]
    fn nothing_follows_complete_commands() {
        assert!(complete("status ").options.is_empty());
        assert!(complete("start monday ").options.is_empty());
        assert!(complete("bogus ").options.is_empty());
        assert!(complete("tick $ ").options.is_empty());
    }

    #[test]
    fn cursor_past_end_is_ignored() {
        let result = CompletionEngine::new().complete("st", 5);
        assert_eq!(result, CompletionResult::empty());
    }

    #[test]
    fn cursor_inside_a_character_is_ignored() {
        let engine = CompletionEngine::new();
        assert_eq!(engine.complete("start é", 7), CompletionResult::empty());

        let result = engine.complete("start é", 8);
        assert!(result.options.is_empty());
        assert!(result.replacement.is_none());
    }
}
