//! Shared REPL grammar expressed as a static AST.
//!
//! The parser and completion engine interpret the same structure, so
//! keywords, optional arguments and value slots stay in sync.

use crate::workouts::Day;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandTag {
    Start,
    Pause,
    Resume,
    Toggle,
    Tick,
    Jump,
    Status,
    Plan,
    Help,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceTag {
    Day(Day),
}

/// Argument slot an integer value fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSlot {
    TickCount,
    JumpSet,
    JumpMovement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSpec {
    Integer {
        label: &'static str,
        min: u16,
        suggestions: &'static [&'static str],
    },
}

impl ValueSpec {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ValueSpec::Integer { label, .. } => label,
        }
    }

    #[must_use]
    pub const fn suggestions(self) -> &'static [&'static str] {
        match self {
            ValueSpec::Integer { suggestions, .. } => suggestions,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelpTopics {
    None,
    Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tag: CommandTag,
    pub grammar: &'static Node,
    pub help: HelpTopics,
    pub usage: &'static str,
    pub summary: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    End,
    OptionalChoice {
        choices: &'static [ChoiceBranch],
    },
    Value {
        slot: ValueSlot,
        spec: ValueSpec,
        required: bool,
        next: &'static Node,
    },
    Topic {
        topics: HelpTopics,
        next: &'static Node,
    },
}

impl Node {
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self, Node::End)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoiceBranch {
    pub keyword: &'static str,
    /// Short spelling accepted by the parser but never suggested.
    pub alias: Option<&'static str>,
    pub tag: ChoiceTag,
    pub next: &'static Node,
}

impl ChoiceBranch {
    #[must_use]
    pub fn matches(&self, lexeme: &str) -> bool {
        self.keyword.eq_ignore_ascii_case(lexeme)
            || self
                .alias
                .is_some_and(|alias| alias.eq_ignore_ascii_case(lexeme))
    }
}

const END: Node = Node::End;

const fn day_branch(day: Day, alias: &'static str) -> ChoiceBranch {
    ChoiceBranch {
        keyword: day.name(),
        alias: Some(alias),
        tag: ChoiceTag::Day(day),
        next: &END,
    }
}

const DAY_CHOICES: [ChoiceBranch; 7] = [
    day_branch(Day::Monday, "mon"),
    day_branch(Day::Tuesday, "tue"),
    day_branch(Day::Wednesday, "wed"),
    day_branch(Day::Thursday, "thu"),
    day_branch(Day::Friday, "fri"),
    day_branch(Day::Saturday, "sat"),
    day_branch(Day::Sunday, "sun"),
];

const START_GRAMMAR: Node = Node::OptionalChoice {
    choices: &DAY_CHOICES,
};

const TICK_SUGGESTIONS: [&str; 4] = ["1", "5", "10", "15"];

const TICK_GRAMMAR: Node = Node::Value {
    slot: ValueSlot::TickCount,
    spec: ValueSpec::Integer {
        label: "tick count",
        min: 1,
        suggestions: &TICK_SUGGESTIONS,
    },
    required: false,
    next: &END,
};

const JUMP_MOVEMENT_GRAMMAR: Node = Node::Value {
    slot: ValueSlot::JumpMovement,
    spec: ValueSpec::Integer {
        label: "movement number",
        min: 1,
        suggestions: &[],
    },
    required: true,
    next: &END,
};

const JUMP_GRAMMAR: Node = Node::Value {
    slot: ValueSlot::JumpSet,
    spec: ValueSpec::Integer {
        label: "set id",
        min: 0,
        suggestions: &[],
    },
    required: true,
    next: &JUMP_MOVEMENT_GRAMMAR,
};

const HELP_GRAMMAR: Node = Node::Topic {
    topics: HelpTopics::Commands,
    next: &END,
};

const COMMANDS: [CommandSpec; 9] = [
    CommandSpec {
        name: "start",
        tag: CommandTag::Start,
        grammar: &START_GRAMMAR,
        help: HelpTopics::None,
        usage: "start [day]",
        summary: "start (or restart) the plan for a day",
    },
    CommandSpec {
        name: "pause",
        tag: CommandTag::Pause,
        grammar: &END,
        help: HelpTopics::None,
        usage: "pause",
        summary: "stop the countdown",
    },
    CommandSpec {
        name: "resume",
        tag: CommandTag::Resume,
        grammar: &END,
        help: HelpTopics::None,
        usage: "resume",
        summary: "continue the countdown",
    },
    CommandSpec {
        name: "toggle",
        tag: CommandTag::Toggle,
        grammar: &END,
        help: HelpTopics::None,
        usage: "toggle",
        summary: "play/pause button",
    },
    CommandSpec {
        name: "tick",
        tag: CommandTag::Tick,
        grammar: &TICK_GRAMMAR,
        help: HelpTopics::None,
        usage: "tick [count]",
        summary: "deliver timer seconds",
    },
    CommandSpec {
        name: "jump",
        tag: CommandTag::Jump,
        grammar: &JUMP_GRAMMAR,
        help: HelpTopics::None,
        usage: "jump <set-id> <movement-number>",
        summary: "restart from a movement (numbers start at 1)",
    },
    CommandSpec {
        name: "status",
        tag: CommandTag::Status,
        grammar: &END,
        help: HelpTopics::None,
        usage: "status",
        summary: "show position and countdown",
    },
    CommandSpec {
        name: "plan",
        tag: CommandTag::Plan,
        grammar: &END,
        help: HelpTopics::None,
        usage: "plan",
        summary: "list the sets and movements",
    },
    CommandSpec {
        name: "help",
        tag: CommandTag::Help,
        grammar: &HELP_GRAMMAR,
        help: HelpTopics::Commands,
        usage: "help [command]",
        summary: "describe commands",
    },
];

/// Returns the full command catalog.
#[must_use]
pub const fn commands() -> &'static [CommandSpec] {
    &COMMANDS
}

/// Looks up a command by its tag.
#[must_use]
pub fn command(tag: CommandTag) -> &'static CommandSpec {
    match tag {
        CommandTag::Start => &COMMANDS[0],
        CommandTag::Pause => &COMMANDS[1],
        CommandTag::Resume => &COMMANDS[2],
        CommandTag::Toggle => &COMMANDS[3],
        CommandTag::Tick => &COMMANDS[4],
        CommandTag::Jump => &COMMANDS[5],
        CommandTag::Status => &COMMANDS[6],
        CommandTag::Plan => &COMMANDS[7],
        CommandTag::Help => &COMMANDS[8],
    }
}

/// Finds a command by name (case insensitive).
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Finds the choice branch matching `lexeme` by keyword or alias.
#[must_use]
pub fn find_choice(choices: &'static [ChoiceBranch], lexeme: &str) -> Option<&'static ChoiceBranch> {
    choices.iter().find(|choice| choice.matches(lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lookup_agrees_with_tags() {
        for spec in commands() {
            assert_eq!(command(spec.tag), spec);
            assert_eq!(find(spec.name), Some(spec));
        }
        assert_eq!(find("STATUS").map(|spec| spec.tag), Some(CommandTag::Status));
        assert!(find("reboot").is_none());
    }

    #[test]
    fn day_choices_accept_abbreviations() {
        let branch = find_choice(&DAY_CHOICES, "Wed").expect("alias matches");
        assert_eq!(branch.tag, ChoiceTag::Day(Day::Wednesday));
        assert!(find_choice(&DAY_CHOICES, "someday").is_none());
    }
}
