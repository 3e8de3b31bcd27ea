//! Command Block Parser
//!
//! Extracts the command block from a free-text oracle reply. A block starts at
//! the first line beginning with [`MARKER`] and runs to the end of the reply.

use crate::registry::{self, Verb};

/// The line that opens a command block.
pub const MARKER: &str = "[Command]";

/// A single parsed instruction: a verb plus the raw argument text after its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub verb: Verb,
    pub arg: String,
}

impl CommandLine {
    pub fn new(verb: Verb, arg: impl Into<String>) -> Self {
        Self {
            verb,
            arg: arg.into(),
        }
    }
}

/// The commands of one reply, in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBlock {
    pub lines: Vec<CommandLine>,
}

impl CommandBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandLine> {
        self.lines.iter()
    }
}

/// Parses a reply into its command block.
///
/// Text before the marker is ignored here. After the marker, blank lines and
/// lines matching no known verb tag are skipped; that is how the agent may
/// describe a capability it lacks without breaking dispatch.
pub fn parse(reply: &str) -> CommandBlock {
    let mut lines = reply.lines().map(str::trim);
    if !lines.any(|line| line.starts_with(MARKER)) {
        return CommandBlock::default();
    }

    let lines = lines
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            registry::lookup(line)
                .map(|(descriptor, arg)| CommandLine::new(descriptor.verb, arg))
        })
        .collect();
    CommandBlock { lines }
}
