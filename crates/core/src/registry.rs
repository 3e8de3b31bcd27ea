//! Action Registry
//!
//! The closed set of verbs the agent may use, and for each one the static
//! description of how its argument is read and what kind of effect it has.
//! The registry is immutable process-wide configuration.

/// A recognised command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Terminal,
    AppName,
    Text,
    ScreenShot,
    ClipBoard,
    Notify,
    Search,
    File,
    KeyPress,
    Window,
    Speak,
    Listen,
}

/// How the argument following a verb tag is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentShape {
    /// The verb takes no argument; trailing text is ignored.
    None,
    /// The rest of the line, internal whitespace preserved.
    Line,
    /// The first whitespace-separated token of the rest of the line.
    Word,
}

/// The kind of effect executing a verb has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Invoke the actuator and move on.
    FireAndForget,
    /// Invoke the actuator for a payload and post it back to the session as a new turn.
    Feedback,
    /// Routed to the listeners of the turn's origin rather than to the desktop.
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub verb: Verb,
    /// The bracketed tag that introduces the verb on a command line.
    pub tag: &'static str,
    pub argument: ArgumentShape,
    pub effect: Effect,
    /// Argument placeholder shown to the oracle, if any.
    pub placeholder: Option<&'static str>,
    /// One-line capability description shown to the oracle.
    pub summary: &'static str,
}

impl ActionDescriptor {
    pub fn yields_feedback(&self) -> bool {
        self.effect == Effect::Feedback
    }

    /// Reduces raw argument text to what this verb consumes.
    pub fn argument_of<'a>(&self, raw: &'a str) -> &'a str {
        match self.argument {
            ArgumentShape::None => "",
            ArgumentShape::Line => raw,
            ArgumentShape::Word => raw.split_whitespace().next().unwrap_or(""),
        }
    }
}

pub static REGISTRY: [ActionDescriptor; 12] = [
    ActionDescriptor {
        verb: Verb::Terminal,
        tag: "[terminal]",
        argument: ArgumentShape::None,
        effect: Effect::FireAndForget,
        placeholder: None,
        summary: "Opens a new terminal window",
    },
    ActionDescriptor {
        verb: Verb::AppName,
        tag: "[appName]",
        argument: ArgumentShape::Word,
        effect: Effect::FireAndForget,
        placeholder: Some("name"),
        summary: "Launches a specific application",
    },
    ActionDescriptor {
        verb: Verb::Text,
        tag: "[text]",
        argument: ArgumentShape::Line,
        effect: Effect::FireAndForget,
        placeholder: Some("text"),
        summary: "Sends text input to the active window",
    },
    ActionDescriptor {
        verb: Verb::ScreenShot,
        tag: "[screenShot]",
        argument: ArgumentShape::None,
        effect: Effect::Feedback,
        placeholder: None,
        summary: "Captures a screenshot for analysis",
    },
    ActionDescriptor {
        verb: Verb::ClipBoard,
        tag: "[clipBoard]",
        argument: ArgumentShape::None,
        effect: Effect::Feedback,
        placeholder: None,
        summary: "Reads the current clipboard content",
    },
    ActionDescriptor {
        verb: Verb::Notify,
        tag: "[notify]",
        argument: ArgumentShape::Line,
        effect: Effect::FireAndForget,
        placeholder: Some("message"),
        summary: "Sends a system notification",
    },
    ActionDescriptor {
        verb: Verb::Search,
        tag: "[search]",
        argument: ArgumentShape::Line,
        effect: Effect::FireAndForget,
        placeholder: Some("query"),
        summary: "Opens browser with search query",
    },
    ActionDescriptor {
        verb: Verb::File,
        tag: "[file]",
        argument: ArgumentShape::Line,
        effect: Effect::FireAndForget,
        placeholder: Some("path"),
        summary: "Opens file with default app",
    },
    ActionDescriptor {
        verb: Verb::KeyPress,
        tag: "[keyPress]",
        argument: ArgumentShape::Word,
        effect: Effect::FireAndForget,
        placeholder: Some("keys"),
        summary: "Simulates keyboard input",
    },
    ActionDescriptor {
        verb: Verb::Window,
        tag: "[window]",
        argument: ArgumentShape::Word,
        effect: Effect::FireAndForget,
        placeholder: Some("action"),
        summary: "Controls windows (maximize/minimize/close)",
    },
    ActionDescriptor {
        verb: Verb::Speak,
        tag: "[speak]",
        argument: ArgumentShape::Line,
        effect: Effect::Voice,
        placeholder: Some("text"),
        summary: "Speaks text aloud to the user",
    },
    ActionDescriptor {
        verb: Verb::Listen,
        tag: "[listen]",
        argument: ArgumentShape::None,
        effect: Effect::Voice,
        placeholder: None,
        summary: "Starts listening for the user's voice",
    },
];

impl Verb {
    pub fn descriptor(self) -> &'static ActionDescriptor {
        // REGISTRY is laid out in declaration order of `Verb`.
        &REGISTRY[self as usize]
    }
}

/// Matches a command line against the registry tags, case-sensitively.
///
/// Returns the descriptor and the raw argument text following the tag, with
/// leading whitespace removed.
pub fn lookup(line: &str) -> Option<(&'static ActionDescriptor, &str)> {
    REGISTRY.iter().find_map(|descriptor| {
        line.strip_prefix(descriptor.tag)
            .map(|rest| (descriptor, rest.trim_start()))
    })
}
