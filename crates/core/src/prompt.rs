//! System instructions sent as the first turn of a session.

use crate::{command::MARKER, registry::REGISTRY};

/// Instruction for the brief question-answering mode, which does no dispatch.
pub const ASK_INSTRUCTION: &str = "You're an AI assistant, the user will first send the context, then ask questions, be as brief and clear as possible";

/// Builds the agent instruction. The command list is generated from the
/// registry so the documented grammar always matches what the parser accepts.
pub fn agent_instruction() -> String {
    let mut commands = String::new();
    for descriptor in REGISTRY.iter() {
        match descriptor.placeholder {
            Some(placeholder) => commands.push_str(&format!(
                "- {} ({}): {}\n",
                descriptor.tag, placeholder, descriptor.summary
            )),
            None => commands.push_str(&format!("- {}: {}\n", descriptor.tag, descriptor.summary)),
        }
    }

    format!(
        "You are an AI assistant running on a GNOME Linux desktop. You have access to these commands:

Available Commands:
{commands}
To execute commands:
1. Start with {MARKER} on a new line
2. Each command on its own line
3. You can chain multiple commands
4. If you need a missing command, describe what it should do

Example:
{MARKER}
[terminal]
[text] ping 8.8.8.8
[keyPress] Return

I'll provide feedback on your actions and you can take screenshots or ask for additional information when needed."
    )
}
