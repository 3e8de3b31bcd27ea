//! Deskpilot core: the command protocol that lets a conversational agent drive a
//! desktop session.
//!
//! A reply from the oracle is scanned for a command block ([`command`]), each
//! line is resolved against the [`registry`], and the [`dispatcher`] runs the
//! resulting actions through an [`actuator::Actuator`], feeding captured data
//! back into the same [`session::Session`].

pub mod actuator;
pub mod command;
pub mod dispatcher;
pub mod llm_client;
pub mod prompt;
pub mod registry;
pub mod session;
pub mod turn;
