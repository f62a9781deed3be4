//! Wire-facing command contract between a connection and the engine.
//!
//! Framing and parsing of the client protocol live outside this crate; a
//! connection hands the engine a [`CommandSource`] and the worker loop pulls
//! decoded commands from it until end of stream.

use crate::orderbook::Side;
use std::collections::VecDeque;

/// A decoded client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit a new limit order
    Submit {
        /// Buy or sell
        side: Side,
        /// Client-scoped order id
        order_id: u32,
        /// Instrument symbol
        instrument: String,
        /// Limit price, positive
        price: u64,
        /// Order quantity, positive
        quantity: u64,
    },

    /// Cancel a previously submitted order
    Cancel {
        /// Id of the order to cancel
        order_id: u32,
    },
}

/// Outcome of one read from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// A command was decoded
    Command(Command),
    /// The client closed the connection
    EndOfFile,
    /// The connection failed; the worker terminates
    Error,
}

/// Source of commands for one connection worker.
pub trait CommandSource {
    /// Block until the next command, end of stream, or a read error.
    fn read_command(&mut self) -> ReadResult;
}

/// A pre-scripted command stream. Yields its commands in order, then
/// `EndOfFile`. Used by tests and demo drivers in place of a socket.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    commands: VecDeque<Command>,
}

impl ScriptedSource {
    /// Build a source that replays `commands` in order.
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

impl CommandSource for ScriptedSource {
    fn read_command(&mut self) -> ReadResult {
        match self.commands.pop_front() {
            Some(command) => ReadResult::Command(command),
            None => ReadResult::EndOfFile,
        }
    }
}
