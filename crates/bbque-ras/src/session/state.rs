/// What the session expects next on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolState {
    /// Waiting for a command header. Initial state, and the state after
    /// every completed or failed cycle.
    #[default]
    AwaitingCommand,
    /// Inside a reply; waiting for the next resource item.
    AwaitingNodeItems,
}
