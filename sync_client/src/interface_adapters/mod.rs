// Interface adapters: wire protocol and WebSocket session handling.

pub mod net;
pub mod protocol;
pub mod utils;
