//! lobbywatch - activity reporter for legacy multiplayer game servers

pub mod pipeline;
