pub mod connect;
pub mod users;

pub use connect::{
    ConnectIncomingMessage, ConnectOutgoingMessage, Connection, ConnectionIntent,
    ConnectionRemovalRequest, GenericResponse,
};
pub use users::{User, UsernameInfo};
