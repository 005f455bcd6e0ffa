pub mod domain;
pub mod ports;

pub use domain::{InvalidStatus, Task, TaskStatus, User, UserCredentials};
pub use ports::{PortError, PortResult, SessionStore, TaskStore, UserStore};
