pub mod connection;
pub mod session_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use session_repository::SessionRepository;
