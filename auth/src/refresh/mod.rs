pub mod errors;
pub mod memory;
pub mod models;
pub mod ports;
pub mod store;

pub use errors::RefreshTokenError;
pub use memory::InMemoryRefreshTokenRepository;
pub use models::RefreshToken;
pub use models::RefreshTokenState;
pub use ports::RefreshTokenRepository;
pub use store::RefreshTokenStore;
