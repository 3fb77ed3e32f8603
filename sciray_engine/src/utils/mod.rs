//! Small shared utilities: id recycling and cooperative task control.

mod id_factory;
mod cancellation;
mod rate_limiter;

pub use id_factory::IdFactory;
pub use cancellation::CancellationToken;
pub use rate_limiter::RateLimiter;
