pub mod command;
pub mod guard;
pub mod repo;

pub use command::Git;
pub use guard::SafetyGuard;
pub use repo::GitRepo;
