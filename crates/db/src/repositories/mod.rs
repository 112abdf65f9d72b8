pub mod page_repo;
pub mod user_repo;

pub use page_repo::PageRepo;
pub use user_repo::UserRepo;
