mod page;
mod user;

pub use page::{total_pages, PageRequest, PagedData};
pub use user::{find_user, User, UserStatus};
