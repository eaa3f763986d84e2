pub mod comments;
pub mod posts;
pub mod slug;
pub mod tags;
pub mod users;
