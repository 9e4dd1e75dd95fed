mod meta;
mod posts;
mod schema;
mod transients;
mod types;

pub use schema::Database;
pub use types::{
    DatabaseError, FeaturedImage, FeedItem, NewPost, ATTACHMENT_ALT_META_KEY,
    ATTACHMENT_POST_TYPE, THUMBNAIL_META_KEY,
};
