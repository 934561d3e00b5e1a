mod auth_ctx;
mod pagination;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use pagination::PageParams;
