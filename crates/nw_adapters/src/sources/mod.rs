pub mod guardian;
pub mod newsapi;
pub mod nyt;

pub use guardian::GuardianAdapter;
pub use newsapi::NewsApiAdapter;
pub use nyt::NytAdapter;

use crate::SourceAdapter;

/// The three production adapters, in batch order.
pub fn default_adapters() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(NewsApiAdapter),
        Box::new(GuardianAdapter),
        Box::new(NytAdapter),
    ]
}
