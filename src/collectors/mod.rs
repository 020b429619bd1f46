//! Event handlers that turn one invocation into stored records.
//!
//! Both collectors are stateless between invocations: every collaborator is
//! handed in at construction, and every outcome (including failures) comes
//! back as a [`Response`](crate::envelope::Response) envelope.
//!
//! - [`generic`]: stores an arbitrary `{id, data}` payload
//! - [`news`]: fetches a news feed and stores one record per article

pub mod generic;
pub mod news;

pub use generic::GenericCollector;
pub use news::NewsCollector;
