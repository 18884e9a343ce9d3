//! Query executors for the local graph and the remote endpoint.

pub mod local;
pub mod remote;

use std::future::Future;
use std::pin::Pin;

use nearby_graph::Binding;

use crate::error::Result;

pub use local::LocalExecutor;
pub use remote::RemoteExecutor;

/// Something that answers a query with a finite, fully collected set of rows
pub trait BindingSource: Send + Sync {
    type Query;

    fn evaluate<'a>(
        &'a self,
        query: &'a Self::Query,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Binding>>> + Send + 'a>>;
}
