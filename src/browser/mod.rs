mod har;
mod page_loader;

use tokio::sync::mpsc;
use url::Url;

use crate::{error::NavigationError, observer::RequestEvent};

pub use har::HarReplay;
pub use page_loader::{subresources, PageLoader};

#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    async fn navigate(
        &mut self,
        target: &Url,
        events: mpsc::Sender<RequestEvent>,
    ) -> Result<(), NavigationError>;
}
