pub mod chat;
pub mod error;
pub mod middleware;

use std::sync::Arc;

use rently_core::inbox::InboxAggregator;
use rently_core::resolver::ConversationResolver;
use rently_gateway::Hub;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub resolver: ConversationResolver,
    pub inbox: InboxAggregator,
    pub hub: Hub,
}
