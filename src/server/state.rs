use crate::knowledge::KnowledgeBase;
use crate::network::Network;

use std::sync::Arc;

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub kb: Arc<KnowledgeBase>,
    pub network: Arc<Network>,
}

impl AppState {
    pub fn new(kb: KnowledgeBase, network: Network) -> Self {
        AppState {
            kb: Arc::new(kb),
            network: Arc::new(network),
        }
    }
}
