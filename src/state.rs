use std::sync::Arc;

use crate::config::Config;
use crate::search::SearchAdapter;
use crate::upstream::Transport;
use crate::worker::RateGate;

// app's shared state, cheap to clone into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: RateGate, // every Discogs call goes through here
    pub search: SearchAdapter,
}

impl AppState {
    // Spawns the rate gate, so this must run inside the tokio runtime
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let config = Arc::new(config);
        let gate = RateGate::spawn(transport);
        let search = SearchAdapter::new(gate.clone(), Arc::clone(&config));
        Self {
            config,
            gate,
            search,
        }
    }
}
