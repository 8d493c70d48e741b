use std::sync::Arc;

use crate::application::details::DetailsService;
use crate::application::library::LibraryService;
use crate::application::players::PlayerService;
use crate::domain::roster::Roster;

use super::rate_limit::TokenBucketLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub library: Arc<LibraryService>,
    pub details: Arc<DetailsService>,
    pub players: Arc<PlayerService>,
    pub roster: Arc<Roster>,
    pub rate_limiter: Arc<TokenBucketLimiter>,
}
