//! Per-board sync session
//!
//! Owns the local store, the gateway and the mutation machinery for one
//! board. This is the context every command executes against and the
//! surface the rendering layer reads from.

use crate::cache::SyncCache;
use crate::dispatcher::MutationDispatcher;
use crate::error::Result;
use crate::gateway::{CollectionGateway, HttpGateway};
use crate::reconcile::{ReconciliationManager, SyncEvent};
use crate::store::BoardStore;
use crate::types::{Board, BoardId, BoardView, List};
use kanban_sync_config::{SyncConfig, SyncSettings};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Sync context for one board
pub struct BoardSession {
    board_id: BoardId,
    store: BoardStore,
    gateway: Arc<dyn CollectionGateway>,
    cache: SyncCache,
    reconciler: ReconciliationManager,
    dispatcher: MutationDispatcher,
    settings: SyncSettings,
}

impl fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardSession")
            .field("board_id", &self.board_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BoardSession {
    /// Create a session with an empty local board
    pub fn new(
        board_id: impl Into<BoardId>,
        gateway: Arc<dyn CollectionGateway>,
        settings: SyncSettings,
    ) -> Self {
        let board_id = board_id.into();
        let store = BoardStore::new(Board::new(board_id.clone()));
        let cache = SyncCache::new();
        let reconciler = ReconciliationManager::new(store.clone(), cache.clone());
        let dispatcher = MutationDispatcher::new(
            store.clone(),
            Arc::clone(&gateway),
            reconciler.clone(),
            settings.list_debounce(),
        );

        Self {
            board_id,
            store,
            gateway,
            cache,
            reconciler,
            dispatcher,
            settings,
        }
    }

    /// Create a session talking HTTP, as configured
    pub fn from_config(board_id: impl Into<BoardId>, config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let gateway = HttpGateway::from_config(&config.api)?;
        Ok(Self::new(board_id, Arc::new(gateway), config.sync.clone()))
    }

    /// Create a session and load the board from the remote
    pub async fn open(
        board_id: impl Into<BoardId>,
        gateway: Arc<dyn CollectionGateway>,
        settings: SyncSettings,
    ) -> Result<Self> {
        let session = Self::new(board_id, gateway, settings);
        session.refresh().await?;
        Ok(session)
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn CollectionGateway> {
        &self.gateway
    }

    pub fn cache(&self) -> &SyncCache {
        &self.cache
    }

    pub fn reconciler(&self) -> &ReconciliationManager {
        &self.reconciler
    }

    pub fn dispatcher(&self) -> &MutationDispatcher {
        &self.dispatcher
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Current local state, optimistic changes included
    pub fn read_model(&self) -> BoardView {
        self.store.get_board()
    }

    /// Read model, refetched first when stale and `refresh_on_read` is set
    pub async fn view(&self) -> Result<BoardView> {
        if self.settings.refresh_on_read {
            self.refresh_if_stale().await?;
        }
        Ok(self.read_model())
    }

    /// Receive the board after every local change
    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.store.subscribe()
    }

    /// Receive confirm/rollback events
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.reconciler.events()
    }

    /// No write is waiting or in flight
    pub fn is_idle(&self) -> bool {
        self.reconciler.in_flight() == 0 && !self.dispatcher.has_pending()
    }

    /// Replace local state with the remote's.
    ///
    /// A mutation that starts or settles while the fetch is in flight keeps
    /// the response from being applied; the board stays stale instead.
    pub async fn refresh(&self) -> Result<()> {
        let generation = self.reconciler.generation();
        let remote = self.gateway.fetch_board(&self.board_id).await?;
        if !self.is_idle() || self.reconciler.generation() != generation {
            debug!(board_id = %self.board_id, "refresh discarded: local writes since fetch");
            self.cache.mark_stale(&self.board_id);
            return Ok(());
        }

        let lists: Vec<List> = remote.into_iter().map(List::from).collect();
        info!(board_id = %self.board_id, lists = lists.len(), "board refreshed");
        self.store.load(lists);
        self.cache.mark_fresh(&self.board_id);
        Ok(())
    }

    /// Refetch only when stale and idle; returns whether a refetch ran
    pub async fn refresh_if_stale(&self) -> Result<bool> {
        if !self.cache.is_stale(&self.board_id) {
            return Ok(false);
        }
        if !self.is_idle() {
            debug!(board_id = %self.board_id, "stale board kept: write in flight");
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Send any debounced write and wait for it to settle
    pub async fn flush(&self) {
        self.dispatcher.flush().await;
    }
}
