//! Request-scoped engine operations.
//!
//! Each method is one logical read-modify-write against the store: load the
//! record, apply the pure core (state machine / reconciler), write back.
//! Nothing is cached between calls. Concurrent calls against the same item
//! race last-write-wins at the storage layer — an accepted limitation, not a
//! correctness guarantee (see the interleaving integration test).

use tracing::info;

use crate::clock::Clock;
use crate::db::Store;
use crate::error::Result;
use crate::history::History;
use crate::model::board::{BoardCard, BoardColumn};
use crate::model::item::{Status, WorkItem};
use crate::model::sprint::Sprint;
use crate::reconcile::{normalize_columns, reconcile_cards};
use crate::transition::{change_sprint, transition, Transition};

/// The engine surface: transport-agnostic operations the surrounding system
/// binds to HTTP handlers or CLI commands.
pub struct Engine<'a> {
    store: &'a Store,
    clock: &'a dyn Clock,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub const fn new(store: &'a Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Create a work item in `todo` with its seed history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn create_item(&self, project_id: &str, title: &str) -> Result<WorkItem> {
        let item = WorkItem::new(project_id, title, self.clock.now());
        self.store.put_item(&item)?;
        info!(item = %item.id, project = %project_id, "created work item");
        Ok(item)
    }

    /// Apply a status transition to an item.
    ///
    /// The raw status string is validated at this boundary; everything past
    /// it works with the closed enum. When the bridging contract with the
    /// board fires, the linked card (if any) is rewritten in the same
    /// request.
    ///
    /// # Errors
    ///
    /// [`crate::Error::ItemNotFound`] for an unknown item,
    /// [`crate::Error::InvalidStatus`] for a status outside the fixed set,
    /// storage errors propagated unchanged.
    pub fn transition(&self, item_id: &str, status: &str) -> Result<WorkItem> {
        let new_status: Status = status.parse()?;
        let mut item = self.store.get_item(item_id)?;

        match transition(&mut item, new_status, self.clock.now()) {
            Transition::Noop => Ok(item),
            Transition::Applied { board_echo } => {
                self.store.put_item(&item)?;

                if let Some(echo) = board_echo {
                    self.echo_to_linked_card(&item, echo)?;
                }
                Ok(item)
            }
        }
    }

    fn echo_to_linked_card(&self, item: &WorkItem, echo: Status) -> Result<()> {
        let Some(mut card) = self.store.card_linked_to(&item.project_id, &item.id)? else {
            return Ok(());
        };
        if card.status == echo.as_str() {
            return Ok(());
        }

        card.status = echo.as_str().to_string();
        card.order = self.store.cards_in_column(&item.project_id, echo.as_str())?;
        card.updated_at = self.clock.now();
        self.store.put_card(&card)?;
        info!(card = %card.id, item = %item.id, to = %echo, "echoed status to board card");
        Ok(())
    }

    /// Move an item into a sprint, or back to the backlog (`None`).
    ///
    /// # Errors
    ///
    /// [`crate::Error::ItemNotFound`] for an unknown item,
    /// [`crate::Error::SprintNotFound`] when the target sprint does not
    /// exist.
    pub fn change_sprint(&self, item_id: &str, sprint_id: Option<&str>) -> Result<WorkItem> {
        if let Some(target) = sprint_id {
            self.store.get_sprint(target)?;
        }

        let mut item = self.store.get_item(item_id)?;
        if change_sprint(&mut item, sprint_id, self.clock.now()) {
            self.store.put_item(&item)?;
        }
        Ok(item)
    }

    /// Board read: normalize the column layout and correct stale cards.
    ///
    /// Idempotent — a second call with no intervening item writes changes
    /// nothing. Individual card mismatches never fail the read; only storage
    /// errors propagate.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failures.
    pub fn reconcile_board(&self, project_id: &str) -> Result<Vec<BoardCard>> {
        self.normalized_board_columns(project_id)?;

        let mut cards = self.store.cards_for_project(project_id)?;
        let item_status = self
            .store
            .items_in_project(project_id)?
            .into_iter()
            .map(|item| (item.id, item.status))
            .collect();

        let corrections = reconcile_cards(&mut cards, &item_status, self.clock.now());
        if corrections > 0 {
            info!(project = %project_id, corrections, "board reconciliation corrected cards");
            for card in &cards {
                self.store.put_card(card)?;
            }
        }

        Ok(cards)
    }

    /// The project's normalized column layout, creating the board document
    /// on first read and persisting normalization only when it changed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failures.
    pub fn normalized_board_columns(&self, project_id: &str) -> Result<Vec<BoardColumn>> {
        let existing = self.store.board_columns(project_id)?.unwrap_or_default();
        let (columns, changed) = normalize_columns(&existing);
        if changed {
            self.store.put_board_columns(project_id, &columns)?;
        }
        Ok(columns)
    }

    /// Add a card to the board, optionally linked to a work item.
    ///
    /// Linking echoes `{todo, doing, done}` card statuses back onto the
    /// item via a normal transition, so the item's history stays truthful.
    ///
    /// # Errors
    ///
    /// [`crate::Error::ItemNotFound`] when linking to an unknown item.
    pub fn add_card(
        &self,
        project_id: &str,
        title: &str,
        status: &str,
        item_id: Option<&str>,
    ) -> Result<BoardCard> {
        let order = self.store.cards_in_column(project_id, status)?;
        let card = BoardCard::new(project_id, title, status, order, item_id, self.clock.now());

        if let Some(linked) = item_id {
            // Verify the link target and mirror board-column statuses.
            self.store.get_item(linked)?;
            if let Ok(parsed) = status.parse::<Status>() {
                if parsed.echoes_to_board() {
                    self.transition(linked, parsed.as_str())?;
                }
            }
        }

        self.store.put_card(&card)?;
        Ok(card)
    }

    /// Create a new active sprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn create_sprint(&self, project_id: &str, name: &str) -> Result<Sprint> {
        let sprint = Sprint::new(project_id, name, self.clock.now());
        self.store.put_sprint(&sprint)?;
        info!(sprint = %sprint.id, project = %project_id, "created sprint");
        Ok(sprint)
    }

    /// Complete a sprint, stamping `completed_at` exactly once.
    ///
    /// # Errors
    ///
    /// [`crate::Error::SprintNotFound`] for an unknown sprint.
    pub fn complete_sprint(&self, sprint_id: &str) -> Result<Sprint> {
        let mut sprint = self.store.get_sprint(sprint_id)?;
        sprint.complete(self.clock.now());
        self.store.put_sprint(&sprint)?;
        Ok(sprint)
    }

    /// A sprint plus its items, for detail reads and metrics rollups.
    ///
    /// # Errors
    ///
    /// [`crate::Error::SprintNotFound`] for an unknown sprint.
    pub fn sprint_detail(&self, sprint_id: &str) -> Result<(Sprint, Vec<WorkItem>)> {
        let sprint = self.store.get_sprint(sprint_id)?;
        let items = self.store.items_in_sprint(sprint_id)?;
        Ok((sprint, items))
    }

    /// Apply a point estimate (the planning-poker apply path).
    ///
    /// A single-field update: no history entry is appended.
    ///
    /// # Errors
    ///
    /// [`crate::Error::ItemNotFound`] for an unknown item.
    pub fn set_points(&self, item_id: &str, points: f64) -> Result<WorkItem> {
        let mut item = self.store.get_item(item_id)?;
        item.points = Some(points);
        self.store.put_item(&item)?;
        Ok(item)
    }
}
