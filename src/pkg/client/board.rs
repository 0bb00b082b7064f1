use askama::Template;

use crate::{
    pkg::{
        client::{
            api::JobApi,
            tracker::{JobForm, Tracker},
        },
        internal::adaptors::jobs::spec::JobEntry,
    },
    prelude::Result,
};

pub struct Card<'a> {
    /// 1-based number shown next to the card.
    pub number: usize,
    /// Position of the record in the tracker's full list.
    pub index: usize,
    pub job: &'a JobEntry,
}

#[derive(Template)]
#[template(path = "board.txt", escape = "none")]
pub struct Board<'a> {
    pub search_term: &'a str,
    pub committed_search: &'a str,
    pub status_filter: String,
    pub form: &'a JobForm,
    pub mode: &'static str,
    pub ready: bool,
    pub cards: Vec<Card<'a>>,
    pub total: usize,
}

impl<'a> Board<'a> {
    pub fn new<A: JobApi>(tracker: &'a Tracker<A>) -> Self {
        let cards = tracker
            .visible()
            .into_iter()
            .enumerate()
            .map(|(n, (index, job))| Card {
                number: n + 1,
                index,
                job,
            })
            .collect();
        Board {
            search_term: tracker.search_term(),
            committed_search: tracker.committed_search(),
            status_filter: tracker.status_filter().to_string(),
            form: tracker.form(),
            mode: if tracker.is_editing() {
                "Update Job"
            } else {
                "Add Job"
            },
            ready: tracker.form().is_complete(),
            cards,
            total: tracker.jobs().len(),
        }
    }

    /// Full-list position behind the card numbered `number`.
    pub fn position_of(&self, number: usize) -> Option<usize> {
        self.cards
            .iter()
            .find(|card| card.number == number)
            .map(|card| card.index)
    }

    pub fn draw(&self) -> Result<String> {
        Ok(self.render()?)
    }
}
