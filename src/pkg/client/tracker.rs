use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::pkg::{
    client::api::JobApi,
    internal::adaptors::jobs::spec::{JobEntry, JobPatch, NewJob, Status},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobForm {
    pub title: String,
    pub company: String,
    pub location: String,
    pub status: Status,
}

impl JobForm {
    /// Title, company and location all filled in.
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.company.is_empty() && !self.location.is_empty()
    }

    fn to_new_job(&self) -> NewJob {
        NewJob {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            status: self.status,
        }
    }

    fn to_patch(&self) -> JobPatch {
        JobPatch {
            title: Some(self.title.clone()),
            company: Some(self.company.clone()),
            location: Some(self.location.clone()),
            status: Some(self.status),
        }
    }
}

impl From<&JobEntry> for JobForm {
    fn from(job: &JobEntry) -> Self {
        JobForm {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            status: job.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn admits(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Case-insensitive substring match on title or company.
pub fn matches(job: &JobEntry, filter: StatusFilter, search: &str) -> bool {
    let needle = search.to_lowercase();
    filter.admits(job.status)
        && (job.title.to_lowercase().contains(&needle)
            || job.company.to_lowercase().contains(&needle))
}

/// Local mirror of the server's job list plus the board's form and filters.
///
/// The list is hydrated once and afterwards only changed with records the
/// server has returned from a successful write. Failures are logged and leave
/// every piece of state untouched.
pub struct Tracker<A> {
    api: A,
    jobs: Vec<JobEntry>,
    form: JobForm,
    editing: Option<Uuid>,
    status_filter: StatusFilter,
    search_term: String,
    committed_search: String,
}

impl<A: JobApi> Tracker<A> {
    pub fn new(api: A) -> Self {
        Tracker {
            api,
            jobs: Vec::new(),
            form: JobForm::default(),
            editing: None,
            status_filter: StatusFilter::All,
            search_term: String::new(),
            committed_search: String::new(),
        }
    }

    pub fn jobs(&self) -> &[JobEntry] {
        &self.jobs
    }

    pub fn form(&self) -> &JobForm {
        &self.form
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Current position of the record loaded into the form.
    pub fn editing(&self) -> Option<usize> {
        let id = self.editing?;
        self.position(id)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.jobs.iter().position(|job| job.id == id)
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn committed_search(&self) -> &str {
        &self.committed_search
    }

    pub async fn hydrate(&mut self) {
        match self.api.fetch_jobs().await {
            Ok(jobs) => {
                tracing::debug!("loaded {} jobs", jobs.len());
                self.jobs = jobs;
            }
            Err(e) => tracing::error!("failed to fetch jobs: {}", e),
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.form.title = value,
            Field::Company => self.form.company = value,
            Field::Location => self.form.location = value,
        }
    }

    pub fn set_status(&mut self, status: Status) {
        self.form.status = status;
    }

    /// Loads the record at `index` of the full list into the form.
    pub fn edit(&mut self, index: usize) -> bool {
        let Some(job) = self.jobs.get(index) else {
            tracing::warn!("no job at position {}", index);
            return false;
        };
        self.form = JobForm::from(job);
        self.editing = Some(job.id);
        true
    }

    pub async fn submit(&mut self) {
        if !self.form.is_complete() {
            return;
        }

        match self.editing {
            Some(id) => match self.api.update_job(id, &self.form.to_patch()).await {
                Ok(Some(job)) => match self.position(id) {
                    Some(index) => self.jobs[index] = job,
                    None => self.jobs.insert(0, job),
                },
                Ok(None) => {
                    tracing::warn!("job {} no longer exists on the server", id);
                    self.jobs.retain(|job| job.id != id);
                }
                Err(e) => {
                    tracing::error!("failed to submit job: {}", e);
                    return;
                }
            },
            None => match self.api.create_job(&self.form.to_new_job()).await {
                Ok(job) => self.jobs.insert(0, job),
                Err(e) => {
                    tracing::error!("failed to submit job: {}", e);
                    return;
                }
            },
        }

        self.form = JobForm::default();
        self.editing = None;
        self.search_term.clear();
        self.committed_search.clear();
    }

    /// Drops the record at `index` once the server confirms the delete.
    pub async fn delete(&mut self, index: usize) {
        let Some(id) = self.jobs.get(index).map(|job| job.id) else {
            tracing::warn!("no job at position {}", index);
            return;
        };
        if let Err(e) = self.api.delete_job(id).await {
            tracing::error!("failed to delete: {}", e);
            return;
        }
        self.jobs.remove(index);
        if self.editing == Some(id) {
            self.form = JobForm::default();
            self.editing = None;
        }
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    /// Updates the search box without touching the list.
    pub fn type_search(&mut self, text: impl Into<String>) {
        self.search_term = text.into();
    }

    pub fn commit_search(&mut self) {
        self.committed_search = self.search_term.clone();
    }

    /// Records that pass the status filter and committed search, paired with
    /// their position in the full list.
    pub fn visible(&self) -> Vec<(usize, &JobEntry)> {
        self.jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| matches(job, self.status_filter, &self.committed_search))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{
        pkg::internal::{adaptors::jobs::memory::MemoryJobStore, gateway::JobStore},
        prelude::{Error, Result},
    };

    /// Answers like the server would, backed by the memory store.
    #[derive(Clone, Default)]
    pub struct FakeApi {
        pub store: Arc<MemoryJobStore>,
        pub down: Arc<AtomicBool>,
    }

    impl FakeApi {
        fn check(&self) -> Result<()> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Error::Api {
                    status: 500,
                    body: "down".into(),
                });
            }
            Ok(())
        }

        pub async fn seed(&self, title: &str, company: &str, status: Status) -> JobEntry {
            self.store
                .create(NewJob {
                    title: title.into(),
                    company: company.into(),
                    location: "Remote".into(),
                    status,
                })
                .await
                .unwrap()
        }
    }

    #[async_trait]
    impl JobApi for FakeApi {
        async fn fetch_jobs(&self) -> Result<Vec<JobEntry>> {
            self.check()?;
            self.store.list_all().await
        }

        async fn create_job(&self, job: &NewJob) -> Result<JobEntry> {
            self.check()?;
            self.store.create(job.clone()).await
        }

        async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Option<JobEntry>> {
            self.check()?;
            self.store.update_by_id(id, patch.clone()).await
        }

        async fn delete_job(&self, id: Uuid) -> Result<()> {
            self.check()?;
            self.store.delete_by_id(id).await?;
            Ok(())
        }
    }

    async fn tracker_with_two() -> (Tracker<FakeApi>, FakeApi) {
        let api = FakeApi::default();
        api.seed("PM", "B", Status::Offer).await;
        api.seed("Dev", "A", Status::Applied).await;
        let mut tracker = Tracker::new(api.clone());
        tracker.hydrate().await;
        (tracker, api)
    }

    fn titles<A: JobApi>(tracker: &Tracker<A>) -> Vec<String> {
        tracker
            .visible()
            .into_iter()
            .map(|(_, job)| job.title.clone())
            .collect()
    }

    fn fill(tracker: &mut Tracker<FakeApi>, title: &str) {
        tracker.set_field(Field::Title, title);
        tracker.set_field(Field::Company, "C");
        tracker.set_field(Field::Location, "Paris");
    }

    #[tokio::test]
    async fn status_filter_narrows_the_view() {
        let (mut tracker, _) = tracker_with_two().await;
        tracker.set_status_filter(StatusFilter::Only(Status::Offer));
        assert_eq!(titles(&tracker), vec!["PM"]);
        tracker.set_status_filter(StatusFilter::All);
        assert_eq!(titles(&tracker), vec!["Dev", "PM"]);
    }

    #[tokio::test]
    async fn search_applies_only_once_committed() {
        let (mut tracker, _) = tracker_with_two().await;
        tracker.type_search("DEV");
        assert_eq!(titles(&tracker).len(), 2);
        tracker.commit_search();
        assert_eq!(titles(&tracker), vec!["Dev"]);

        tracker.type_search("b");
        tracker.commit_search();
        assert_eq!(titles(&tracker), vec!["PM"]);
    }

    #[tokio::test]
    async fn status_filter_and_search_both_apply() {
        let (mut tracker, api) = tracker_with_two().await;
        api.seed("Dev Lead", "C", Status::Offer).await;
        tracker.hydrate().await;

        tracker.set_status_filter(StatusFilter::Only(Status::Offer));
        assert_eq!(titles(&tracker), vec!["Dev Lead", "PM"]);
        tracker.type_search("dev");
        tracker.commit_search();
        assert_eq!(titles(&tracker), vec!["Dev Lead"]);

        tracker.set_status_filter(StatusFilter::Only(Status::Rejected));
        assert!(titles(&tracker).is_empty());
    }

    #[tokio::test]
    async fn refresh_during_edit_still_updates_the_edited_record() {
        let (mut tracker, api) = tracker_with_two().await;
        assert!(tracker.edit(0));
        assert_eq!(tracker.form().title, "Dev");

        api.seed("Other", "D", Status::Applied).await;
        tracker.hydrate().await;
        assert_eq!(tracker.editing(), Some(1));

        tracker.set_field(Field::Title, "Dev II");
        tracker.submit().await;

        let server: Vec<_> = api
            .store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.title)
            .collect();
        assert_eq!(server, vec!["Other", "Dev II", "PM"]);
        let local: Vec<_> = tracker.jobs().iter().map(|job| job.title.clone()).collect();
        assert_eq!(local, server);
        assert!(!tracker.is_editing());
    }

    #[tokio::test]
    async fn create_prepends_and_resets_form_and_search() {
        let (mut tracker, _) = tracker_with_two().await;
        tracker.type_search("dev");
        tracker.commit_search();
        fill(&mut tracker, "QA");
        tracker.set_status(Status::Interview);
        tracker.submit().await;

        assert_eq!(tracker.jobs()[0].title, "QA");
        assert_eq!(tracker.jobs()[0].status, Status::Interview);
        assert_eq!(tracker.jobs().len(), 3);
        assert_eq!(tracker.form(), &JobForm::default());
        assert_eq!(tracker.search_term(), "");
        assert_eq!(tracker.committed_search(), "");
        assert_eq!(titles(&tracker).len(), 3);
    }

    #[tokio::test]
    async fn incomplete_form_is_not_submitted() {
        let (mut tracker, api) = tracker_with_two().await;
        tracker.set_field(Field::Title, "QA");
        tracker.set_field(Field::Company, "C");
        tracker.submit().await;
        assert_eq!(tracker.jobs().len(), 2);
        assert_eq!(api.store.list_all().await.unwrap().len(), 2);
        assert_eq!(tracker.form().title, "QA");
    }

    #[tokio::test]
    async fn edit_replaces_in_place() {
        let (mut tracker, api) = tracker_with_two().await;
        assert!(tracker.edit(1));
        assert_eq!(tracker.form().title, "PM");
        assert_eq!(tracker.editing(), Some(1));

        tracker.set_field(Field::Title, "Lead PM");
        tracker.submit().await;

        assert_eq!(tracker.jobs().len(), 2);
        assert_eq!(tracker.jobs()[1].title, "Lead PM");
        assert_eq!(tracker.jobs()[1].status, Status::Offer);
        assert_eq!(tracker.editing(), None);
        assert_eq!(api.store.list_all().await.unwrap()[1].title, "Lead PM");
    }

    #[tokio::test]
    async fn edit_of_record_gone_on_server_drops_it_locally() {
        let (mut tracker, api) = tracker_with_two().await;
        let id = tracker.jobs()[0].id;
        api.store.delete_by_id(id).await.unwrap();
        tracker.edit(0);
        tracker.submit().await;
        assert_eq!(titles(&tracker), vec!["PM"]);
        assert_eq!(tracker.editing(), None);
    }

    #[tokio::test]
    async fn failed_writes_leave_state_alone() {
        let (mut tracker, api) = tracker_with_two().await;
        api.down.store(true, Ordering::SeqCst);

        fill(&mut tracker, "QA");
        tracker.submit().await;
        assert_eq!(tracker.jobs().len(), 2);
        assert_eq!(tracker.form().title, "QA");

        tracker.delete(0).await;
        assert_eq!(tracker.jobs().len(), 2);
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation_and_shifts_edit_index() {
        let (mut tracker, api) = tracker_with_two().await;
        tracker.edit(1);
        tracker.delete(0).await;
        assert_eq!(titles(&tracker), vec!["PM"]);
        assert_eq!(tracker.editing(), Some(0));
        assert_eq!(api.store.list_all().await.unwrap().len(), 1);

        tracker.delete(0).await;
        assert!(tracker.jobs().is_empty());
        assert_eq!(tracker.editing(), None);
        assert_eq!(tracker.form(), &JobForm::default());
    }

    #[tokio::test]
    async fn failed_hydrate_keeps_empty_list() {
        let api = FakeApi::default();
        api.seed("Dev", "A", Status::Applied).await;
        api.down.store(true, Ordering::SeqCst);
        let mut tracker = Tracker::new(api);
        tracker.hydrate().await;
        assert!(tracker.jobs().is_empty());
    }

    #[test]
    fn status_filter_parses_all_and_statuses() {
        assert_eq!("All".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Rejected".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(Status::Rejected))
        );
        assert!("none".parse::<StatusFilter>().is_err());
    }
}
