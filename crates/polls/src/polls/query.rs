use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::domain::QuestionRecord;

/// Number of questions surfaced on the index feed.
pub const LATEST_QUESTIONS_LIMIT: usize = 5;

/// Ordering applied to question listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOrder {
    /// `pub_date` descending, ties broken by id descending.
    #[default]
    NewestFirst,
    /// Most recently created first (id descending).
    RecentlyCreated,
}

/// Calendar buckets offered by the admin `pub_date` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PubDateFilter {
    #[default]
    Any,
    Today,
    #[serde(rename = "past_7_days")]
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl PubDateFilter {
    /// Half-open `[start, end)` range covered by the bucket, relative to `now`.
    pub fn bounds(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        let tomorrow = today.succ_opt()?;
        let (start, end) = match self {
            Self::Any => return None,
            Self::Today => (today, tomorrow),
            Self::Past7Days => (today - Duration::days(7), tomorrow),
            Self::ThisMonth => {
                let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?;
                let end = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                (start, end)
            }
            Self::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
            ),
        };

        Some((midnight(start)?, midnight(end)?))
    }

    pub fn matches(self, pub_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.bounds(now) {
            Some((start, end)) => start <= pub_date && pub_date < end,
            None => true,
        }
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
}

/// Declarative question query evaluated by a [`super::PollRepository`].
#[derive(Debug, Clone, Default)]
pub struct QuestionQuery {
    /// Keep only questions whose `pub_date` is at or before this instant.
    pub published_as_of: Option<DateTime<Utc>>,
    /// Keep only questions owning at least one choice.
    pub require_choices: bool,
    /// Case-insensitive substring match on `question_text`.
    pub search: Option<String>,
    /// Calendar bucket on `pub_date`, evaluated against `reference_time`.
    pub pub_date_filter: PubDateFilter,
    pub reference_time: Option<DateTime<Utc>>,
    pub order: QuestionOrder,
    pub limit: Option<usize>,
}

impl QuestionQuery {
    /// Published questions that can be voted on, newest first, capped at `limit`.
    pub fn latest_votable(now: DateTime<Utc>, limit: usize) -> Self {
        Self {
            published_as_of: Some(now),
            require_choices: true,
            order: QuestionOrder::NewestFirst,
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &QuestionRecord) -> bool {
        let question = &record.question;

        if let Some(now) = self.published_as_of {
            if !question.is_published(now) {
                return false;
            }
        }

        if self.require_choices && !record.has_choices() {
            return false;
        }

        if let Some(term) = self.search_term() {
            if !question.question_text.to_lowercase().contains(&term) {
                return false;
            }
        }

        match self.reference_time {
            Some(now) => self.pub_date_filter.matches(question.pub_date, now),
            None => true,
        }
    }

    /// Filter, order and truncate a snapshot of records.
    pub fn select<'a, I>(&self, records: I) -> Vec<QuestionRecord>
    where
        I: IntoIterator<Item = &'a QuestionRecord>,
    {
        let mut selected: Vec<QuestionRecord> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();

        match self.order {
            QuestionOrder::NewestFirst => selected.sort_by(|a, b| {
                b.question
                    .pub_date
                    .cmp(&a.question.pub_date)
                    .then_with(|| b.id().cmp(&a.id()))
            }),
            QuestionOrder::RecentlyCreated => selected.sort_by(|a, b| b.id().cmp(&a.id())),
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }
}
