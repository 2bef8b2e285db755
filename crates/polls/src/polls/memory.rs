use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{Choice, ChoiceId, NewQuestion, Question, QuestionId, QuestionRecord};
use super::query::QuestionQuery;
use super::repository::{PollRepository, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    questions: BTreeMap<QuestionId, QuestionRecord>,
    last_question_id: u64,
    last_choice_id: u64,
}

impl Tables {
    fn next_question_id(&mut self) -> QuestionId {
        self.last_question_id += 1;
        QuestionId(self.last_question_id)
    }

    fn next_choice_id(&mut self) -> ChoiceId {
        self.last_choice_id += 1;
        ChoiceId(self.last_choice_id)
    }
}

/// Process-local store. Choices live inside their question's record, and all mutation
/// happens under one lock so concurrent votes cannot lose updates.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPollRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPollRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables
            .lock()
            .expect("repository mutex poisoned")
            .questions
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PollRepository for InMemoryPollRepository {
    fn get_question(&self, id: QuestionId) -> Result<Option<QuestionRecord>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.questions.get(&id).cloned())
    }

    fn list_questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<Vec<QuestionRecord>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(query.select(guard.questions.values()))
    }

    fn get_choice(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Option<Choice>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard
            .questions
            .get(&question_id)
            .and_then(|record| record.choice(choice_id))
            .cloned())
    }

    fn increment_votes(
        &self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Choice, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let choice = guard
            .questions
            .get_mut(&question_id)
            .and_then(|record| {
                record
                    .choices
                    .iter_mut()
                    .find(|choice| choice.id == choice_id)
            })
            .ok_or(RepositoryError::NotFound)?;

        choice.votes = choice
            .votes
            .checked_add(1)
            .ok_or(RepositoryError::TallyOverflow)?;
        Ok(choice.clone())
    }

    fn insert_question(&self, draft: NewQuestion) -> Result<QuestionRecord, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let question_id = guard.next_question_id();

        let texts: Vec<String> = draft.filled_choices().map(str::to_string).collect();
        let mut choices = Vec::with_capacity(texts.len());
        for choice_text in texts {
            choices.push(Choice {
                id: guard.next_choice_id(),
                question_id,
                choice_text,
                votes: 0,
            });
        }

        let record = QuestionRecord {
            question: Question {
                id: question_id,
                question_text: draft.question_text,
                pub_date: draft.pub_date,
            },
            choices,
        };
        guard.questions.insert(question_id, record.clone());
        Ok(record)
    }

    fn insert_choice(
        &self,
        question_id: QuestionId,
        choice_text: String,
    ) -> Result<Choice, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if !guard.questions.contains_key(&question_id) {
            return Err(RepositoryError::NotFound);
        }

        let choice = Choice {
            id: guard.next_choice_id(),
            question_id,
            choice_text,
            votes: 0,
        };
        guard
            .questions
            .get_mut(&question_id)
            .ok_or(RepositoryError::NotFound)?
            .choices
            .push(choice.clone());
        Ok(choice)
    }
}
