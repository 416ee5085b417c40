use crate::models::Question;

/// The immutable set of questions a quiz samples from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank, discarding questions whose text is blank.
    pub fn new(questions: Vec<Question>) -> Self {
        let questions = questions
            .into_iter()
            .filter(|question| !question.text.trim().is_empty())
            .collect();
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
