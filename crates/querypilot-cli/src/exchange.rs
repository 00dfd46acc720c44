//! Question/answer lifecycle for a selected connection.
//!
//! An exchange moves from [`ExchangeState::Idle`] to `Submitted` when a
//! question passes local validation, then settles into exactly one of
//! `Completed`, `Rejected` (the server denied access) or `Failed`. Every
//! submission gets a fresh generation number; a response only applies if
//! its generation still matches, so the latest submission always wins and
//! answers to abandoned questions are dropped.

use querypilot_core::wire::AskResponse;
use querypilot_core::{ApiError, TableResult};

/// Where an exchange currently stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExchangeState {
    /// No question in flight.
    #[default]
    Idle,
    /// Question sent, answer pending.
    Submitted { question: String },
    /// The server denied access to the connection. Terminal.
    Rejected { message: String },
    /// The question was answered.
    Completed {
        sql: String,
        table: TableResult,
        safety_check: String,
    },
    /// The question was accepted but could not be answered.
    Failed { message: String },
}

/// A question handed out by [`QueryExchange::submit`], ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub generation: u64,
    pub connection_id: i64,
    pub question: String,
}

/// Tracks one connection's question/answer lifecycle.
#[derive(Debug, Default)]
pub struct QueryExchange {
    state: ExchangeState,
    connection_id: Option<i64>,
    generation: u64,
}

impl QueryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &ExchangeState {
        &self.state
    }

    pub const fn connection_id(&self) -> Option<i64> {
        self.connection_id
    }

    /// Point the exchange at a connection.
    ///
    /// Resets any previous outcome and invalidates responses still in
    /// flight for the old connection.
    pub fn select_connection(&mut self, connection_id: i64) {
        self.connection_id = Some(connection_id);
        self.state = ExchangeState::Idle;
        self.generation += 1;
    }

    /// Validate a question locally and move to `Submitted`.
    ///
    /// A blank question or a missing connection fails without touching
    /// the current state, so an earlier answer stays on display.
    pub fn submit(&mut self, question: &str) -> Result<Submission, ApiError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ApiError::Validation("Question must not be empty".into()));
        }
        let Some(connection_id) = self.connection_id else {
            return Err(ApiError::Validation("No connection selected".into()));
        };

        self.generation += 1;
        self.state = ExchangeState::Submitted {
            question: question.to_string(),
        };
        Ok(Submission {
            generation: self.generation,
            connection_id,
            question: question.to_string(),
        })
    }

    /// Apply the server's answer for a submission.
    ///
    /// Returns whether the outcome was applied. A response whose
    /// generation no longer matches is stale and changes nothing.
    pub fn resolve(&mut self, generation: u64, outcome: Result<AskResponse, ApiError>) -> bool {
        if generation != self.generation {
            return false;
        }

        self.state = match outcome {
            Ok(resp) => ExchangeState::Completed {
                sql: resp.sql,
                table: TableResult::from_rows(&resp.result),
                safety_check: resp.safety_check,
            },
            Err(ApiError::Authorization(message)) => ExchangeState::Rejected { message },
            Err(other) => ExchangeState::Failed {
                message: other.to_string(),
            },
        };
        true
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(sql: &str) -> AskResponse {
        AskResponse {
            sql: sql.into(),
            result: serde_json::from_value(json!([{"id": 1}])).unwrap(),
            safety_check: "PASSED".into(),
        }
    }

    #[test]
    fn submit_requires_a_connection() {
        let mut exchange = QueryExchange::new();
        let err = exchange.submit("how many users?").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(*exchange.state(), ExchangeState::Idle);
    }

    #[test]
    fn blank_question_fails_without_touching_state() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("how many users?").unwrap();
        assert!(exchange.resolve(sub.generation, Ok(answer("SELECT 1"))));

        let before = exchange.state().clone();
        let err = exchange.submit("   ").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(*exchange.state(), before);
    }

    #[test]
    fn submit_trims_and_moves_to_submitted() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("  top customers?  ").unwrap();
        assert_eq!(sub.question, "top customers?");
        assert_eq!(sub.connection_id, 3);
        assert_eq!(
            *exchange.state(),
            ExchangeState::Submitted {
                question: "top customers?".into()
            }
        );
    }

    #[test]
    fn successful_answer_completes() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("how many users?").unwrap();
        assert!(exchange.resolve(sub.generation, Ok(answer("SELECT COUNT(*) FROM users"))));

        let ExchangeState::Completed {
            sql,
            table,
            safety_check,
        } = exchange.state()
        else {
            panic!("expected Completed, got {:?}", exchange.state());
        };
        assert_eq!(sql, "SELECT COUNT(*) FROM users");
        assert_eq!(table.row_count(), 1);
        assert_eq!(safety_check, "PASSED");
    }

    #[test]
    fn a_warning_verdict_still_carries_rows() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("delete all orders").unwrap();
        let resp = AskResponse {
            sql: "DELETE FROM orders".into(),
            result: serde_json::from_value(json!([{"affected": 3}])).unwrap(),
            safety_check: "WARNING: destructive statement".into(),
        };
        assert!(exchange.resolve(sub.generation, Ok(resp)));

        let ExchangeState::Completed {
            table,
            safety_check,
            ..
        } = exchange.state()
        else {
            panic!("expected Completed, got {:?}", exchange.state());
        };
        assert_eq!(safety_check, "WARNING: destructive statement");
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn access_denial_rejects_with_the_server_message() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("how many users?").unwrap();
        let denied = ApiError::Authorization("You do not have access to connection 3".into());
        assert!(exchange.resolve(sub.generation, Err(denied)));

        assert_eq!(
            *exchange.state(),
            ExchangeState::Rejected {
                message: "You do not have access to connection 3".into()
            }
        );
    }

    #[test]
    fn other_failures_fail_the_exchange() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("how many users?").unwrap();
        let err = ApiError::Execution("table users does not exist".into());
        assert!(exchange.resolve(sub.generation, Err(err)));

        assert_eq!(
            *exchange.state(),
            ExchangeState::Failed {
                message: "table users does not exist".into()
            }
        );
    }

    #[test]
    fn stale_response_is_ignored() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let first = exchange.submit("question one").unwrap();
        let second = exchange.submit("question two").unwrap();

        assert!(!exchange.resolve(first.generation, Ok(answer("SELECT 1"))));
        assert_eq!(
            *exchange.state(),
            ExchangeState::Submitted {
                question: "question two".into()
            }
        );

        assert!(exchange.resolve(second.generation, Ok(answer("SELECT 2"))));
        let ExchangeState::Completed { sql, .. } = exchange.state() else {
            panic!("expected Completed, got {:?}", exchange.state());
        };
        assert_eq!(sql, "SELECT 2");
    }

    #[test]
    fn switching_connection_drops_in_flight_answers() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let sub = exchange.submit("how many users?").unwrap();

        exchange.select_connection(4);
        assert!(!exchange.resolve(sub.generation, Ok(answer("SELECT 1"))));
        assert_eq!(*exchange.state(), ExchangeState::Idle);
        assert_eq!(exchange.connection_id(), Some(4));
    }

    #[test]
    fn resubmitting_after_an_outcome_starts_a_new_generation() {
        let mut exchange = QueryExchange::new();
        exchange.select_connection(3);
        let first = exchange.submit("question one").unwrap();
        assert!(exchange.resolve(first.generation, Ok(answer("SELECT 1"))));

        let second = exchange.submit("question two").unwrap();
        assert!(second.generation > first.generation);
        assert!(matches!(
            exchange.state(),
            ExchangeState::Submitted { .. }
        ));
    }
}
