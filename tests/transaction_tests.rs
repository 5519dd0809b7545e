//! Transactions spanning several operations, and authentication.

mod common;

use scholar_dal::core::db::authenticate;
use scholar_dal::{
    AuthenticationTransaction, BatchTransaction, Connector, Operation, Outcome, Parameters,
    Readable, ResultSet, TransactionHandler, TransactionStrategy, TransactionType,
};

fn enroll(student_id: &str, course: &str) -> Operation {
    let params = Parameters::new()
        .with("@student", student_id)
        .and_then(|p| p.with("@course", course))
        .unwrap();
    Operation::new(
        "INSERT INTO enrollments (student_id, course) VALUES (@student, @course)",
        params,
    )
}

fn enrollment_count(connector: &Connector) -> String {
    connector
        .execute_query("SELECT count(*) AS n FROM enrollments", None)
        .unwrap()
        .get(0)
        .unwrap()
        .get_value("n")
        .to_string()
}

#[test]
fn batch_commit_keeps_every_write() {
    let (mut connector, _) = common::registrar();
    let mut handler = TransactionHandler::new(
        &mut connector,
        BatchTransaction::new(vec![enroll("3", "CS101"), enroll("3", "MA201")]),
    );
    let result = handler.execute_transaction().unwrap();
    assert!(result.is_pass());
    assert_eq!(handler.commit(), Outcome::Success);
    drop(handler);

    assert_eq!(enrollment_count(&connector), "4");
}

#[test]
fn batch_error_rolls_back_earlier_writes() {
    let (mut connector, _) = common::registrar();
    // The second insert repeats the primary key of the first.
    let batch = BatchTransaction::new(vec![
        enroll("3", "CS101"),
        enroll("3", "CS101"),
        enroll("3", "MA201"),
    ]);
    let mut handler = TransactionHandler::new(&mut connector, batch);
    handler.execute_transaction().unwrap();
    assert_eq!(handler.status(), Outcome::Error);
    assert_eq!(handler.complete(), Outcome::Failure);
    drop(handler);

    assert_eq!(enrollment_count(&connector), "2");
}

#[test]
fn commit_after_commit_is_error() {
    let (mut connector, _) = common::registrar();
    let batch = BatchTransaction::new(vec![enroll("3", "CS101")]);
    let mut handler = TransactionHandler::new(&mut connector, batch);
    handler.execute_transaction().unwrap();
    assert_eq!(handler.commit(), Outcome::Success);
    assert_eq!(handler.commit(), Outcome::Error);
    assert_eq!(handler.rollback(), Outcome::Error);
    assert_eq!(handler.status(), Outcome::Error);
}

/// Moves a student between courses: reads first, writes using what it read.
struct TransferStrategy {
    student: String,
}

impl TransactionStrategy for TransferStrategy {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Custom("transfer".to_string())
    }

    fn execute(&mut self, connector: &Connector) -> scholar_dal::Result<ResultSet> {
        let params = Parameters::new().with("@student", self.student.as_str())?;
        let mut lookup = Operation::query(
            "SELECT course FROM enrollments WHERE student_id = @student",
            params.clone(),
        );
        let current = lookup.execute(connector)?;
        let Some(row) = current.first() else {
            let mut empty = ResultSet::new();
            empty.fail();
            return Ok(empty);
        };

        let params = params.with("@course", row.get_value("course"))?;
        Operation::command(
            "UPDATE enrollments SET course = 'CS102'
             WHERE student_id = @student AND course = @course",
            params,
        )
        .execute(connector)
    }
}

#[test]
fn custom_strategy_runs_in_order() {
    let (mut connector, _) = common::registrar();
    let transfer = TransferStrategy {
        student: "1".to_string(),
    };
    let mut handler = TransactionHandler::new(&mut connector, transfer);
    assert_eq!(handler.transaction_id().to_string(), "transfer");

    let result = handler.execute_transaction().unwrap();
    assert_eq!(result.rows_affected(), 1);
    assert_eq!(handler.commit(), Outcome::Success);
    drop(handler);

    let set = connector
        .execute_query("SELECT course FROM enrollments WHERE student_id = 1", None)
        .unwrap();
    assert_eq!(set.column("course"), vec!["CS102"]);
}

#[test]
fn unknown_user_is_neither_authenticated_nor_authorized() {
    let (mut connector, _) = common::registrar();
    let mut handler = TransactionHandler::new(
        &mut connector,
        AuthenticationTransaction::new("mallory", "guess").authorized_by(|_| true),
    );
    handler.execute_transaction().unwrap();
    handler.complete();

    assert!(!handler.is_authenticated());
    assert!(!handler.is_authorized());
}

#[test]
fn registered_user_authenticates() {
    let (mut connector, _) = common::registrar();
    common::add_user(&connector, "ta", "grading", Some("assistant"));

    assert_eq!(
        authenticate(
            &mut connector,
            AuthenticationTransaction::new("registrar", "ledger"),
        )
        .unwrap(),
        (true, true)
    );
    assert_eq!(
        authenticate(
            &mut connector,
            AuthenticationTransaction::new("ta", "grading").requiring_role("registrar")
        )
        .unwrap(),
        (true, false)
    );
    assert_eq!(
        authenticate(&mut connector, AuthenticationTransaction::new("ta", "GRADING")).unwrap(),
        (false, false)
    );
}
