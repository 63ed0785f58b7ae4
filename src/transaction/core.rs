//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, TransactionBehavior,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, auth::UserID};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// The payment method for purchases made on a credit card.
pub const CREDIT_CARD_PAYMENT_METHOD: &str = "Cartao de Credito";

/// The payment methods offered when adding a transaction.
pub const PAYMENT_METHODS: [&str; 5] = [
    "Pix",
    "Dinheiro",
    "Cartao de Debito",
    CREDIT_CARD_PAYMENT_METHOD,
    "Transferencia",
];

/// The categories suggested to users that have not used any yet.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Housing",
    "Health",
    "Leisure",
    "Salary",
    "Other",
];

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidTransactionType(s.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

mod rfc3339 {
    //! Serializes dates as RFC 3339 strings, e.g. "2025-03-01T12:00:00Z".
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// The amount of money spent or earned, always non-negative.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// How the money was paid, e.g. "Pix" or "Cartao de Credito".
    pub payment_method: Option<String>,
    /// A free text category, e.g. "Food".
    pub category: Option<String>,
    /// When the transaction happened, in UTC.
    #[serde(with = "rfc3339")]
    pub date: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(type_: TransactionType, amount: f64) -> TransactionBuilder {
        TransactionBuilder {
            type_,
            amount,
            description: None,
            payment_method: None,
            category: None,
            date: None,
        }
    }

    /// The amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> f64 {
        match self.type_ {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// let transaction = Transaction::build(TransactionType::Expense, 45.99)
///     .category(Some("Food".to_owned()))
///     .payment_method(Some("Pix".to_owned()));
/// create_transaction(user_id, transaction, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub type_: TransactionType,

    /// The magnitude of the transaction, validated to be finite and non-negative.
    pub amount: f64,

    pub description: Option<String>,

    pub payment_method: Option<String>,

    pub category: Option<String>,

    /// When the transaction happened.
    ///
    /// Defaults to the time the transaction is stored.
    pub date: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn payment_method(mut self, payment_method: Option<String>) -> Self {
        self.payment_method = payment_method;
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn date(mut self, date: OffsetDateTime) -> Self {
        self.date = Some(date);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, type, amount, description, payment_method, category, date FROM \"transaction\"";

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `user_id` does not belong to a registered user.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let date = builder
        .date
        .unwrap_or_else(OffsetDateTime::now_utc)
        .to_offset(UtcOffset::UTC);

    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, type, amount, description, payment_method, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, type, amount, description, payment_method, category, date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.type_,
                builder.amount,
                builder.description,
                builder.payment_method,
                builder.category,
                date,
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(Error::from)
}

/// Retrieve the transaction `id` on behalf of `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::Forbidden] if the transaction belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_owned_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(id, connection)?;

    if transaction.user_id != user_id {
        tracing::warn!("User {user_id} tried to access transaction {id} of another user");
        return Err(Error::Forbidden);
    }

    Ok(transaction)
}

/// Get the transactions of `user_id` dated within `[start, end)`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_in_range(
    user_id: UserID,
    start: OffsetDateTime,
    end: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            (
                user_id.as_i64(),
                start.to_offset(UtcOffset::UTC),
                end.to_offset(UtcOffset::UTC),
            ),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get every transaction of `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the dates of every transaction of `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transaction_dates(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<OffsetDateTime>, Error> {
    connection
        .prepare("SELECT date FROM \"transaction\" WHERE user_id = ?1")?
        .query_map([user_id.as_i64()], |row| row.get(0))?
        .map(|maybe_date| maybe_date.map_err(Error::from))
        .collect()
}

/// Get the distinct categories `user_id` has used, sorted alphabetically.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(
            "SELECT DISTINCT category FROM \"transaction\"
             WHERE user_id = ?1 AND category IS NOT NULL AND category != ''
             ORDER BY category",
        )?
        .query_map([user_id.as_i64()], |row| row.get(0))?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Write every field of `transaction` except its owner and date to the database.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET type = ?1, amount = ?2, description = ?3, payment_method = ?4, category = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            transaction.type_,
            transaction.amount,
            &transaction.description,
            &transaction.payment_method,
            &transaction.category,
            transaction.id,
            transaction.user_id.as_i64(),
        ),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

pub type RowsAffected = usize;

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

/// Delete every transaction of `user_id` in a single database transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// in which case no transactions are deleted.
pub fn clear_transactions(user_id: UserID, connection: &Connection) -> Result<RowsAffected, Error> {
    let sql_transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let rows_affected = sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE user_id = ?1",
        [user_id.as_i64()],
    )?;

    sql_transaction.commit()?;

    Ok(rows_affected)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL,
                description TEXT,
                payment_method TEXT,
                category TEXT,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Add composite index used by the dashboard and reports pages.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        type_: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        payment_method: row.get(5)?,
        category: row.get(6)?,
        date: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error, UserID,
        db::initialize,
        test_utils::{create_named_user, create_test_user},
    };

    use super::{
        Transaction, TransactionType, clear_transactions, create_transaction, delete_transaction,
        get_categories, get_owned_transaction, get_transaction, get_transaction_dates,
        get_transactions, get_transactions_in_range, update_transaction,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_test_user(&conn);
        (conn, user.id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_test_connection();
        let date = datetime!(2025-10-05 10:30 UTC);

        let transaction = create_transaction(
            user_id,
            Transaction::build(TransactionType::Expense, 12.3)
                .category(Some("Food".to_owned()))
                .date(date),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.type_, TransactionType::Expense);
        assert_eq!(transaction.category.as_deref(), Some("Food"));
        assert_eq!(transaction.date, date);
        assert_eq!(get_transaction(transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn create_defaults_date_to_now() {
        let (conn, user_id) = get_test_connection();

        let transaction =
            create_transaction(user_id, Transaction::build(TransactionType::Income, 1.0), &conn)
                .unwrap();

        assert!((OffsetDateTime::now_utc() - transaction.date).abs() < time::Duration::seconds(2));
    }

    #[test]
    fn create_fails_for_unknown_user() {
        let (conn, _) = get_test_connection();

        let result = create_transaction(
            UserID::new(999),
            Transaction::build(TransactionType::Income, 1.0),
            &conn,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn get_owned_transaction_checks_owner() {
        let (conn, user_id) = get_test_connection();
        let other = create_named_user("other", "other@example.com", &conn);
        let transaction =
            create_transaction(user_id, Transaction::build(TransactionType::Income, 1.0), &conn)
                .unwrap();

        assert_eq!(
            get_owned_transaction(transaction.id, user_id, &conn),
            Ok(transaction.clone())
        );
        assert_eq!(
            get_owned_transaction(transaction.id, other.id, &conn),
            Err(Error::Forbidden)
        );
        assert_eq!(
            get_owned_transaction(transaction.id + 1, user_id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn range_query_is_half_open_and_per_user() {
        let (conn, user_id) = get_test_connection();
        let other = create_named_user("other", "other@example.com", &conn);
        let dates = [
            datetime!(2025-02-28 23:59:59 UTC),
            datetime!(2025-03-01 00:00 UTC),
            datetime!(2025-03-31 23:59:59 UTC),
            datetime!(2025-04-01 00:00 UTC),
        ];
        for date in dates {
            create_transaction(
                user_id,
                Transaction::build(TransactionType::Expense, 1.0).date(date),
                &conn,
            )
            .unwrap();
        }
        create_transaction(
            other.id,
            Transaction::build(TransactionType::Expense, 1.0).date(dates[1]),
            &conn,
        )
        .unwrap();

        let got = get_transactions_in_range(
            user_id,
            datetime!(2025-03-01 00:00 UTC),
            datetime!(2025-04-01 00:00 UTC),
            &conn,
        )
        .unwrap();

        let got_dates: Vec<_> = got.iter().map(|transaction| transaction.date).collect();
        assert_eq!(got_dates, vec![dates[2], dates[1]]);
    }

    #[test]
    fn lists_all_transactions_dates_and_categories() {
        let (conn, user_id) = get_test_connection();
        for (category, date) in [
            (Some("Food"), datetime!(2024-05-01 12:00 UTC)),
            (Some("Bills"), datetime!(2025-01-01 12:00 UTC)),
            (Some("Food"), datetime!(2025-02-01 12:00 UTC)),
            (None, datetime!(2025-03-01 12:00 UTC)),
        ] {
            create_transaction(
                user_id,
                Transaction::build(TransactionType::Expense, 1.0)
                    .category(category.map(str::to_owned))
                    .date(date),
                &conn,
            )
            .unwrap();
        }

        assert_eq!(get_transactions(user_id, &conn).unwrap().len(), 4);
        assert_eq!(get_transaction_dates(user_id, &conn).unwrap().len(), 4);
        assert_eq!(get_categories(user_id, &conn).unwrap(), vec!["Bills", "Food"]);
    }

    #[test]
    fn update_replaces_fields() {
        let (conn, user_id) = get_test_connection();
        let mut transaction = create_transaction(
            user_id,
            Transaction::build(TransactionType::Expense, 5.0).category(Some("Food".to_owned())),
            &conn,
        )
        .unwrap();

        transaction.type_ = TransactionType::Income;
        transaction.amount = 7.5;
        transaction.category = None;
        transaction.description = Some("refund".to_owned());
        update_transaction(&transaction, &conn).unwrap();

        assert_eq!(get_transaction(transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (conn, user_id) = get_test_connection();
        let mut transaction =
            create_transaction(user_id, Transaction::build(TransactionType::Expense, 5.0), &conn)
                .unwrap();
        transaction.id += 1;

        assert_eq!(update_transaction(&transaction, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_and_clear() {
        let (conn, user_id) = get_test_connection();
        let other = create_named_user("other", "other@example.com", &conn);
        let first =
            create_transaction(user_id, Transaction::build(TransactionType::Expense, 1.0), &conn)
                .unwrap();
        for _ in 0..3 {
            create_transaction(user_id, Transaction::build(TransactionType::Expense, 1.0), &conn)
                .unwrap();
        }
        create_transaction(other.id, Transaction::build(TransactionType::Expense, 1.0), &conn)
            .unwrap();

        assert_eq!(delete_transaction(first.id, &conn), Ok(1));
        assert_eq!(get_transaction(first.id, &conn), Err(Error::NotFound));
        assert_eq!(clear_transactions(user_id, &conn), Ok(3));
        assert!(get_transactions(user_id, &conn).unwrap().is_empty());
        assert_eq!(get_transactions(other.id, &conn).unwrap().len(), 1);
    }
}
