use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, validation::NumberOrText};

pub type CardId = i64;

/// The day of the month a credit card bill is due, between 1 and 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DueDay(u8);

impl DueDay {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 31;

    /// Create a due day from a number.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDueDay] if `day` is outside `1..=31`.
    pub fn new(day: i64) -> Result<Self, Error> {
        u8::try_from(day)
            .ok()
            .filter(|day| (Self::MIN..=Self::MAX).contains(day))
            .map(Self)
            .ok_or_else(|| Error::InvalidDueDay(day.to_string()))
    }

    /// Parse a due day entered by the user, e.g. "10".
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDueDay] if `raw` is not a whole number between 1 and 31.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidDueDay(raw.to_owned()))
            .and_then(Self::new)
            .map_err(|_| Error::InvalidDueDay(raw.to_owned()))
    }

    /// Parse a due day sent as either a JSON number or a string.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDueDay] if the value is not a whole number between 1 and 31.
    pub fn from_json(value: &NumberOrText) -> Result<Self, Error> {
        value
            .to_integer()
            .ok_or_else(|| Error::InvalidDueDay(value.raw()))
            .and_then(Self::new)
            .map_err(|_| Error::InvalidDueDay(value.raw()))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DueDay {
    type Error = Error;

    fn try_from(day: u8) -> Result<Self, Self::Error> {
        Self::new(day.into())
    }
}

impl From<DueDay> for u8 {
    fn from(due_day: DueDay) -> Self {
        due_day.0
    }
}

impl Display for DueDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for DueDay {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for DueDay {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Self::new(value.as_i64()?).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A credit card the user wants to keep track of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// The id for the card.
    pub id: CardId,
    /// The user the card belongs to.
    pub user_id: UserID,
    /// A name for the card, e.g. the bank it was issued by.
    pub name: String,
    /// The day of the month the bill is due.
    pub due_day: DueDay,
}

pub fn create_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS card (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            due_day INTEGER NOT NULL CHECK (due_day BETWEEN 1 AND 31),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_card(row: &Row) -> Result<Card, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let name = row.get(2)?;
    let due_day = row.get(3)?;

    Ok(Card {
        id,
        user_id,
        name,
        due_day,
    })
}

/// Store a new card for `user_id`.
///
/// # Errors
/// Returns an [Error::MissingField] if `name` is blank,
/// or an [Error::SqlError] if there is an SQL error.
pub fn create_card(
    user_id: UserID,
    name: &str,
    due_day: DueDay,
    connection: &Connection,
) -> Result<Card, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::MissingField("name"));
    }

    connection
        .prepare(
            "INSERT INTO card (user_id, name, due_day) VALUES (?1, ?2, ?3)
             RETURNING id, user_id, name, due_day",
        )?
        .query_row((user_id.as_i64(), name, due_day), map_row_to_card)
        .map_err(Error::from)
}

/// Get the cards of `user_id` in the order they were added.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_cards(user_id: UserID, connection: &Connection) -> Result<Vec<Card>, Error> {
    connection
        .prepare("SELECT id, user_id, name, due_day FROM card WHERE user_id = ?1 ORDER BY id")?
        .query_map([user_id.as_i64()], map_row_to_card)?
        .map(|maybe_card| maybe_card.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod due_day_tests {
    use crate::{Error, validation::NumberOrText};

    use super::DueDay;

    #[test]
    fn accepts_bounds() {
        assert_eq!(DueDay::new(1).map(|day| day.get()), Ok(1));
        assert_eq!(DueDay::new(31).map(|day| day.get()), Ok(31));
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(DueDay::new(0), Err(Error::InvalidDueDay("0".to_owned())));
        assert_eq!(DueDay::new(32), Err(Error::InvalidDueDay("32".to_owned())));
        assert_eq!(DueDay::new(-1), Err(Error::InvalidDueDay("-1".to_owned())));
    }

    #[test]
    fn parses_user_input() {
        assert_eq!(DueDay::parse(" 10 ").map(|day| day.get()), Ok(10));
        assert_eq!(DueDay::parse("ten"), Err(Error::InvalidDueDay("ten".to_owned())));
        assert_eq!(DueDay::parse("32"), Err(Error::InvalidDueDay("32".to_owned())));
    }

    #[test]
    fn parses_json_numbers_and_strings() {
        assert_eq!(
            DueDay::from_json(&NumberOrText::Number(5.0)).map(|day| day.get()),
            Ok(5)
        );
        assert_eq!(
            DueDay::from_json(&NumberOrText::Text("31".to_owned())).map(|day| day.get()),
            Ok(31)
        );
        assert!(DueDay::from_json(&NumberOrText::Number(5.5)).is_err());
    }

    #[test]
    fn deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<DueDay>("0").is_err());
        assert_eq!(serde_json::from_str::<DueDay>("12").map(|day| day.get()).ok(), Some(12));
    }
}
