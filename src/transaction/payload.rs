//! The JSON body for creating and editing transactions.

use serde::Deserialize;

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder, TransactionType},
    validation::{NumberOrText, optional_text},
};

/// The transaction fields sent by the client as JSON.
///
/// Every field is optional here so that each use can decide which fields are required.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TransactionPayload {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub amount: Option<NumberOrText>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub category: Option<String>,
}

impl TransactionPayload {
    fn parse_type(raw: Option<&str>) -> Result<TransactionType, Error> {
        match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse(),
            _ => Err(Error::MissingField("type")),
        }
    }

    fn parse_amount(raw: Option<&NumberOrText>) -> Result<f64, Error> {
        match raw {
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => {
                Err(Error::MissingField("amount"))
            }
            Some(amount) => amount.to_amount(),
            None => Err(Error::MissingField("amount")),
        }
    }

    /// Validate the payload as a new transaction, which needs a type and an amount.
    ///
    /// # Errors
    ///
    /// Returns an [Error::MissingField] if the type or amount is missing,
    /// an [Error::InvalidTransactionType] or an [Error::InvalidAmount].
    pub fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let type_ = Self::parse_type(self.type_.as_deref())?;
        let amount = Self::parse_amount(self.amount.as_ref())?;

        Ok(Transaction::build(type_, amount)
            .description(optional_text(self.description.as_deref()))
            .payment_method(optional_text(self.payment_method.as_deref()))
            .category(optional_text(self.category.as_deref())))
    }

    /// Replace every editable field of `transaction` with the payload.
    ///
    /// Missing optional fields are cleared. `transaction` is left untouched on error.
    ///
    /// # Errors
    ///
    /// See [TransactionPayload::into_builder].
    pub fn replace(self, transaction: &mut Transaction) -> Result<(), Error> {
        let builder = self.into_builder()?;

        transaction.type_ = builder.type_;
        transaction.amount = builder.amount;
        transaction.description = builder.description;
        transaction.payment_method = builder.payment_method;
        transaction.category = builder.category;

        Ok(())
    }

    /// Update only the fields of `transaction` that are present in the payload.
    ///
    /// `transaction` is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTransactionType] or an [Error::InvalidAmount]
    /// if a given type or amount is invalid.
    pub fn merge(self, transaction: &mut Transaction) -> Result<(), Error> {
        let type_ = self
            .type_
            .as_deref()
            .map(|raw| Self::parse_type(Some(raw)))
            .transpose()?;
        let amount = self
            .amount
            .as_ref()
            .map(|raw| Self::parse_amount(Some(raw)))
            .transpose()?;

        if let Some(type_) = type_ {
            transaction.type_ = type_;
        }
        if let Some(amount) = amount {
            transaction.amount = amount;
        }
        if let Some(description) = self.description {
            transaction.description = optional_text(Some(&description));
        }
        if let Some(payment_method) = self.payment_method {
            transaction.payment_method = optional_text(Some(&payment_method));
        }
        if let Some(category) = self.category {
            transaction.category = optional_text(Some(&category));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        Error, UserID,
        transaction::{Transaction, TransactionType},
        validation::NumberOrText,
    };

    use super::TransactionPayload;

    fn existing() -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            type_: TransactionType::Expense,
            amount: 10.0,
            description: Some("Lunch".to_owned()),
            payment_method: Some("Pix".to_owned()),
            category: Some("Food".to_owned()),
            date: datetime!(2025-03-01 12:00 UTC),
        }
    }

    #[test]
    fn builder_requires_type_and_amount() {
        let payload: TransactionPayload = serde_json::from_str(r#"{"amount": 5}"#).unwrap();
        assert_eq!(payload.into_builder(), Err(Error::MissingField("type")));

        let payload: TransactionPayload =
            serde_json::from_str(r#"{"type": "income", "amount": ""}"#).unwrap();
        assert_eq!(payload.into_builder(), Err(Error::MissingField("amount")));
    }

    #[test]
    fn builder_accepts_numeric_strings() {
        let payload: TransactionPayload = serde_json::from_str(
            r#"{"type": "expense", "amount": "12.5", "category": " Food ", "description": ""}"#,
        )
        .unwrap();

        let builder = payload.into_builder().unwrap();

        assert_eq!(builder.type_, TransactionType::Expense);
        assert_eq!(builder.amount, 12.5);
        assert_eq!(builder.category.as_deref(), Some("Food"));
        assert_eq!(builder.description, None);
    }

    #[test]
    fn replace_clears_missing_fields() {
        let mut transaction = existing();
        let payload = TransactionPayload {
            type_: Some("income".to_owned()),
            amount: Some(NumberOrText::Number(20.0)),
            ..Default::default()
        };

        payload.replace(&mut transaction).unwrap();

        assert_eq!(transaction.type_, TransactionType::Income);
        assert_eq!(transaction.amount, 20.0);
        assert_eq!(transaction.category, None);
        assert_eq!(transaction.payment_method, None);
    }

    #[test]
    fn invalid_replace_leaves_transaction_untouched() {
        let mut transaction = existing();
        let payload = TransactionPayload {
            type_: Some("income".to_owned()),
            amount: Some(NumberOrText::Number(-1.0)),
            category: Some("Salary".to_owned()),
            ..Default::default()
        };

        assert!(payload.replace(&mut transaction).is_err());
        assert_eq!(transaction, existing());
    }

    #[test]
    fn merge_keeps_missing_fields() {
        let mut transaction = existing();
        let payload: TransactionPayload = serde_json::from_str(r#"{"amount": 15}"#).unwrap();

        payload.merge(&mut transaction).unwrap();

        assert_eq!(transaction.amount, 15.0);
        assert_eq!(transaction.category.as_deref(), Some("Food"));
        assert_eq!(transaction.type_, TransactionType::Expense);
    }

    #[test]
    fn invalid_merge_leaves_transaction_untouched() {
        let mut transaction = existing();
        let payload: TransactionPayload =
            serde_json::from_str(r#"{"amount": 15, "type": "gift"}"#).unwrap();

        assert_eq!(
            payload.merge(&mut transaction),
            Err(Error::InvalidTransactionType("gift".to_owned()))
        );
        assert_eq!(transaction, existing());
    }
}
